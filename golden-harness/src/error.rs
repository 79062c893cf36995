//! Error type for the harness.

use std::{path::PathBuf, process::ExitStatus, time::Duration};

/// Errors that can stop a single test case (or, for manifests, the whole suite).
#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    /// A test case references an input or golden file that does not exist.
    #[error("{what} not found: {}", path.display())]
    Configuration {
        /// Which of the case's files is missing.
        what: &'static str,
        /// The resolved path that was looked up.
        path: PathBuf,
    },

    /// The generator could not be launched or waited on.
    #[error("failed to run generator {}: {source}", generator.display())]
    Invocation {
        /// Path of the generator executable.
        generator: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The generator exited with a non-zero status.
    #[error("generator exited with {status}")]
    ExitStatus {
        /// The exit status reported by the OS.
        status: ExitStatus,
        /// Whatever the generator wrote to stdout.
        stdout: String,
        /// Whatever the generator wrote to stderr.
        stderr: String,
    },

    /// The generator did not finish within the configured bound.
    #[error("generator did not finish within {after:?}")]
    Timeout {
        /// The bound that expired.
        after: Duration,
    },

    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A YAML suite manifest could not be parsed.
    #[error("failed to parse manifest {}: {source}", path.display())]
    Manifest {
        /// The manifest file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The temporary output artifact could not be created.
    #[error("failed to allocate output artifact: {0}")]
    ArtifactAllocation(#[source] std::io::Error),
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
