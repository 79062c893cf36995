//! Execution logic for running the generator.

use std::{
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};
use tempfile::TempPath;

use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// Default bound on a single generator run, in seconds.
pub const DEFAULT_TIMEOUT_IN_SECONDS: u64 = 300;

/// A uniquely named temporary file that captures one generator run.
///
/// The file is deleted when the artifact is released or dropped, whichever
/// comes first.
#[derive(Debug)]
pub struct EphemeralArtifact {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl EphemeralArtifact {
    /// Allocates a fresh artifact in `dir`, or in the system temp dir.
    pub fn allocate(dir: Option<&Path>) -> Result<Self, HarnessError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("golden-").suffix(".txt");

        let file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(HarnessError::ArtifactAllocation)?;

        let guard = file.into_temp_path();
        let path = guard.to_path_buf();

        tracing::debug!(target: "cleanup", "allocated {}", path.display());

        Ok(Self {
            path,
            guard: Some(guard),
        })
    }

    /// Path the generator writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the artifact, returning any failure to do so.
    pub fn release(mut self) -> std::io::Result<()> {
        self.guard.take().map_or(Ok(()), TempPath::close)
    }
}

impl Drop for EphemeralArtifact {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            if let Err(e) = guard.close() {
                tracing::warn!(
                    target: "cleanup",
                    "failed to delete artifact {}: {e}",
                    self.path.display()
                );
            }
        }
    }
}

/// Result of running the generator once.
#[derive(Debug)]
pub struct RunResult {
    /// Exit status of the generator.
    pub exit_status: ExitStatus,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Duration of the run.
    pub duration: Duration,
}

/// The external generator under test.
#[derive(Clone, Debug)]
pub struct Generator {
    path: PathBuf,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl Generator {
    /// Creates a generator that runs `path` with no leading arguments.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            leading_args: vec![],
            timeout,
        }
    }

    /// Creates the generator described by a harness config.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            path: config.generator_path.clone(),
            leading_args: config.generator_args.clone(),
            timeout: config.timeout,
        }
    }

    /// Runs the generator on `config_input`, writing into `artifact`, and waits for it.
    ///
    /// The wait is bounded; on expiry the process is killed and
    /// [`HarnessError::Timeout`] is returned.
    pub async fn run(
        &self,
        config_input: &Path,
        artifact: &EphemeralArtifact,
    ) -> Result<RunResult, HarnessError> {
        let mut cmd = tokio::process::Command::new(&self.path);
        cmd.args(&self.leading_args)
            .arg(config_input)
            .arg(artifact.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            target: "invocation",
            "running {} {} {}",
            self.path.display(),
            config_input.display(),
            artifact.path().display()
        );

        let start_time = std::time::Instant::now();

        let child = cmd.spawn().map_err(|source| HarnessError::Invocation {
            generator: self.path.clone(),
            source,
        })?;

        // Dropping the child on timeout kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| HarnessError::Timeout {
                after: self.timeout,
            })?
            .map_err(|source| HarnessError::Invocation {
                generator: self.path.clone(),
                source,
            })?;

        let duration = start_time.elapsed();

        tracing::debug!(
            target: "invocation",
            "generator finished with {} in {duration:?}",
            output.status
        );

        let stdout = String::from_utf8_lossy(output.stdout.as_slice()).to_string();
        if !stdout.is_empty() {
            tracing::debug!(target: "invocation", "generator stdout:\n{stdout}");
        }

        Ok(RunResult {
            exit_status: output.status,
            stdout,
            stderr: String::from_utf8_lossy(output.stderr.as_slice()).to_string(),
            duration,
        })
    }
}
