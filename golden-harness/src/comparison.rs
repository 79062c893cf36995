//! Byte-exact comparison and per-case outcomes.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    process::ExitStatus,
    time::Duration,
};

use crate::diff::FileDiff;
use crate::error::HarnessError;

const COMPARE_CHUNK_SIZE: usize = 64 * 1024;

/// Returns whether two files have identical length and identical bytes.
///
/// Contents are compared in buffered chunks, so neither file is held in memory whole.
pub fn files_equal(left: &Path, right: &Path) -> Result<bool, HarnessError> {
    let left_len = std::fs::metadata(left)
        .map_err(|e| HarnessError::io(left, e))?
        .len();
    let right_len = std::fs::metadata(right)
        .map_err(|e| HarnessError::io(right, e))?
        .len();

    if left_len != right_len {
        tracing::debug!(
            target: "comparison",
            "{} is {left_len} byte(s), {} is {right_len} byte(s)",
            left.display(),
            right.display()
        );
        return Ok(false);
    }

    let mut left_reader = open_buffered(left)?;
    let mut right_reader = open_buffered(right)?;

    loop {
        let left_chunk = left_reader.fill_buf().map_err(|e| HarnessError::io(left, e))?;
        let right_chunk = right_reader
            .fill_buf()
            .map_err(|e| HarnessError::io(right, e))?;

        if left_chunk.is_empty() || right_chunk.is_empty() {
            return Ok(left_chunk.is_empty() && right_chunk.is_empty());
        }

        let len = left_chunk.len().min(right_chunk.len());
        if left_chunk[..len] != right_chunk[..len] {
            return Ok(false);
        }

        left_reader.consume(len);
        right_reader.consume(len);
    }
}

fn open_buffered(path: &Path) -> Result<BufReader<File>, HarnessError> {
    let file = File::open(path).map_err(|e| HarnessError::io(path, e))?;
    Ok(BufReader::with_capacity(COMPARE_CHUNK_SIZE, file))
}

/// How a single test case concluded.
#[derive(Debug)]
pub enum CaseOutcome {
    /// The output matched the golden file exactly.
    Passed,
    /// The output differs from the golden file.
    Mismatch {
        /// Golden (left) vs. output (right).
        diff: FileDiff,
    },
    /// The generator exited with a non-zero status.
    GeneratorFailed {
        /// Exit status of the generator.
        status: ExitStatus,
        /// Whatever the generator wrote to stdout.
        stdout: String,
        /// Whatever the generator wrote to stderr.
        stderr: String,
    },
    /// The generator did not finish in time and was killed.
    TimedOut {
        /// The bound that expired.
        after: Duration,
    },
    /// The case could not be carried out (missing file, launch failure, I/O error).
    Error {
        /// Description of the error.
        message: String,
    },
    /// The case was not run because an earlier case stopped the suite.
    NotRun,
}

impl CaseOutcome {
    /// Returns whether this outcome is a pass.
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns whether the case ran and did not pass.
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Passed | Self::NotRun)
    }

    /// Returns whether the case could not be carried out at all.
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Short verdict label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Mismatch { .. } => "fail",
            Self::GeneratorFailed { .. } => "generator failed",
            Self::TimedOut { .. } => "timed out",
            Self::Error { .. } => "error",
            Self::NotRun => "not run",
        }
    }
}

impl From<HarnessError> for CaseOutcome {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::ExitStatus {
                status,
                stdout,
                stderr,
            } => Self::GeneratorFailed {
                status,
                stdout,
                stderr,
            },
            HarnessError::Timeout { after } => Self::TimedOut { after },
            other => Self::Error {
                message: other.to_string(),
            },
        }
    }
}
