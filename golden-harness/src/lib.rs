//! Golden-master regression harness for the video-poker strategy generator.
//!
//! This crate drives an external, deterministic table generator over an ordered
//! matrix of input configurations, captures each run's output into a temporary
//! artifact, and verifies it byte-for-byte against a pre-approved golden file.
//! Mismatches are reported as a line-oriented diff.
//!
//! # Pieces
//!
//! 1. **Registry** ([`TestCaseSet`]): the ordered list of `(input, golden)` pairs,
//!    either the built-in default suite or a YAML manifest.
//!
//! 2. **Runner** ([`Generator`], [`EphemeralArtifact`]): launches the generator with
//!    the input path and a freshly allocated output path, with a bounded wait.
//!
//! 3. **Comparator** ([`files_equal`]) and **diff reporter** ([`FileDiff`]).
//!
//! 4. **Orchestrator** ([`SuiteRunner`]): runs every case in order, reports a
//!    verdict per case, and deletes each artifact on every exit path.

mod comparison;
mod config;
pub mod diff;
mod error;
mod execution;
mod reporting;
mod runner;
mod testcase;

pub use comparison::{CaseOutcome, files_equal};
pub use config::{
    CaseFilter, ExitStatusPolicy, FailurePolicy, HarnessConfig, OutputFormat, ReportOptions,
};
pub use diff::{DiffLine, FileDiff};
pub use error::HarnessError;
pub use execution::{DEFAULT_TIMEOUT_IN_SECONDS, EphemeralArtifact, Generator, RunResult};
pub use reporting::{CaseResult, SuiteSummary};
pub use runner::SuiteRunner;
pub use testcase::{TestCase, TestCaseSet};
