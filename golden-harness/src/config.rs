//! Configuration types for the harness.

use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::execution::DEFAULT_TIMEOUT_IN_SECONDS;

/// What to do when the generator exits with a non-zero status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExitStatusPolicy {
    /// Report the case as a generator failure, without comparing output.
    #[default]
    Fail,
    /// Ignore the exit status and compare whatever output was written.
    Ignore,
}

/// What to do with the remaining cases once one case does not pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep going through every case.
    #[default]
    Continue,
    /// Stop at the first case that does not pass.
    FailFast,
}

/// Configuration for running the generator and locating its files.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// The generator executable.
    pub generator_path: PathBuf,
    /// Arguments placed before the input and output paths (e.g. a script for an interpreter).
    pub generator_args: Vec<String>,
    /// Directory that relative input configuration paths resolve against.
    pub data_dir: PathBuf,
    /// Directory that relative golden file paths resolve against.
    pub golden_dir: PathBuf,
    /// Directory for ephemeral output artifacts; the system temp dir when `None`.
    pub artifact_dir: Option<PathBuf>,
    /// Upper bound on a single generator run.
    pub timeout: Duration,
    /// How to treat a non-zero generator exit.
    pub exit_status_policy: ExitStatusPolicy,
    /// Whether to continue after a failing case.
    pub failure_policy: FailurePolicy,
}

impl HarnessConfig {
    /// Creates a new config with default policies.
    pub fn new(
        generator_path: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        golden_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator_path: generator_path.into(),
            generator_args: vec![],
            data_dir: data_dir.into(),
            golden_dir: golden_dir.into(),
            artifact_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_IN_SECONDS),
            exit_status_policy: ExitStatusPolicy::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Sets the arguments that precede the input and output paths.
    #[must_use]
    pub fn with_generator_args(mut self, args: Vec<String>) -> Self {
        self.generator_args = args;
        self
    }

    /// Sets the directory where artifacts are allocated.
    #[must_use]
    pub fn with_artifact_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.artifact_dir = dir;
        self
    }

    /// Sets the bound on a single generator run.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the exit status policy.
    #[must_use]
    pub const fn with_exit_status_policy(mut self, policy: ExitStatusPolicy) -> Self {
        self.exit_status_policy = policy;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Resolves a case's input configuration path against the data directory.
    pub fn resolve_input(&self, path: &Path) -> PathBuf {
        resolve(&self.data_dir, path)
    }

    /// Resolves a case's golden file path against the golden directory.
    pub fn resolve_golden(&self, path: &Path) -> PathBuf {
        resolve(&self.golden_dir, path)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Output format for test results.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// `JUnit` XML format.
    Junit,
    /// One line per case.
    Terse,
}

/// Options controlling how results are reported.
#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Display details regarding successful test cases.
    pub verbose: bool,
}

/// Include/exclude filters applied to qualified case names (`set::case`).
#[derive(Clone, Debug, Default)]
pub struct CaseFilter {
    /// Patterns for cases to be included; empty means all.
    pub include: Vec<String>,
    /// Patterns for cases to be excluded.
    pub exclude: Vec<String>,
    /// Match patterns exactly rather than as substrings.
    pub exact: bool,
}

impl CaseFilter {
    /// Returns whether a case should run based on include/exclude filters.
    pub fn should_run(&self, qualified_name: &str) -> bool {
        // If any include filters were given, then we are in opt-in mode.
        if !self.include.is_empty() && !self.matches_any(qualified_name, &self.include) {
            return false;
        }

        !self.matches_any(qualified_name, &self.exclude)
    }

    fn matches_any(&self, qualified_name: &str, filters: &[String]) -> bool {
        if self.exact {
            filters.iter().any(|f| f == qualified_name)
        } else {
            filters.iter().any(|f| qualified_name.contains(f.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_their_dirs() {
        let config = HarnessConfig::new("strategy", "/repo/data", "/repo/test");

        assert_eq!(
            config.resolve_input(Path::new("jacks-96.txt")),
            PathBuf::from("/repo/data/jacks-96.txt")
        );
        assert_eq!(
            config.resolve_golden(Path::new("golden.txt")),
            PathBuf::from("/repo/test/golden.txt")
        );
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_are_kept() {
        let config = HarnessConfig::new("strategy", "data", "test");
        assert_eq!(
            config.resolve_input(Path::new("/elsewhere/jacks-96.txt")),
            PathBuf::from("/elsewhere/jacks-96.txt")
        );
    }

    #[test]
    fn defaults_continue_and_fail_on_exit_status() {
        let config = HarnessConfig::new("strategy", "data", "test");
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.exit_status_policy, ExitStatusPolicy::Fail);
        assert_eq!(
            config.timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_IN_SECONDS)
        );
    }

    #[test]
    fn empty_filter_runs_everything() {
        let filter = CaseFilter::default();
        assert!(filter.should_run("strategy::jacks-96"));
    }

    #[test]
    fn include_filters_are_substring_matches() {
        let filter = CaseFilter {
            include: vec!["jacks".into()],
            ..CaseFilter::default()
        };

        assert!(filter.should_run("strategy::jacks-96"));
        assert!(filter.should_run("strategy::multi-jacks"));
        assert!(!filter.should_run("strategy::fpdw_practical"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = CaseFilter {
            include: vec!["jacks".into()],
            exclude: vec!["multi".into()],
            exact: false,
        };

        assert!(filter.should_run("strategy::jacks-96"));
        assert!(!filter.should_run("strategy::multi-jacks"));
    }

    #[test]
    fn exact_filters_need_the_full_name() {
        let filter = CaseFilter {
            include: vec!["strategy::jacks-96".into()],
            exact: true,
            ..CaseFilter::default()
        };

        assert!(filter.should_run("strategy::jacks-96"));
        assert!(!filter.should_run("strategy::multi-jacks-96"));
    }
}
