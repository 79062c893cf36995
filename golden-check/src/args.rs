//! Command-line arguments for `golden-check`.

use clap::Parser;
use golden_harness::{CaseFilter, ExitStatusPolicy, OutputFormat};
use std::path::PathBuf;

use crate::events::TraceEvent;

const SHORT_DESCRIPTION: &str = "Golden-master regression check for the strategy generator";

const LONG_DESCRIPTION: &str = r"
golden-check runs the strategy generator over a fixed matrix of input configurations and
compares each output byte-for-byte against its approved golden file. Mismatches are shown
as a line diff.

With no arguments the built-in suite is run using ./golden-check.toml, if present.
";

/// Parsed command-line arguments.
#[derive(Parser, Debug)]
#[clap(name = "golden-check",
       version,
       about = SHORT_DESCRIPTION,
       long_about = LONG_DESCRIPTION,
       disable_help_flag = true)]
pub struct CommandLineArgs {
    /// Display usage information.
    #[clap(long = "help", action = clap::ArgAction::HelpLong)]
    pub help: Option<bool>,

    /// Path to a TOML configuration file.
    #[clap(long = "config", value_name = "FILE", env = "GOLDEN_CHECK_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Do not load any configuration file.
    #[clap(long = "no-config")]
    pub no_config: bool,

    /// Path to the generator executable.
    #[clap(long = "generator", value_name = "PATH", env = "GOLDEN_GENERATOR")]
    pub generator: Option<PathBuf>,

    /// Argument placed before the input and output paths; may be repeated.
    #[clap(long = "generator-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub generator_args: Vec<String>,

    /// Directory holding input configurations.
    #[clap(long = "data-dir", value_name = "DIR", env = "GOLDEN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory holding golden files.
    #[clap(long = "golden-dir", value_name = "DIR", env = "GOLDEN_DIR")]
    pub golden_dir: Option<PathBuf>,

    /// Directory for temporary output artifacts.
    #[clap(long = "artifact-dir", value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// YAML manifest listing the cases to run, instead of the built-in suite.
    #[clap(long = "manifest", value_name = "FILE", env = "GOLDEN_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Upper bound on one generator run, in seconds.
    #[clap(long = "timeout", value_name = "SECS")]
    pub timeout_in_seconds: Option<u64>,

    /// Stop at the first case that does not pass.
    #[clap(long = "fail-fast")]
    pub fail_fast: bool,

    /// How to treat a non-zero generator exit status.
    #[clap(long = "exit-status", value_name = "POLICY")]
    pub exit_status: Option<ExitStatusPolicy>,

    /// Output format for test results.
    #[clap(long = "format")]
    pub format: Option<OutputFormat>,

    /// Display details regarding successful test cases.
    #[clap(short = 'v', long = "verbose", env = "GOLDEN_VERBOSE")]
    pub verbose: bool,

    /// Enable debug logging for the given events.
    #[clap(long = "log", value_name = "EVENT")]
    pub enabled_log_events: Vec<TraceEvent>,

    /// List the selected cases without running them.
    #[clap(long = "list")]
    pub list_tests_only: bool,

    /// Exactly match filters (not just substring match).
    #[clap(long = "exact")]
    pub exact_match: bool,

    /// Patterns for cases to be excluded.
    #[clap(long = "skip", value_name = "PATTERN")]
    pub exclude_filters: Vec<String>,

    /// Patterns for cases to be included.
    pub include_filters: Vec<String>,
}

impl CommandLineArgs {
    /// Returns the case filter described by these arguments.
    pub fn case_filter(&self) -> CaseFilter {
        CaseFilter {
            include: self.include_filters.clone(),
            exclude: self.exclude_filters.clone(),
            exact: self.exact_match,
        }
    }
}
