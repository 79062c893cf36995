//! Configuration file support for `golden-check`.
//!
//! Settings are layered: defaults < config file < command-line arguments. Unknown
//! fields in the file are ignored.

use golden_harness::{
    ExitStatusPolicy, FailurePolicy, HarnessConfig, OutputFormat, ReportOptions,
};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::args::CommandLineArgs;

/// Name of the config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "golden-check.toml";

/// Generator used when neither the file nor the command line names one.
pub const DEFAULT_GENERATOR: &str = "strategy";

/// Data directory used when neither the file nor the command line names one.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Golden directory used when neither the file nor the command line names one.
pub const DEFAULT_GOLDEN_DIR: &str = "test";

/// Root configuration structure.
///
/// All fields are optional to support partial configuration.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Generator executable.
    pub generator: Option<PathBuf>,
    /// Arguments placed before the input and output paths.
    pub generator_args: Option<Vec<String>>,
    /// Directory holding input configurations.
    pub data_dir: Option<PathBuf>,
    /// Directory holding golden files.
    pub golden_dir: Option<PathBuf>,
    /// Directory for temporary output artifacts.
    pub artifact_dir: Option<PathBuf>,
    /// YAML manifest to use instead of the built-in suite.
    pub manifest: Option<PathBuf>,
    /// Upper bound on one generator run, in seconds.
    #[serde(rename = "timeout")]
    pub timeout_in_seconds: Option<u64>,
    /// Stop at the first case that does not pass.
    pub fail_fast: Option<bool>,
    /// How to treat a non-zero generator exit status.
    pub exit_status: Option<ExitStatusPolicy>,
    /// Output format.
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Builds the harness configuration, merging with CLI arguments.
    ///
    /// Relative paths from the file resolve against `base_dir` (the file's directory).
    pub fn to_harness_config(&self, args: &CommandLineArgs, base_dir: &Path) -> HarnessConfig {
        let from_file = |p: Option<&Path>| p.map(|p| base_dir.join(p));

        let generator = args
            .generator
            .clone()
            .or_else(|| self.generator.as_ref().map(|p| resolve_program(base_dir, p)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GENERATOR));
        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| from_file(self.data_dir.as_deref()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let golden_dir = args
            .golden_dir
            .clone()
            .or_else(|| from_file(self.golden_dir.as_deref()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GOLDEN_DIR));

        let generator_args = if args.generator_args.is_empty() {
            self.generator_args.clone().unwrap_or_default()
        } else {
            args.generator_args.clone()
        };

        let timeout = args
            .timeout_in_seconds
            .or(self.timeout_in_seconds)
            .map(Duration::from_secs);

        let failure_policy = if merge_bool_setting(args.fail_fast, false, self.fail_fast) {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Continue
        };

        let mut config = HarnessConfig::new(generator, data_dir, golden_dir)
            .with_generator_args(generator_args)
            .with_artifact_dir(
                args.artifact_dir
                    .clone()
                    .or_else(|| from_file(self.artifact_dir.as_deref())),
            )
            .with_exit_status_policy(args.exit_status.or(self.exit_status).unwrap_or_default())
            .with_failure_policy(failure_policy);

        if let Some(timeout) = timeout {
            config = config.with_timeout(timeout);
        }

        config
    }

    /// Returns the manifest to load, if any.
    pub fn manifest_path(&self, args: &CommandLineArgs, base_dir: &Path) -> Option<PathBuf> {
        args.manifest
            .clone()
            .or_else(|| self.manifest.as_ref().map(|p| base_dir.join(p)))
    }

    /// Builds the report options, merging with CLI arguments.
    pub fn to_report_options(&self, args: &CommandLineArgs) -> ReportOptions {
        ReportOptions {
            format: args.format.or(self.format).unwrap_or_default(),
            verbose: args.verbose,
        }
    }
}

/// A bare program name is looked up on PATH; anything with a separator is a path.
fn resolve_program(base_dir: &Path, program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        base_dir.join(program)
    } else {
        program.to_path_buf()
    }
}

/// Merges a boolean setting from CLI args, config file, and defaults.
///
/// Since boolean CLI flags can't distinguish between "explicitly set to false" and
/// "not provided", a CLI value that differs from the default wins; otherwise the
/// config value is used if present.
const fn merge_bool_setting(
    cli_value: bool,
    cli_default: bool,
    config_value: Option<bool>,
) -> bool {
    if cli_value != cli_default {
        cli_value
    } else if let Some(config) = config_value {
        config
    } else {
        cli_default
    }
}

/// Result of attempting to load a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration, or default if loading failed.
    pub config: Config,

    /// The path that was used (or attempted) for loading.
    pub path: Option<PathBuf>,

    /// Any error that occurred during loading.
    pub error: Option<ConfigLoadError>,

    /// Whether the path was explicitly provided by the user (via `--config`).
    /// If true and there's an error, the run should fail rather than continue.
    pub explicit_path: bool,
}

impl ConfigLoadResult {
    /// Directory that relative paths in the file resolve against.
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(PathBuf::new, Path::to_path_buf)
    }

    fn defaults(path: Option<PathBuf>) -> Self {
        Self {
            config: Config::default(),
            path,
            error: None,
            explicit_path: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[source] std::io::Error),

    /// Failed to parse the TOML content.
    #[error("failed to parse config file: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Loads configuration from the specified path.
pub fn load_from_path(path: &Path) -> ConfigLoadResult {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return ConfigLoadResult {
                error: Some(ConfigLoadError::Io(e)),
                ..ConfigLoadResult::defaults(Some(path.to_path_buf()))
            };
        }
    };

    match toml::from_str(&content) {
        Ok(config) => ConfigLoadResult {
            config,
            ..ConfigLoadResult::defaults(Some(path.to_path_buf()))
        },
        Err(e) => ConfigLoadResult {
            error: Some(ConfigLoadError::Parse(e)),
            ..ConfigLoadResult::defaults(Some(path.to_path_buf()))
        },
    }
}

/// Loads configuration based on the provided options.
///
/// An explicit path that fails to load is flagged via `explicit_path` so the
/// caller can treat it as fatal. A missing default file silently yields defaults.
pub fn load_config(disabled: bool, explicit_path: Option<&Path>) -> ConfigLoadResult {
    if disabled {
        return ConfigLoadResult::defaults(None);
    }

    let is_explicit = explicit_path.is_some();
    let path = explicit_path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE_NAME), Path::to_path_buf);

    if !is_explicit && !path.exists() {
        return ConfigLoadResult::defaults(None);
    }

    let mut result = load_from_path(&path);
    result.explicit_path = is_explicit;
    result
}
