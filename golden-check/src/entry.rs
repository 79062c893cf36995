//! Implements the command-line interface for `golden-check`.

use anyhow::Context;
use clap::Parser;
use golden_harness::{SuiteRunner, TestCaseSet};

use crate::args::CommandLineArgs;
use crate::config;
use crate::events::TraceEventConfig;

/// Exit code when every selected case passed.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code when at least one case did not pass.
pub const EXIT_FAILURES: u8 = 1;

/// Exit code when the suite could not be set up at all.
pub const EXIT_FATAL: u8 = 2;

/// Main entry point for `golden-check`.
pub fn run() {
    human_panic::setup_panic!();

    let args = CommandLineArgs::parse();
    let events = TraceEventConfig::init(&args.enabled_log_events);
    if !events.enabled_events().is_empty() {
        tracing::debug!("enabled trace events: {:?}", events.enabled_events());
    }

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run_async(args)));

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("error: {err:#}");
            EXIT_FATAL
        }
    };

    std::process::exit(i32::from(exit_code));
}

/// Runs the selected cases. Returns the exit code.
async fn run_async(args: CommandLineArgs) -> anyhow::Result<u8> {
    let loaded = config::load_config(args.no_config, args.config_file.as_deref());
    if let Some(err) = &loaded.error {
        let path = loaded
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        if loaded.explicit_path {
            anyhow::bail!("{path}: {err}");
        }
        tracing::warn!("{path}: {err}; continuing with defaults");
    }

    let base_dir = loaded.base_dir();
    let harness_config = loaded.config.to_harness_config(&args, &base_dir);
    let report_options = loaded.config.to_report_options(&args);

    let test_case_set = match loaded.config.manifest_path(&args, &base_dir) {
        Some(manifest) => TestCaseSet::load_from_file(&manifest)?,
        None => TestCaseSet::default_suite(),
    };
    let test_case_set = test_case_set.filtered(&args.case_filter());

    if args.list_tests_only {
        for test_case in &test_case_set.cases {
            println!("{}: test", test_case_set.qualified_name(test_case));
        }
        return Ok(EXIT_SUCCESS);
    }

    if test_case_set.cases.is_empty() {
        tracing::warn!("no test cases selected");
    }

    let runner = SuiteRunner::new(harness_config, report_options.clone());
    let summary = runner.run(&test_case_set).await?;

    if matches!(report_options.format, golden_harness::OutputFormat::Junit) {
        summary.write_junit(std::io::stdout(), &report_options)?;
    }

    Ok(if summary.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURES
    })
}
