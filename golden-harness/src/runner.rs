//! Suite runner: drives every case of a set through the generator and comparison.

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::comparison::{CaseOutcome, files_equal};
use crate::config::{ExitStatusPolicy, FailurePolicy, HarnessConfig, ReportOptions};
use crate::diff::FileDiff;
use crate::error::HarnessError;
use crate::execution::{EphemeralArtifact, Generator};
use crate::reporting::{CaseResult, SuiteSummary};
use crate::testcase::{TestCase, TestCaseSet};

/// The main suite runner.
pub struct SuiteRunner {
    config: HarnessConfig,
    options: ReportOptions,
    generator: Generator,
}

impl SuiteRunner {
    /// Creates a new runner with the given configuration and report options.
    pub fn new(config: HarnessConfig, options: ReportOptions) -> Self {
        let generator = Generator::from_config(&config);
        Self {
            config,
            options,
            generator,
        }
    }

    /// Runs every case, reporting each verdict to stderr as it completes.
    pub async fn run(&self, test_case_set: &TestCaseSet) -> Result<SuiteSummary> {
        self.run_with_writer(test_case_set, std::io::stderr()).await
    }

    /// Runs every case, reporting each verdict to `writer` as it completes.
    pub async fn run_with_writer<W: Write>(
        &self,
        test_case_set: &TestCaseSet,
        mut writer: W,
    ) -> Result<SuiteSummary> {
        let start_time = std::time::Instant::now();
        let mut results = vec![];
        let mut stopped = false;

        tracing::debug!(
            target: "registry",
            "running {} case(s) from set '{}'",
            test_case_set.cases.len(),
            test_case_set.display_name()
        );

        for test_case in &test_case_set.cases {
            let name = test_case_set.qualified_name(test_case);
            let golden_path = self.config.resolve_golden(&test_case.golden_reference);

            let result = if stopped {
                CaseResult::not_run(name, test_case.clone(), golden_path)
            } else {
                self.run_single_case(name, test_case, golden_path).await
            };

            result.write(&mut writer, &self.options)?;

            if result.outcome.is_failure()
                && matches!(self.config.failure_policy, FailurePolicy::FailFast)
            {
                stopped = true;
            }

            results.push(result);
        }

        let summary = SuiteSummary {
            name: test_case_set.display_name().to_owned(),
            results,
            duration: start_time.elapsed(),
        };

        summary.write_summary(&mut writer, &self.options)?;

        Ok(summary)
    }

    async fn run_single_case(
        &self,
        name: String,
        test_case: &TestCase,
        golden_path: PathBuf,
    ) -> CaseResult {
        let start_time = std::time::Instant::now();
        let input_path = self.config.resolve_input(&test_case.config_input);

        tracing::debug!(target: "state", "{name}: pending -> running");

        let mut artifact_path = None;
        let outcome = match self
            .execute(&input_path, &golden_path, &mut artifact_path)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => CaseOutcome::from(err),
        };

        tracing::debug!(
            target: "state",
            "{name}: running -> {} -> cleaned",
            if outcome.is_pass() { "passed" } else { "failed" }
        );

        CaseResult {
            name,
            test_case: test_case.clone(),
            golden_path,
            artifact_path,
            outcome,
            duration: start_time.elapsed(),
        }
    }

    async fn execute(
        &self,
        input_path: &Path,
        golden_path: &Path,
        artifact_path: &mut Option<PathBuf>,
    ) -> Result<CaseOutcome, HarnessError> {
        check_exists("input configuration", input_path)?;
        check_exists("golden file", golden_path)?;

        let artifact = EphemeralArtifact::allocate(self.config.artifact_dir.as_deref())?;
        *artifact_path = Some(artifact.path().to_path_buf());

        let outcome = self.generate_and_compare(input_path, golden_path, &artifact).await;

        let released_path = artifact.path().to_path_buf();
        if let Err(e) = artifact.release() {
            tracing::warn!(
                target: "cleanup",
                "failed to delete artifact {}: {e}",
                released_path.display()
            );
        }

        outcome
    }

    async fn generate_and_compare(
        &self,
        input_path: &Path,
        golden_path: &Path,
        artifact: &EphemeralArtifact,
    ) -> Result<CaseOutcome, HarnessError> {
        let run_result = self.generator.run(input_path, artifact).await?;

        if !run_result.exit_status.success() {
            match self.config.exit_status_policy {
                ExitStatusPolicy::Fail => {
                    return Err(HarnessError::ExitStatus {
                        status: run_result.exit_status,
                        stdout: run_result.stdout,
                        stderr: run_result.stderr,
                    });
                }
                ExitStatusPolicy::Ignore => {
                    tracing::warn!(
                        target: "invocation",
                        "generator exited with {}; comparing output anyway",
                        run_result.exit_status
                    );
                }
            }
        }

        if files_equal(golden_path, artifact.path())? {
            Ok(CaseOutcome::Passed)
        } else {
            let diff = FileDiff::between_files(golden_path, artifact.path())?;
            Ok(CaseOutcome::Mismatch { diff })
        }
    }
}

fn check_exists(what: &'static str, path: &Path) -> Result<(), HarnessError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(HarnessError::Configuration {
            what,
            path: path.to_path_buf(),
        })
    }
}
