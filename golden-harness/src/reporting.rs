//! Reporting utilities for test results.

use anyhow::Result;
use colored::Colorize;
use std::{io::Write, path::PathBuf, time::Duration};

use crate::comparison::CaseOutcome;
use crate::config::{OutputFormat, ReportOptions};
use crate::testcase::TestCase;

/// Result of running a single test case.
#[derive(Debug)]
pub struct CaseResult {
    /// Qualified name of the test case (`set::case`).
    pub name: String,
    /// The case that was run.
    pub test_case: TestCase,
    /// Resolved path of the golden file.
    pub golden_path: PathBuf,
    /// Path of the artifact the output was captured in, if one was allocated.
    /// The file itself no longer exists once the result is produced.
    pub artifact_path: Option<PathBuf>,
    /// How the case concluded.
    pub outcome: CaseOutcome,
    /// Wall-clock duration of the case.
    pub duration: Duration,
}

impl CaseResult {
    /// Creates a result for a case that never ran.
    pub fn not_run(name: String, test_case: TestCase, golden_path: PathBuf) -> Self {
        Self {
            name,
            test_case,
            golden_path,
            artifact_path: None,
            outcome: CaseOutcome::NotRun,
            duration: Duration::default(),
        }
    }

    /// Writes this result in the given format.
    pub fn write<W: Write>(&self, writer: W, options: &ReportOptions) -> Result<()> {
        match options.format {
            OutputFormat::Pretty => self.write_details(writer, options),
            OutputFormat::Terse => self.write_terse(writer),
            OutputFormat::Junit => Ok(()),
        }
    }

    fn write_terse<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}: {}", self.name, self.outcome.label())?;
        Ok(())
    }

    /// Writes the verdict line and, on failure, the details of this result.
    pub fn write_details<W: Write>(&self, mut writer: W, options: &ReportOptions) -> Result<()> {
        write!(
            writer,
            "* {}: [{}]... ",
            "Test case".bright_yellow(),
            self.name.as_str().italic()
        )?;

        match &self.outcome {
            CaseOutcome::Passed => {
                writeln!(writer, "{}", "ok.".bright_green())?;
                if options.verbose {
                    self.write_paths(&mut writer)?;
                    writeln!(writer, "    ran in {:?}", self.duration)?;
                }
                return Ok(());
            }
            CaseOutcome::NotRun => {
                writeln!(writer, "{}", "not run.".cyan())?;
                return Ok(());
            }
            _ => writeln!(writer)?,
        }

        self.write_paths(&mut writer)?;

        match &self.outcome {
            CaseOutcome::Mismatch { diff } => {
                writeln!(
                    writer,
                    "    output {} ({} changed line(s)):",
                    "DIFFERS from golden".bright_red(),
                    diff.changed_line_count()
                )?;
                writeln!(
                    writer,
                    "      {}",
                    "------ Golden <> Output ---------------------------------".cyan()
                )?;
                diff.write_to(&mut writer, 6)?;
                writeln!(
                    writer,
                    "      {}",
                    "---------------------------------------------------------".cyan()
                )?;
            }
            CaseOutcome::GeneratorFailed {
                status,
                stdout,
                stderr,
            } => {
                writeln!(
                    writer,
                    "    generator {}: {}",
                    "exited unsuccessfully".bright_red(),
                    format!("{status}").bright_red()
                )?;
                if !stdout.is_empty() {
                    writeln!(
                        writer,
                        "      {}",
                        "------ Generator: stdout --------------------------------".cyan()
                    )?;
                    writeln!(writer, "{}", indent::indent_all_by(6, stdout))?;
                }
                if !stderr.is_empty() {
                    writeln!(
                        writer,
                        "      {}",
                        "------ Generator: stderr --------------------------------".cyan()
                    )?;
                    writeln!(writer, "{}", indent::indent_all_by(6, stderr))?;
                }
            }
            CaseOutcome::TimedOut { after } => {
                writeln!(
                    writer,
                    "    generator {} after {after:?}",
                    "timed out".bright_red()
                )?;
            }
            CaseOutcome::Error { message } => {
                writeln!(writer, "    {}: {message}", "error".bright_red())?;
            }
            CaseOutcome::Passed | CaseOutcome::NotRun => {}
        }

        writeln!(writer, "    {}", "FAILED.".bright_red())?;

        Ok(())
    }

    fn write_paths<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(
            writer,
            "    input: {}",
            self.test_case.config_input.to_string_lossy()
        )?;
        writeln!(writer, "    golden: {}", self.golden_path.to_string_lossy())?;
        if let Some(artifact_path) = &self.artifact_path {
            writeln!(writer, "    output: {}", artifact_path.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Results from running a set of test cases.
#[derive(Debug, Default)]
pub struct SuiteSummary {
    /// Name of the test case set.
    pub name: String,
    /// Individual results, in registry order.
    pub results: Vec<CaseResult>,
    /// Total wall-clock duration.
    pub duration: Duration,
}

impl SuiteSummary {
    /// Number of cases that passed.
    pub fn passed_count(&self) -> usize {
        self.count(CaseOutcome::is_pass)
    }

    /// Number of cases that ran and did not pass, errors included.
    pub fn failed_count(&self) -> usize {
        self.count(CaseOutcome::is_failure)
    }

    /// Number of cases that could not be carried out.
    pub fn errored_count(&self) -> usize {
        self.count(CaseOutcome::is_error)
    }

    /// Number of cases skipped after a fail-fast stop.
    pub fn not_run_count(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::NotRun))
    }

    /// Returns whether every case passed.
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_pass())
    }

    fn count(&self, pred: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Writes the closing summary block for pretty output.
    pub fn write_summary<W: Write>(&self, mut writer: W, options: &ReportOptions) -> Result<()> {
        if !matches!(options.format, OutputFormat::Pretty) {
            return Ok(());
        }

        let failed_count = self.failed_count() - self.errored_count();
        let formatted_fail_count = if failed_count > 0 {
            failed_count.to_string().red()
        } else {
            failed_count.to_string().green()
        };

        let formatted_error_count = if self.errored_count() > 0 {
            self.errored_count().to_string().magenta()
        } else {
            self.errored_count().to_string().green()
        };

        let formatted_not_run_count = if self.not_run_count() > 0 {
            self.not_run_count().to_string().cyan()
        } else {
            self.not_run_count().to_string().green()
        };

        writeln!(
            writer,
            "================================================================================"
        )?;
        writeln!(
            writer,
            "{} test case(s) ran: {} passed, {} failed, {} errored, {} not run.",
            self.passed_count() + self.failed_count(),
            self.passed_count().to_string().green(),
            formatted_fail_count,
            formatted_error_count,
            formatted_not_run_count,
        )?;
        if options.verbose {
            writeln!(writer, "duration of suite '{}': {:?}", self.name, self.duration)?;
        }
        writeln!(
            writer,
            "================================================================================"
        )?;

        Ok(())
    }

    /// Writes all results as a `JUnit` XML report.
    pub fn write_junit<W: Write>(&self, mut writer: W, options: &ReportOptions) -> Result<()> {
        let mut report = junit_report::Report::new();
        let mut suite = junit_report::TestSuite::new(self.name.as_str());

        let detail_options = ReportOptions {
            format: OutputFormat::Pretty,
            verbose: options.verbose,
        };

        for r in &self.results {
            let mut test_case = match &r.outcome {
                CaseOutcome::Passed => {
                    junit_report::TestCase::success(&r.name, r.duration.try_into()?)
                }
                CaseOutcome::NotRun => junit_report::TestCase::skipped(&r.name),
                CaseOutcome::Mismatch { .. } => junit_report::TestCase::failure(
                    &r.name,
                    r.duration.try_into()?,
                    "mismatch",
                    "output differs from golden file",
                ),
                outcome => junit_report::TestCase::error(
                    &r.name,
                    r.duration.try_into()?,
                    outcome.label(),
                    "generator run failed",
                ),
            };

            let mut output_buf: Vec<u8> = vec![];
            r.write_details(&mut output_buf, &detail_options)?;

            let output_as_string = String::from_utf8(output_buf)?;
            test_case.set_system_out(strip_ansi_escapes::strip_str(output_as_string).as_str());

            suite.add_testcase(test_case);
        }

        report.add_testsuite(suite);
        report.write_xml(&mut writer)?;
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::FileDiff;

    fn result(name: &str, outcome: CaseOutcome) -> CaseResult {
        CaseResult {
            name: format!("strategy::{name}"),
            test_case: TestCase::new(format!("{name}.txt"), "golden.txt"),
            golden_path: PathBuf::from("test/golden.txt"),
            artifact_path: None,
            outcome,
            duration: Duration::from_millis(5),
        }
    }

    fn plain(options: &ReportOptions, r: &CaseResult) -> String {
        colored::control::set_override(false);
        let mut out = vec![];
        r.write(&mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn pass_line_names_the_case() {
        let text = plain(&ReportOptions::default(), &result("jacks-96", CaseOutcome::Passed));
        assert_eq!(text, "* Test case: [strategy::jacks-96]... ok.\n");
    }

    #[test]
    fn mismatch_includes_the_diff() {
        let diff = FileDiff::between(b"a\nb\nc\n", b"a\nX\nc\n");
        let text = plain(
            &ReportOptions::default(),
            &result("jacks-96", CaseOutcome::Mismatch { diff }),
        );

        assert!(text.contains("DIFFERS from golden (1 changed line(s))"));
        assert!(text.contains("      - b\n"));
        assert!(text.contains("      + X\n"));
        assert!(text.contains("        a\n"));
        assert!(text.trim_end().ends_with("FAILED."));
    }

    #[cfg(unix)]
    #[test]
    fn generator_failure_shows_both_streams() {
        use std::os::unix::process::ExitStatusExt;

        let text = plain(
            &ReportOptions::default(),
            &result(
                "jacks-96",
                CaseOutcome::GeneratorFailed {
                    status: std::process::ExitStatus::from_raw(3 << 8),
                    stdout: String::from("reading paytable\n"),
                    stderr: String::from("bad paytable\n"),
                },
            ),
        );

        assert!(text.contains("exited unsuccessfully"));
        assert!(text.contains("Generator: stdout"));
        assert!(text.contains("      reading paytable"));
        assert!(text.contains("Generator: stderr"));
        assert!(text.contains("      bad paytable"));
    }

    #[test]
    fn terse_prints_one_line_per_case() {
        let options = ReportOptions {
            format: OutputFormat::Terse,
            verbose: false,
        };
        let text = plain(
            &options,
            &result(
                "multi-jacks",
                CaseOutcome::Error {
                    message: String::from("boom"),
                },
            ),
        );
        assert_eq!(text, "strategy::multi-jacks: error\n");
    }

    #[test]
    fn counts_and_success() {
        let summary = SuiteSummary {
            name: String::from("strategy"),
            results: vec![
                result("a", CaseOutcome::Passed),
                result("b", CaseOutcome::Mismatch {
                    diff: FileDiff::between(b"x\n", b"y\n"),
                }),
                result("c", CaseOutcome::Error {
                    message: String::from("missing"),
                }),
                result("d", CaseOutcome::NotRun),
            ],
            duration: Duration::from_millis(20),
        };

        assert_eq!(summary.passed_count(), 1);
        assert_eq!(summary.failed_count(), 2);
        assert_eq!(summary.errored_count(), 1);
        assert_eq!(summary.not_run_count(), 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn junit_report_lists_every_case() {
        let summary = SuiteSummary {
            name: String::from("strategy"),
            results: vec![
                result("jacks-96", CaseOutcome::Passed),
                result("multi-jacks", CaseOutcome::Mismatch {
                    diff: FileDiff::between(b"x\n", b"y\n"),
                }),
            ],
            duration: Duration::from_millis(20),
        };

        let mut out = vec![];
        summary
            .write_junit(&mut out, &ReportOptions::default())
            .unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains("strategy::jacks-96"));
        assert!(xml.contains("strategy::multi-jacks"));
        assert!(xml.contains("<failure"));
    }
}
