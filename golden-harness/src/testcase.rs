//! Test case definitions and YAML schema.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::CaseFilter;
use crate::error::HarnessError;

/// A single regression case: one input configuration and its approved output.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestCase {
    /// Name of the test case; defaults to the input's file stem.
    #[serde(default)]
    pub name: Option<String>,

    /// Input configuration handed to the generator.
    #[serde(rename = "input")]
    pub config_input: PathBuf,

    /// Golden reference the generator's output must match.
    #[serde(rename = "golden")]
    pub golden_reference: PathBuf,
}

impl TestCase {
    /// Creates an unnamed test case.
    pub fn new(config_input: impl Into<PathBuf>, golden_reference: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            config_input: config_input.into(),
            golden_reference: golden_reference.into(),
        }
    }

    /// Sets the name of this test case.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the explicit name, or the input's file stem.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.config_input
                .file_stem()
                .map_or_else(
                    || self.config_input.to_string_lossy(),
                    |stem| stem.to_string_lossy(),
                )
                .to_string()
        })
    }
}

/// An ordered set of test cases.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TestCaseSet {
    /// Name of the test case set.
    pub name: Option<String>,

    /// The test cases in this set, in reporting order.
    pub cases: Vec<TestCase>,

    /// Path to the YAML file (computed at runtime).
    #[serde(skip)]
    pub source_file: Option<PathBuf>,
}

impl TestCaseSet {
    /// Name used for the set when none is given.
    pub const DEFAULT_NAME: &'static str = "strategy";

    /// The fixed regression matrix for the strategy generator.
    pub fn default_suite() -> Self {
        Self {
            name: Some(String::from(Self::DEFAULT_NAME)),
            cases: vec![
                TestCase::new("jacks-96.txt", "golden.txt"),
                TestCase::new("fpdw_practical.txt", "golden_deuces.txt"),
                TestCase::new("multi-jacks.txt", "multi-golden.txt"),
            ],
            source_file: None,
        }
    }

    /// Loads a set from a YAML manifest.
    pub fn load_from_file(path: &Path) -> Result<Self, HarnessError> {
        let contents = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;

        let mut set: Self =
            serde_yaml::from_str(&contents).map_err(|source| HarnessError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;

        set.source_file = Some(path.to_path_buf());

        tracing::debug!(
            target: "registry",
            "loaded {} case(s) from {}",
            set.cases.len(),
            path.display()
        );

        Ok(set)
    }

    /// Returns the set's name, or the default.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::DEFAULT_NAME)
    }

    /// Returns the `set::case` name used for filtering and reporting.
    pub fn qualified_name(&self, test_case: &TestCase) -> String {
        format!("{}::{}", self.display_name(), test_case.display_name())
    }

    /// Returns a copy of this set holding only the cases the filter selects.
    #[must_use]
    pub fn filtered(&self, filter: &CaseFilter) -> Self {
        let cases = self
            .cases
            .iter()
            .filter(|case| filter.should_run(&self.qualified_name(case)))
            .cloned()
            .collect();

        Self {
            name: self.name.clone(),
            cases,
            source_file: self.source_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn default_suite_is_ordered() {
        let suite = TestCaseSet::default_suite();
        let pairs: Vec<_> = suite
            .cases
            .iter()
            .map(|c| {
                (
                    c.config_input.to_string_lossy().to_string(),
                    c.golden_reference.to_string_lossy().to_string(),
                )
            })
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("jacks-96.txt".to_owned(), "golden.txt".to_owned()),
                ("fpdw_practical.txt".to_owned(), "golden_deuces.txt".to_owned()),
                ("multi-jacks.txt".to_owned(), "multi-golden.txt".to_owned()),
            ]
        );
    }

    #[test]
    fn names_default_to_input_stem() {
        let case = TestCase::new("jacks-96.txt", "golden.txt");
        assert_eq!(case.display_name(), "jacks-96");

        let named = case.with_name("jacks");
        assert_eq!(named.display_name(), "jacks");
    }

    #[test]
    fn qualified_names_include_the_set() {
        let suite = TestCaseSet::default_suite();
        assert_eq!(
            suite.qualified_name(&suite.cases[1]),
            "strategy::fpdw_practical"
        );
    }

    #[test]
    fn filtering_keeps_order() {
        let suite = TestCaseSet::default_suite();
        let filtered = suite.filtered(&CaseFilter {
            include: vec!["jacks".into()],
            ..CaseFilter::default()
        });

        let names: Vec<_> = filtered.cases.iter().map(TestCase::display_name).collect();
        assert_eq!(names, vec!["jacks-96", "multi-jacks"]);
    }

    #[test]
    fn load_manifest() {
        let dir = assert_fs::TempDir::new().unwrap();
        let manifest = dir.child("suite.yaml");
        manifest
            .write_str(
                r"
name: deuces
cases:
  - name: practical
    input: fpdw_practical.txt
    golden: golden_deuces.txt
  - input: deuces-full.txt
    golden: golden_full.txt
",
            )
            .unwrap();

        let set = TestCaseSet::load_from_file(manifest.path()).unwrap();

        assert_eq!(set.display_name(), "deuces");
        assert_eq!(set.cases.len(), 2);
        assert_eq!(set.qualified_name(&set.cases[0]), "deuces::practical");
        assert_eq!(set.qualified_name(&set.cases[1]), "deuces::deuces-full");
        assert_eq!(set.source_file.as_deref(), Some(manifest.path()));
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let manifest = dir.child("suite.yaml");
        manifest.write_str("cases:\n  - input: only-input.txt\n").unwrap();

        let err = TestCaseSet::load_from_file(manifest.path()).unwrap_err();
        assert!(matches!(err, HarnessError::Manifest { .. }));
    }

    #[test]
    fn missing_manifest_is_an_io_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let err = TestCaseSet::load_from_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, HarnessError::Io { .. }));
    }
}
