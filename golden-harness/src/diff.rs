//! Line-oriented differences between a golden file and generator output.

use colored::Colorize;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::{fmt, path::Path, time::Duration};

use crate::error::HarnessError;

/// One entry of a diff listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// Present in both inputs.
    Unchanged(String),
    /// Present only in the golden file.
    Removed(String),
    /// Present only in the generator output.
    Added(String),
    /// Annotation that is not a line of either input.
    Note(String),
}

impl DiffLine {
    /// Returns whether this entry marks a removed or added line.
    pub const fn is_change(&self) -> bool {
        matches!(self, Self::Removed(_) | Self::Added(_))
    }

    /// Returns the line text without its terminator.
    pub fn text(&self) -> &str {
        let raw = self.raw();
        raw.strip_suffix('\n')
            .map_or(raw, |s| s.strip_suffix('\r').unwrap_or(s))
    }

    fn raw(&self) -> &str {
        let (Self::Unchanged(s) | Self::Removed(s) | Self::Added(s) | Self::Note(s)) = self;
        s
    }

    const fn marker(&self) -> &'static str {
        match self {
            Self::Unchanged(_) => "  ",
            Self::Removed(_) => "- ",
            Self::Added(_) => "+ ",
            Self::Note(_) => "\\ ",
        }
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A carriage return would move the cursor, so show it as a symbol.
        let cr = if self.raw().trim_end_matches('\n').ends_with('\r') {
            CR_SYMBOL
        } else {
            ""
        };
        write!(f, "{}{}{cr}", self.marker(), self.text())
    }
}

/// The full diff listing between an expected and an actual text.
///
/// Empty iff the two inputs are byte-identical. Entries come in the natural
/// top-to-bottom order of both inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileDiff {
    lines: Vec<DiffLine>,
}

const MISSING_NEWLINE: &str = "No newline at end of file";
const INVISIBLE_DIFFERENCE: &str = "Contents differ in bytes that do not render as text";
const LINE_ENDINGS_ONLY: &str = "Contents differ only in line endings (CRLF vs LF)";
const CR_SYMBOL: &str = "\u{240d}";

/// Bound on time spent looking for a minimal diff; past it the remaining
/// lines are reported as a plain removal and addition.
const DIFF_DEADLINE: Duration = Duration::from_secs(2);

impl FileDiff {
    /// Computes the diff between two byte strings, decoding them lossily.
    pub fn between(expected: &[u8], actual: &[u8]) -> Self {
        if expected == actual {
            return Self::default();
        }

        let expected_text = String::from_utf8_lossy(expected);
        let actual_text = String::from_utf8_lossy(actual);

        // Line tokens keep their terminators, so a missing final newline is a change.
        let text_diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .timeout(DIFF_DEADLINE)
            .diff_lines(expected_text.as_ref(), actual_text.as_ref());

        let mut entries: Vec<DiffLine> = text_diff
            .iter_all_changes()
            .map(|change| {
                let line = change.value().to_owned();
                match change.tag() {
                    ChangeTag::Delete => DiffLine::Removed(line),
                    ChangeTag::Equal => DiffLine::Unchanged(line),
                    ChangeTag::Insert => DiffLine::Added(line),
                }
            })
            .collect();

        // Within each run of changes, list removals before additions.
        for run in entries.chunk_by_mut(|a, b| a.is_change() && b.is_change()) {
            run.sort_by_key(|l| matches!(l, DiffLine::Added(_)));
        }

        let mut lines = Vec::with_capacity(entries.len());
        for line in entries {
            let unterminated = line.is_change() && !line.raw().ends_with('\n');
            lines.push(line);
            if unterminated {
                lines.push(DiffLine::Note(String::from(MISSING_NEWLINE)));
            }
        }

        if !lines.iter().any(DiffLine::is_change) {
            lines.push(DiffLine::Note(String::from(INVISIBLE_DIFFERENCE)));
        } else if expected_text.replace("\r\n", "\n") == actual_text.replace("\r\n", "\n") {
            lines.push(DiffLine::Note(String::from(LINE_ENDINGS_ONLY)));
        }

        Self { lines }
    }

    /// Reads both files and computes the diff between them.
    pub fn between_files(expected: &Path, actual: &Path) -> Result<Self, HarnessError> {
        let expected_bytes = std::fs::read(expected).map_err(|e| HarnessError::io(expected, e))?;
        let actual_bytes = std::fs::read(actual).map_err(|e| HarnessError::io(actual, e))?;

        let diff = Self::between(&expected_bytes, &actual_bytes);

        tracing::debug!(
            target: "comparison",
            "diff of {} vs {}: {} changed line(s)",
            expected.display(),
            actual.display(),
            diff.changed_line_count()
        );

        Ok(diff)
    }

    /// Returns whether there are no differences.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over the entries of this diff.
    pub fn lines(&self) -> std::slice::Iter<'_, DiffLine> {
        self.lines.iter()
    }

    /// Returns the number of changed lines.
    ///
    /// A run of removals and additions between unchanged lines counts as the
    /// larger of its two sides, so one altered line counts once.
    pub fn changed_line_count(&self) -> usize {
        let mut total = 0;
        let (mut removed, mut added) = (0, 0);

        for line in &self.lines {
            match line {
                DiffLine::Removed(_) => removed += 1,
                DiffLine::Added(_) => added += 1,
                DiffLine::Unchanged(_) => {
                    total += usize::max(removed, added);
                    (removed, added) = (0, 0);
                }
                DiffLine::Note(_) => {}
            }
        }

        total + usize::max(removed, added)
    }

    /// Returns the number of golden lines missing from the output.
    pub fn removed_line_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    /// Returns the number of output lines missing from the golden file.
    pub fn added_line_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Writes this diff to a writer, one colored entry per line.
    pub fn write_to(&self, writer: &mut impl std::io::Write, indent: usize) -> std::io::Result<()> {
        let indent_str = " ".repeat(indent);

        for line in &self.lines {
            let formatted = match line {
                DiffLine::Removed(_) => std::format!("{indent_str}{line}").red(),
                DiffLine::Unchanged(_) => std::format!("{indent_str}{line}").bright_black(),
                DiffLine::Added(_) => std::format!("{indent_str}{line}").green(),
                DiffLine::Note(_) => std::format!("{indent_str}{line}").yellow(),
            };

            writeln!(writer, "{formatted}")?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a FileDiff {
    type Item = &'a DiffLine;
    type IntoIter = std::slice::Iter<'a, DiffLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines()
    }
}
