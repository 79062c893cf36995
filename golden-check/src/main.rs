//! The `golden-check` executable.

/// Main entry point.
fn main() {
    golden_check::entry::run();
}
