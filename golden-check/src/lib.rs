//! Command-line front end for the golden-master regression harness.

pub mod args;
pub mod config;
pub mod entry;
pub mod events;
