//! Tracing setup.

use std::collections::HashSet;

use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Type of event to trace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum TraceEvent {
    /// Traces generator launches and exits.
    #[clap(name = "invocation")]
    Invocation,
    /// Traces file comparisons and diffs.
    #[clap(name = "comparison")]
    Comparison,
    /// Traces artifact allocation and deletion.
    #[clap(name = "cleanup")]
    Cleanup,
    /// Traces loading and filtering of test cases.
    #[clap(name = "registry")]
    Registry,
    /// Traces per-case state transitions.
    #[clap(name = "state")]
    State,
}

impl TraceEvent {
    const fn target(self) -> &'static str {
        match self {
            Self::Invocation => "invocation",
            Self::Comparison => "comparison",
            Self::Cleanup => "cleanup",
            Self::Registry => "registry",
            Self::State => "state",
        }
    }
}

/// The set of enabled trace events.
#[derive(Default)]
pub struct TraceEventConfig {
    enabled_trace_events: HashSet<TraceEvent>,
}

impl TraceEventConfig {
    /// Installs a stderr subscriber with the given events raised to debug level.
    pub fn init(enabled_log_events: &[TraceEvent]) -> Self {
        let config = Self {
            enabled_trace_events: enabled_log_events.iter().copied().collect(),
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(config.compose_filter());

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            // Something went wrong; proceed on anyway but complain audibly.
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> tracing_subscriber::filter::Targets {
        let filter = tracing_subscriber::filter::Targets::new()
            .with_default(tracing_subscriber::filter::LevelFilter::INFO);

        filter.with_targets(
            self.enabled_trace_events
                .iter()
                .map(|event| (event.target(), tracing::Level::DEBUG)),
        )
    }

    /// Returns the enabled events.
    pub const fn enabled_events(&self) -> &HashSet<TraceEvent> {
        &self.enabled_trace_events
    }
}
