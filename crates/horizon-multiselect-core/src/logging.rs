//! Logging facilities for Horizon MultiSelect.
//!
//! Horizon MultiSelect uses the `tracing` crate for instrumentation. To see
//! logs, install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! Advisory conditions (a rejected selection over the configured maximum)
//! log at `warn`. Ignored malformed input logs at `debug`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_multiselect_core::signal";
    /// Deferred task queue target.
    pub const TASK: &str = "horizon_multiselect_core::task";
    /// Selection state mutations and capacity warnings.
    pub const SELECTION: &str = "horizon_multiselect::selection";
    /// Search filtering.
    pub const FILTER: &str = "horizon_multiselect::filter";
    /// Value synchronisation onto the bound control.
    pub const SYNC: &str = "horizon_multiselect::sync";
    /// Validation bridge.
    pub const VALIDATION: &str = "horizon_multiselect::validation";
    /// Localisation registry and bundle loading.
    pub const LOCALIZATION: &str = "horizon_multiselect::localization";
    /// Configuration resolution.
    pub const CONFIG: &str = "horizon_multiselect::config";
    /// Widget lifecycle (attach, refresh, destroy).
    pub const WIDGET: &str = "horizon_multiselect::widget";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time rebuilds and other whole-widget operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_multiselect::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_under_subscriber() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new("rebuild");
            tracing::debug!(target: targets::WIDGET, value = 1, "inside perf span");
        });
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [
            targets::SELECTION,
            targets::FILTER,
            targets::SYNC,
            targets::VALIDATION,
            targets::LOCALIZATION,
            targets::CONFIG,
            targets::WIDGET,
        ] {
            assert!(target.starts_with("horizon_multiselect::"));
        }
        assert!(targets::SIGNAL.starts_with("horizon_multiselect_core::"));
        assert!(targets::TASK.starts_with("horizon_multiselect_core::"));
    }
}
