//! Metrics instrumentation for dnsdock-watchdog.
//!
//! The restart counter is exported as `times_restarted`, with no `_total`
//! suffix. Everything else is prefixed with `dns_watchdog.`

use metrics::{counter, describe_counter, gauge, histogram};
use std::net::IpAddr;
use std::time::Instant;

use crate::error::ResolveFailure;

/// Number of times the dnsdock container was restarted.
pub const TIMES_RESTARTED: &str = "times_restarted";

/// Register metric descriptions and export `times_restarted` at zero.
pub fn describe() {
    describe_counter!(TIMES_RESTARTED, "number of times dnsdock was restarted");
    describe_counter!(
        "dns_watchdog.resolution.count",
        "alias resolutions by outcome"
    );
    counter!(TIMES_RESTARTED).increment(0);
}

/// Record a sidecar restart.
pub fn record_restart() {
    counter!(TIMES_RESTARTED).increment(1);
}

/// Record an alias resolution.
pub fn record_resolution(result: ResolutionResult, duration: std::time::Duration) {
    let result_str = match result {
        ResolutionResult::Success => "success",
        ResolutionResult::NxDomain => "nxdomain",
        ResolutionResult::NoAnswer => "no_answer",
        ResolutionResult::Timeout => "timeout",
        ResolutionResult::Misconfigured => "misconfigured",
        ResolutionResult::Error => "error",
    };

    counter!("dns_watchdog.resolution.count", "result" => result_str).increment(1);
    histogram!("dns_watchdog.resolution.duration.seconds").record(duration.as_secs_f64());
}

/// Resolution outcome for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionResult {
    /// At least one address returned.
    Success,
    /// Name does not exist.
    NxDomain,
    /// Empty answer.
    NoAnswer,
    /// No nameserver replied in time.
    Timeout,
    /// Nameserver configuration unusable.
    Misconfigured,
    /// Any other failure.
    Error,
}

impl From<&Result<Vec<IpAddr>, ResolveFailure>> for ResolutionResult {
    fn from(result: &Result<Vec<IpAddr>, ResolveFailure>) -> Self {
        match result {
            Ok(_) => ResolutionResult::Success,
            Err(ResolveFailure::NxDomain(_)) => ResolutionResult::NxDomain,
            Err(ResolveFailure::NoAnswer(_)) => ResolutionResult::NoAnswer,
            Err(ResolveFailure::Timeout(_)) => ResolutionResult::Timeout,
            Err(ResolveFailure::Misconfigured(_)) => ResolutionResult::Misconfigured,
            Err(ResolveFailure::Other(_)) => ResolutionResult::Error,
        }
    }
}

/// Record a completed reconciliation pass.
pub fn record_pass(containers_checked: usize, restart_required: bool, duration: std::time::Duration) {
    let outcome = if restart_required { "restart" } else { "healthy" };

    counter!("dns_watchdog.pass.count", "outcome" => outcome).increment(1);
    gauge!("dns_watchdog.pass.containers_checked").set(containers_checked as f64);
    histogram!("dns_watchdog.pass.duration.seconds").record(duration.as_secs_f64());
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration since timer start.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use metrics_util::MetricKind;

    #[test]
    fn test_describe_exports_restart_counter_at_zero() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        ::metrics::with_local_recorder(&recorder, describe);

        let restarts = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find_map(|(key, _, _, value)| match value {
                DebugValue::Counter(n)
                    if key.kind() == MetricKind::Counter && key.key().name() == TIMES_RESTARTED =>
                {
                    Some(n)
                }
                _ => None,
            });
        assert_eq!(restarts, Some(0));
    }

    #[test]
    fn test_resolution_result_from_outcome() {
        let ok: Result<Vec<IpAddr>, ResolveFailure> = Ok(vec!["10.0.0.5".parse().unwrap()]);
        assert_eq!(ResolutionResult::from(&ok), ResolutionResult::Success);

        let nx: Result<Vec<IpAddr>, ResolveFailure> =
            Err(ResolveFailure::NxDomain("web.local".to_string()));
        assert_eq!(ResolutionResult::from(&nx), ResolutionResult::NxDomain);

        let timeout: Result<Vec<IpAddr>, ResolveFailure> =
            Err(ResolveFailure::Timeout("web.local".to_string()));
        assert_eq!(ResolutionResult::from(&timeout), ResolutionResult::Timeout);
    }
}
