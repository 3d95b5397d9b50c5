use crate::domain::probe::{OutcomeKind, ProbeOutcome};
#[cfg(feature = "json")]
use serde::Serialize;

/// Latency statistics over the successful attempts of a probe run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize))]
pub struct LatencyStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
}

/// Aggregate counters derived from an outcome sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize))]
pub struct ProbeSummary {
    pub sent: u32,
    pub received: u32,
    pub lost: u32,
    pub loss_pct: f64,
    /// `None` when not a single attempt succeeded.
    pub latency: Option<LatencyStats>,
}

/// Reduce an outcome sequence to its summary.
///
/// Every recorded outcome corresponds to a dispatched attempt, so
/// `sent` is the sequence length. Latency is computed over successes
/// only; an all-failure run reports no latency rather than zeros. Pure
/// function of its input: summarizing the same sequence twice yields
/// identical results.
pub fn summarize(outcomes: &[ProbeOutcome]) -> ProbeSummary {
    let sent = outcomes.len() as u32;
    let received = outcomes
        .iter()
        .filter(|o| o.kind == OutcomeKind::Success)
        .count() as u32;
    let lost = sent - received;
    let loss_pct = if sent > 0 {
        f64::from(lost) / f64::from(sent) * 100.0
    } else {
        // No attempt went out at all; by convention that is total loss.
        100.0
    };

    let rtts: Vec<f64> = outcomes.iter().filter_map(ProbeOutcome::rtt_ms).collect();
    let latency = if rtts.is_empty() {
        None
    } else {
        let min_ms = rtts.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = rtts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_ms = rtts.iter().sum::<f64>() / rtts.len() as f64;
        Some(LatencyStats {
            min_ms,
            max_ms,
            avg_ms,
        })
    };

    ProbeSummary {
        sent,
        received,
        lost,
        loss_pct,
        latency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn success(seq: u32, ms: u64) -> ProbeOutcome {
        ProbeOutcome {
            seq,
            rtt: Some(Duration::from_millis(ms)),
            kind: OutcomeKind::Success,
        }
    }

    fn failure(seq: u32, kind: OutcomeKind) -> ProbeOutcome {
        ProbeOutcome {
            seq,
            rtt: None,
            kind,
        }
    }

    #[test]
    fn empty_sequence_is_total_loss() {
        let summary = summarize(&[]);
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.received, 0);
        assert_eq!(summary.loss_pct, 100.0);
        assert!(summary.latency.is_none());
    }

    #[test]
    fn all_success_has_zero_loss_and_ordered_stats() {
        let outcomes = [success(1, 10), success(2, 30), success(3, 20)];
        let summary = summarize(&outcomes);
        assert_eq!(summary.sent, 3);
        assert_eq!(summary.received, 3);
        assert_eq!(summary.lost, 0);
        assert_eq!(summary.loss_pct, 0.0);
        let latency = summary.latency.unwrap();
        assert!(latency.min_ms <= latency.avg_ms && latency.avg_ms <= latency.max_ms);
        assert_eq!(latency.min_ms, 10.0);
        assert_eq!(latency.max_ms, 30.0);
        assert_eq!(latency.avg_ms, 20.0);
    }

    #[test]
    fn all_failures_report_no_latency() {
        let outcomes = [
            failure(1, OutcomeKind::Timeout),
            failure(2, OutcomeKind::ConnectionRefused),
            failure(3, OutcomeKind::Unreachable),
        ];
        let summary = summarize(&outcomes);
        assert_eq!(summary.sent, 3);
        assert_eq!(summary.received, 0);
        assert_eq!(summary.loss_pct, 100.0);
        assert!(summary.latency.is_none());
    }

    #[test]
    fn mixed_outcomes_keep_loss_within_bounds() {
        let outcomes = [
            success(1, 12),
            failure(2, OutcomeKind::Timeout),
            success(3, 18),
            failure(4, OutcomeKind::ConnectionRefused),
        ];
        let summary = summarize(&outcomes);
        assert_eq!(summary.sent, 4);
        assert_eq!(summary.received, 2);
        assert_eq!(summary.lost, 2);
        assert_eq!(summary.loss_pct, 50.0);
        assert!(summary.received <= summary.sent);
        assert!((0.0..=100.0).contains(&summary.loss_pct));
    }

    #[test]
    fn partial_sequence_after_interruption_counts_only_dispatched() {
        // Two attempts completed before the run was cut short.
        let outcomes = [success(1, 9), success(2, 11)];
        let summary = summarize(&outcomes);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.loss_pct, 0.0);
    }

    #[test]
    fn cancelled_mid_flight_counts_as_sent_but_lost() {
        let outcomes = [success(1, 9), failure(2, OutcomeKind::Cancelled)];
        let summary = summarize(&outcomes);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.received, 1);
        assert_eq!(summary.loss_pct, 50.0);
    }

    #[test]
    fn summarize_is_idempotent() {
        let outcomes = [success(1, 10), failure(2, OutcomeKind::Timeout)];
        assert_eq!(summarize(&outcomes), summarize(&outcomes));
    }
}
