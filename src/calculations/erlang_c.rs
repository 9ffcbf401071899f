//! Erlang-C traffic formulas over scalar inputs.
//!
//! Every function is pure and total: degenerate regimes (saturated or
//! empty queues, non-finite arithmetic) return the documented safe
//! default instead of an error, biased toward "needs more agents".

/// Offered load in Erlangs for one reporting interval.
///
/// No validation happens here; the staffing solver checks ranges
/// before it ever derives an intensity.
pub fn offered_load(calls: f64, interval_minutes: f64, handling_time_seconds: f64) -> f64 {
    calls / (interval_minutes * 60.0) * handling_time_seconds
}

/// Probability that an arriving call has to wait, per Erlang C.
///
/// Uses the backward-ratio recursion: the term for `k = agents` seeds
/// the ratio chain at 1.0, each lower term is the previous one
/// multiplied by `k / intensity`, and the denominator sums the terms
/// for `k < agents` only (the seed itself is excluded). No factorials
/// or powers, so large agent counts stay inside f64 range.
///
/// Saturated (`agents <= intensity`) or empty (`intensity <= 0`)
/// regimes return 1.0, certain wait.
pub fn wait_probability(intensity: f64, agents: u32) -> f64 {
    if agents == 0 || !intensity.is_finite() || intensity <= 0.0 || intensity >= agents as f64 {
        return 1.0;
    }

    let (sum, _) = (1..=agents)
        .rev()
        .fold((0.0_f64, 1.0_f64), |(sum, term), k| {
            let term = term * k as f64 / intensity;
            (sum + term, term)
        });

    let probability = 1.0 / (1.0 + (1.0 - intensity / agents as f64) * sum);
    if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Fraction of calls answered within `target_wait_seconds`.
///
/// The exponential term is the conditional wait distribution given
/// that a call waits at all. Degenerate inputs yield 0.0, the
/// worst-case assumption that the target is missed.
pub fn service_level(
    calls: f64,
    interval_minutes: f64,
    handling_time_seconds: f64,
    target_wait_seconds: f64,
    agents: u32,
) -> f64 {
    if handling_time_seconds <= 0.0 {
        return 0.0;
    }
    let intensity = offered_load(calls, interval_minutes, handling_time_seconds);
    if !intensity.is_finite() {
        return 0.0;
    }

    let waiting = wait_probability(intensity, agents);
    let exponent = -(agents as f64 - intensity) * target_wait_seconds / handling_time_seconds;
    let level = 1.0 - waiting * exponent.exp();
    if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 }
}

/// Agent utilization, capped at 0.99 so downstream Erlang-C terms stay
/// well-defined. Degenerate inputs yield the cap, which reads as
/// "maximally loaded" to any occupancy check.
pub fn occupancy(calls: f64, interval_minutes: f64, handling_time_seconds: f64, agents: u32) -> f64 {
    if agents == 0 {
        return 0.99;
    }
    let intensity = offered_load(calls, interval_minutes, handling_time_seconds);
    if !intensity.is_finite() {
        return 0.99;
    }
    (intensity / agents as f64).clamp(0.0, 0.99)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offered_load_matches_hand_calculation() {
        // 100 calls over 30 minutes at 360s AHT = 20 Erlangs
        assert_eq!(offered_load(100.0, 30.0, 360.0), 20.0);
    }

    #[test]
    fn saturated_queue_always_waits() {
        assert_eq!(wait_probability(20.0, 20), 1.0);
        assert_eq!(wait_probability(20.0, 5), 1.0);
        assert_eq!(wait_probability(0.0, 10), 1.0);
    }

    #[test]
    fn wait_probability_stays_in_unit_interval_for_large_counts() {
        let p = wait_probability(950.0, 1000);
        assert!(p > 0.0 && p < 1.0, "got {p}");
    }

    #[test]
    fn single_server_reduces_to_utilization() {
        // With one agent Erlang C is M/M/1: the wait probability is
        // exactly the utilization.
        assert!((wait_probability(0.5, 1) - 0.5).abs() < 1e-12);
    }
}
