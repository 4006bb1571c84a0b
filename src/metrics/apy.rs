//! Forward-looking APY estimation and composition
//!
//! Reward yield is estimated from realized distribution history; bond
//! yield is the reference rebase rate supplied by the rate collaborator.
//! Net figures are composed independently per reporting horizon.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DistributionFlow;

/// Short reporting horizon, in days
pub const SHORT_WINDOW_DAYS: i64 = 28;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// APY estimates for one operator
///
/// Every field is independently optional; a horizon without enough data
/// reports as absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApyMetrics {
    /// Reward yield over the last 28 days, annualized percentage
    pub reward_apy_28d: Option<f64>,

    /// Reward yield over the operator's whole distribution history
    pub reward_apy_lifetime: Option<f64>,

    /// Bond rebase yield, as reported by the rate collaborator
    pub bond_apy: Option<f64>,

    /// Reward + bond yield over the short horizon
    pub net_apy_28d: Option<f64>,

    /// Reward + bond yield over the lifetime horizon
    pub net_apy_lifetime: Option<f64>,
}

/// Annualized reward yield over a horizon, as a percentage
///
/// Sums the positive distributions dated inside the horizon and
/// annualizes them against the current bond. `window_days = None` means
/// lifetime: the horizon runs from the earliest distribution to `now`.
///
/// Returns None when the bond is non-positive, no distribution
/// qualifies, or the lifetime horizon spans under one day.
pub fn reward_apy_over_window(
    distribution_flows: &[DistributionFlow],
    bond_eth: f64,
    window_days: Option<i64>,
    now: DateTime<Utc>,
) -> Option<f64> {
    if bond_eth <= 0.0 {
        return None;
    }

    let (window_start, horizon_days) = match window_days {
        Some(days) => (now - Duration::days(days), days as f64),
        None => {
            let earliest = distribution_flows.iter().map(|flow| flow.date).min()?;
            let days = (now - earliest).num_seconds() as f64 / SECONDS_PER_DAY;
            if days < 1.0 {
                return None;
            }
            (earliest, days)
        }
    };

    let mut total = 0.0;
    let mut qualifying = 0u32;
    for flow in distribution_flows {
        if flow.amount_eth > 0.0 && flow.date >= window_start && flow.date <= now {
            total += flow.amount_eth;
            qualifying += 1;
        }
    }
    if qualifying == 0 {
        return None;
    }

    Some((total / bond_eth) * (365.0 / horizon_days) * 100.0)
}

/// Combine a reward yield with the bond rebase yield
///
/// An absent reward yield contributes zero rather than poisoning the net
/// figure. A net figure is only reported when the bond yield is known:
/// without the rebase component the sum would systematically understate
/// the operator's position.
pub fn compose_net_apy(reward_apy: Option<f64>, bond_apy: Option<f64>) -> Option<f64> {
    match (reward_apy, bond_apy) {
        (Some(reward), Some(bond)) => Some(reward + bond),
        (None, Some(bond)) => Some(bond),
        _ => None,
    }
}

/// Assemble APY metrics for both reporting horizons
pub fn calculate_apy_metrics(
    distribution_flows: &[DistributionFlow],
    bond_eth: f64,
    bond_apy: Option<f64>,
    now: DateTime<Utc>,
) -> ApyMetrics {
    let reward_apy_28d =
        reward_apy_over_window(distribution_flows, bond_eth, Some(SHORT_WINDOW_DAYS), now);
    let reward_apy_lifetime = reward_apy_over_window(distribution_flows, bond_eth, None, now);

    ApyMetrics {
        reward_apy_28d,
        reward_apy_lifetime,
        bond_apy,
        net_apy_28d: compose_net_apy(reward_apy_28d, bond_apy),
        net_apy_lifetime: compose_net_apy(reward_apy_lifetime, bond_apy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flow(days_ago: i64, amount_eth: f64, now: DateTime<Utc>) -> DistributionFlow {
        DistributionFlow {
            date: now - Duration::days(days_ago),
            amount_eth,
        }
    }

    #[test]
    fn test_short_window_annualization() {
        let now = Utc::now();
        let flows = vec![flow(10, 0.1, now)];

        let apy = reward_apy_over_window(&flows, 2.0, Some(28), now).unwrap();
        let expected = (0.1 / 2.0) * (365.0 / 28.0) * 100.0;
        assert_abs_diff_eq!(apy, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_flows_outside_window_excluded() {
        let now = Utc::now();
        let flows = vec![flow(10, 0.1, now), flow(60, 5.0, now)];

        let apy = reward_apy_over_window(&flows, 2.0, Some(28), now).unwrap();
        let expected = (0.1 / 2.0) * (365.0 / 28.0) * 100.0;
        assert_abs_diff_eq!(apy, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_lifetime_spans_earliest_flow() {
        let now = Utc::now();
        let flows = vec![flow(365, 0.1, now), flow(100, 0.1, now)];

        let apy = reward_apy_over_window(&flows, 2.0, None, now).unwrap();
        let expected = (0.2 / 2.0) * (365.0 / 365.0) * 100.0;
        assert_abs_diff_eq!(apy, expected, epsilon = 0.1);
    }

    #[test]
    fn test_zero_bond_is_absent() {
        let now = Utc::now();
        let flows = vec![flow(10, 0.1, now)];
        assert!(reward_apy_over_window(&flows, 0.0, Some(28), now).is_none());
        assert!(reward_apy_over_window(&flows, -1.0, Some(28), now).is_none());
    }

    #[test]
    fn test_no_distributions_is_absent() {
        let now = Utc::now();
        assert!(reward_apy_over_window(&[], 2.0, Some(28), now).is_none());
        assert!(reward_apy_over_window(&[], 2.0, None, now).is_none());
    }

    #[test]
    fn test_lifetime_under_one_day_is_absent() {
        let now = Utc::now();
        let flows = vec![DistributionFlow {
            date: now - Duration::hours(6),
            amount_eth: 0.1,
        }];
        assert!(reward_apy_over_window(&flows, 2.0, None, now).is_none());
    }

    #[test]
    fn test_compose_policy() {
        assert_eq!(compose_net_apy(Some(2.0), Some(3.0)), Some(5.0));
        // Bond yield stands alone when no reward yield exists
        assert_eq!(compose_net_apy(None, Some(3.0)), Some(3.0));
        // Reward yield alone cannot form a net figure
        assert_eq!(compose_net_apy(Some(2.0), None), None);
        assert_eq!(compose_net_apy(None, None), None);
    }

    #[test]
    fn test_metrics_per_horizon() {
        let now = Utc::now();
        // One recent distribution and one old one: both horizons populate,
        // with different rates
        let flows = vec![flow(10, 0.1, now), flow(300, 0.1, now)];

        let metrics = calculate_apy_metrics(&flows, 2.0, Some(3.0), now);
        assert!(metrics.reward_apy_28d.is_some());
        assert!(metrics.reward_apy_lifetime.is_some());
        assert!(metrics.reward_apy_28d.unwrap() > metrics.reward_apy_lifetime.unwrap());
        assert_abs_diff_eq!(
            metrics.net_apy_28d.unwrap(),
            metrics.reward_apy_28d.unwrap() + 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_metrics_without_bond_apy() {
        let now = Utc::now();
        let flows = vec![flow(10, 0.1, now)];

        let metrics = calculate_apy_metrics(&flows, 2.0, None, now);
        assert!(metrics.reward_apy_28d.is_some());
        assert!(metrics.net_apy_28d.is_none());
        assert!(metrics.net_apy_lifetime.is_none());
    }
}
