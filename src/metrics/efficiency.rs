//! Capital efficiency metrics for a staking operator
//!
//! Compares the operator's realized annualized return against the
//! reference rebase rate over the operator's actual deployment window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cashflow::build_cash_flows;
use super::rates::RateAggregator;
use super::xirr::calculate_xirr;
use crate::events::{BondEvent, DistributionFlow};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Capital efficiency metrics for one operator
///
/// Monetary totals are rounded to 6 decimal places, percentages and
/// ratios to 2, days to 1, all at this boundary only; intermediate math
/// keeps full precision. Optional fields are absent, not zero, when the
/// underlying data is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalEfficiency {
    /// Lifetime reward distributions plus bond appreciation, in ETH
    pub total_return_eth: f64,

    /// Sum of all bond deposits, in ETH
    pub total_capital_deployed_eth: f64,

    /// Annualized return on time-weighted capital, as a percentage
    pub annualized_return_pct: f64,

    /// Reference rebase rate over the same window, as a percentage
    pub benchmark_return_pct: Option<f64>,

    /// Annualized return divided by benchmark; >1 means outperformance
    pub advantage_ratio: Option<f64>,

    /// Timestamp of the earliest bond deposit
    pub first_deposit_date: DateTime<Utc>,

    /// Days between the first deposit and the evaluation instant
    pub days_operating: f64,

    /// Money-weighted return, when distribution flows were supplied
    pub xirr_pct: Option<f64>,
}

/// Calculate capital efficiency metrics for one operator
///
/// Returns None for operators with insufficient data: no deposits, no
/// parseable deposit timestamp, a deployment window under one day, or
/// non-positive deployed capital. Those are common, expected states for
/// new operators, not faults.
///
/// The benchmark prefers the averaged historical rate over
/// `[first_deposit, now]`; when the aggregator has nothing for the
/// window it falls back to the point-in-time rate, and when neither is
/// available the benchmark (and the advantage ratio with it) is absent.
pub fn calculate_capital_efficiency(
    bond_events: &[BondEvent],
    total_rewards_eth: f64,
    current_bond_eth: f64,
    current_apr: Option<f64>,
    history: Option<&dyn RateAggregator>,
    distribution_flows: Option<&[DistributionFlow]>,
    now: DateTime<Utc>,
) -> Option<CapitalEfficiency> {
    let deposits: Vec<&BondEvent> = bond_events.iter().filter(|e| e.is_deposit()).collect();
    if deposits.is_empty() {
        return None;
    }

    // Ledger order is not trusted for this; take the explicit minimum
    // over parseable timestamps
    let first_deposit_date = deposits.iter().filter_map(|e| e.parsed_timestamp()).min()?;

    let days_operating = (now - first_deposit_date).num_seconds() as f64 / SECONDS_PER_DAY;
    // Sub-day windows annualize to unstable figures
    if days_operating < 1.0 {
        return None;
    }

    let total_capital_deployed: f64 = deposits.iter().map(|e| e.amount_eth).sum();
    if total_capital_deployed <= 0.0 {
        return None;
    }

    // Net capital still in the system: deposits minus claims and burns
    let net_deposits: f64 = bond_events
        .iter()
        .map(|e| e.amount_eth * e.flow_direction.sign())
        .sum();

    // Rebase appreciation not explained by net flows
    let bond_appreciation = current_bond_eth - net_deposits;
    let total_return = total_rewards_eth + bond_appreciation;

    // Approximate average capital at risk: each deposit weighted by how
    // long it has actually been deployed within the window
    let mut time_weighted_capital = 0.0;
    for event in &deposits {
        let Some(deposited_at) = event.parsed_timestamp() else {
            continue;
        };
        let days_deployed = (now - deposited_at).num_seconds() as f64 / SECONDS_PER_DAY;
        time_weighted_capital += event.amount_eth * (days_deployed / days_operating);
    }
    if time_weighted_capital <= 0.0 {
        time_weighted_capital = total_capital_deployed;
    }

    let annualized_return_pct =
        (total_return / time_weighted_capital) * (365.0 / days_operating) * 100.0;

    let benchmark = history
        .and_then(|h| h.average_over_range(first_deposit_date, now))
        .or(current_apr);

    let advantage_ratio = match benchmark {
        Some(rate) if rate > 0.0 => Some(annualized_return_pct / rate),
        _ => None,
    };

    let xirr_pct = distribution_flows
        .and_then(|flows| calculate_xirr(&build_cash_flows(bond_events, flows, current_bond_eth, now)));

    Some(CapitalEfficiency {
        total_return_eth: round_to(total_return, 6),
        total_capital_deployed_eth: round_to(total_capital_deployed, 6),
        annualized_return_pct: round_to(annualized_return_pct, 2),
        benchmark_return_pct: benchmark.map(|rate| round_to(rate, 2)),
        advantage_ratio: advantage_ratio.map(|ratio| round_to(ratio, 2)),
        first_deposit_date,
        days_operating: round_to(days_operating, 1),
        xirr_pct: xirr_pct.map(|rate| round_to(rate, 2)),
    })
}

/// Round to a fixed number of decimal places at the output boundary
fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
