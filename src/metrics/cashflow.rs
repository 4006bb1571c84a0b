//! Cash-flow construction for money-weighted return calculations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{BondEvent, DistributionFlow};

/// A single dated cash flow from the operator's point of view
///
/// Negative = capital out of the operator's pocket (investment),
/// positive = capital returned. Internal to the solver path; result
/// records never expose it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: DateTime<Utc>,
    pub amount_eth: f64,
}

/// Build the cash-flow series for an XIRR calculation
///
/// Bond deposits become negative flows at their ledger timestamp (events
/// with malformed timestamps are skipped), positive reward distributions
/// become positive flows, and a positive current bond value is appended
/// as a terminal flow at `now` (the value redeemable by exiting today).
///
/// Returns an empty series unless at least one strictly negative and one
/// strictly positive flow exist; a return without capital at risk, or
/// with no offsetting inflow, has no meaningful rate. The result is
/// sorted ascending by date.
pub fn build_cash_flows(
    bond_events: &[BondEvent],
    distribution_flows: &[DistributionFlow],
    current_bond_eth: f64,
    now: DateTime<Utc>,
) -> Vec<CashFlow> {
    let mut flows = Vec::new();

    for event in bond_events {
        if !event.is_deposit() {
            continue;
        }
        let Some(date) = event.parsed_timestamp() else {
            continue;
        };
        flows.push(CashFlow {
            date,
            amount_eth: -event.amount_eth,
        });
    }

    for dist in distribution_flows {
        if dist.amount_eth > 0.0 {
            flows.push(CashFlow {
                date: dist.date,
                amount_eth: dist.amount_eth,
            });
        }
    }

    if current_bond_eth > 0.0 {
        flows.push(CashFlow {
            date: now,
            amount_eth: current_bond_eth,
        });
    }

    let has_negative = flows.iter().any(|cf| cf.amount_eth < 0.0);
    let has_positive = flows.iter().any(|cf| cf.amount_eth > 0.0);
    if !(has_negative && has_positive) {
        return Vec::new();
    }

    flows.sort_by_key(|cf| cf.date);
    flows
}
