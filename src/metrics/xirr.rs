//! Money-weighted rate of return (XIRR) over irregularly dated cash flows
//!
//! Solved with Newton's method on the net present value function.

use super::cashflow::CashFlow;

/// Length of a year for cash-flow year fractions, in days
const DAYS_PER_YEAR: f64 = 365.25;

/// Default initial rate guess (10% annualized)
const DEFAULT_GUESS: f64 = 0.10;

/// Convergence tolerance on successive rate iterates
const TOLERANCE: f64 = 1e-6;

/// Iteration cap before giving up
const MAX_ITERATIONS: u32 = 100;

/// Calculate XIRR with the default guess, tolerance, and iteration cap
///
/// Returns the annualized money-weighted return as a percentage, or None
/// when no rate is computable: fewer than two flows, a degenerate
/// derivative, or non-convergence. Callers treat None as "rate
/// undetermined", a normal displayable state rather than a fault.
pub fn calculate_xirr(cash_flows: &[CashFlow]) -> Option<f64> {
    calculate_xirr_with(cash_flows, DEFAULT_GUESS, TOLERANCE, MAX_ITERATIONS)
}

/// Calculate XIRR with explicit solver parameters
///
/// Newton's method on `NPV(r) = sum(amount_i / (1+r)^t_i)` where `t_i` is
/// the fraction of a 365.25-day year between the first flow and flow `i`.
/// The iterate is clamped to [-99%, +1000%] after every step so a wild
/// step cannot overflow the exponentials. Deterministic for identical
/// inputs; there are no randomized restarts.
pub fn calculate_xirr_with(
    cash_flows: &[CashFlow],
    guess: f64,
    tolerance: f64,
    max_iterations: u32,
) -> Option<f64> {
    // No rate is computable from fewer than two flows
    if cash_flows.len() < 2 {
        return None;
    }

    let t0 = cash_flows[0].date;
    let year_fracs: Vec<f64> = cash_flows
        .iter()
        .map(|cf| (cf.date - t0).num_seconds() as f64 / (DAYS_PER_YEAR * 86_400.0))
        .collect();

    let mut rate = guess;
    for _ in 0..max_iterations {
        let mut npv = 0.0;
        let mut dnpv = 0.0;
        for (cf, &t) in cash_flows.iter().zip(&year_fracs) {
            let discount = (1.0 + rate).powf(t);
            if discount == 0.0 {
                return None;
            }
            npv += cf.amount_eth / discount;
            if t != 0.0 {
                dnpv -= t * cf.amount_eth / (1.0 + rate).powf(t + 1.0);
            }
        }

        // A near-zero derivative makes the Newton step unstable; refuse
        // rather than risk divergence
        if dnpv.abs() < 1e-12 {
            return None;
        }

        let new_rate = (rate - npv / dnpv).clamp(-0.99, 10.0);

        if (new_rate - rate).abs() < tolerance {
            return Some(new_rate * 100.0);
        }

        rate = new_rate;
    }

    None
}
