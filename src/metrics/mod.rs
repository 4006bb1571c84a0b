//! Financial metrics core: cash flows, XIRR, rate aggregation, capital
//! efficiency, and APY composition

mod apy;
mod cashflow;
mod efficiency;
mod rates;
mod xirr;

pub use apy::{
    calculate_apy_metrics, compose_net_apy, reward_apy_over_window, ApyMetrics, SHORT_WINDOW_DAYS,
};
pub use cashflow::{build_cash_flows, CashFlow};
pub use efficiency::{calculate_capital_efficiency, CapitalEfficiency};
pub use rates::{AprHistory, RateAggregator};
pub use xirr::{calculate_xirr, calculate_xirr_with};
