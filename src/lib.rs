//! Staking Metrics - Financial metrics engine for staking node operators
//!
//! This library provides:
//! - Cash-flow construction from bond ledger events and reward distributions
//! - Money-weighted return (XIRR) via Newton's method
//! - Reference-rate range lookups with prior-sample fallback
//! - Capital efficiency metrics against a rebase-rate benchmark
//! - Reward and bond APY estimation and composition
//!
//! The engine is synchronous and side-effect-free: every computation is a
//! pure function of its inputs, so callers may invoke it concurrently
//! without coordination. Metrics that cannot be computed are reported as
//! absent values, never as errors.

pub mod cache;
pub mod events;
pub mod metrics;

// Re-export commonly used types
pub use cache::{Clock, SystemClock, TtlCache};
pub use events::{AprSample, BondEvent, BondEventKind, DistributionFlow, FlowDirection};
pub use metrics::{
    calculate_apy_metrics, calculate_capital_efficiency, calculate_xirr, AprHistory, ApyMetrics,
    CapitalEfficiency, CashFlow, RateAggregator,
};
