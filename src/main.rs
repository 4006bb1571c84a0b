//! Staking Metrics CLI
//!
//! Computes capital efficiency and APY metrics for a batch of operators
//! from a JSON input file, optionally benchmarked against a CSV APR
//! history. Supports JSON output for API integration via --json.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;

use staking_metrics::events::{load_apr_history, load_operator_inputs, OperatorInput};
use staking_metrics::metrics::{
    calculate_apy_metrics, calculate_capital_efficiency, AprHistory, ApyMetrics,
    CapitalEfficiency, RateAggregator,
};

#[derive(Parser)]
#[command(
    name = "staking_metrics",
    version,
    about = "Capital efficiency and APY metrics for staking node operators"
)]
struct Args {
    /// JSON file with operator bond events and reward data
    input: PathBuf,

    /// CSV APR history (block,block_time,apr) for benchmark averaging
    #[arg(long)]
    apr_history: Option<PathBuf>,

    /// Evaluation instant (RFC 3339); defaults to now
    #[arg(long)]
    as_of: Option<DateTime<Utc>>,

    /// Emit a single JSON document instead of the report
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct OperatorReport {
    operator_id: u64,
    capital_efficiency: Option<CapitalEfficiency>,
    apy: ApyMetrics,
}

#[derive(Serialize)]
struct BatchReport {
    as_of: DateTime<Utc>,
    operator_count: usize,
    operators: Vec<OperatorReport>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let batch = load_operator_inputs(&args.input)
        .with_context(|| format!("loading operators from {}", args.input.display()))?;

    let history = match &args.apr_history {
        Some(path) => Some(
            load_apr_history(path)
                .with_context(|| format!("loading APR history from {}", path.display()))?,
        ),
        None => None,
    };

    let as_of = args.as_of.unwrap_or_else(Utc::now);

    let operators: Vec<OperatorReport> = batch
        .operators
        .par_iter()
        .map(|operator| report_for(operator, history.as_ref(), as_of))
        .collect();

    let report = BatchReport {
        as_of,
        operator_count: operators.len(),
        operators,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn report_for(
    operator: &OperatorInput,
    history: Option<&AprHistory>,
    as_of: DateTime<Utc>,
) -> OperatorReport {
    let aggregator = history.map(|h| h as &dyn RateAggregator);
    let distribution_flows = if operator.distribution_flows.is_empty() {
        None
    } else {
        Some(operator.distribution_flows.as_slice())
    };

    let capital_efficiency = calculate_capital_efficiency(
        &operator.bond_events,
        operator.total_rewards_eth,
        operator.current_bond_eth,
        operator.current_apr,
        aggregator,
        distribution_flows,
        as_of,
    );

    let apy = calculate_apy_metrics(
        &operator.distribution_flows,
        operator.current_bond_eth,
        operator.current_apr,
        as_of,
    );

    OperatorReport {
        operator_id: operator.operator_id,
        capital_efficiency,
        apy,
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}

fn print_report(report: &BatchReport) {
    println!("Staking Metrics v0.1.0");
    println!("======================\n");
    println!("As of: {}", report.as_of.to_rfc3339());
    println!("Operators: {}\n", report.operator_count);

    for operator in &report.operators {
        println!("Operator {}", operator.operator_id);

        match &operator.capital_efficiency {
            Some(ce) => {
                println!("  Capital deployed:  {:.6} ETH", ce.total_capital_deployed_eth);
                println!("  Total return:      {:.6} ETH", ce.total_return_eth);
                println!("  Annualized return: {:.2}%", ce.annualized_return_pct);
                println!("  Benchmark:         {}", fmt_pct(ce.benchmark_return_pct));
                match ce.advantage_ratio {
                    Some(ratio) => println!("  Advantage ratio:   {:.2}x", ratio),
                    None => println!("  Advantage ratio:   n/a"),
                }
                println!(
                    "  First deposit:     {} ({:.1} days)",
                    ce.first_deposit_date.format("%Y-%m-%d"),
                    ce.days_operating
                );
                println!("  XIRR:              {}", fmt_pct(ce.xirr_pct));
            }
            None => println!("  Capital efficiency: insufficient data"),
        }

        println!("  Reward APY (28d):  {}", fmt_pct(operator.apy.reward_apy_28d));
        println!("  Reward APY (life): {}", fmt_pct(operator.apy.reward_apy_lifetime));
        println!("  Bond APY:          {}", fmt_pct(operator.apy.bond_apy));
        println!("  Net APY (28d):     {}", fmt_pct(operator.apy.net_apy_28d));
        println!("  Net APY (life):    {}", fmt_pct(operator.apy.net_apy_lifetime));
        println!();
    }
}
