//! File loaders for operator batches and APR histories
//!
//! Loads the JSON operator batch produced by the ledger collaborator and
//! the CSV APR history produced by the rate collaborator.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::warn;
use thiserror::Error;

use super::data::{AprSample, BatchInput};
use crate::metrics::AprHistory;

/// Failure to load collaborator data from disk
///
/// Only file and format faults surface here; data-poor operators are a
/// normal engine outcome, not a load error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid operator JSON in {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid APR history CSV in {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("APR history in {path} is not sorted ascending by block")]
    Unsorted { path: String },
}

/// Load a batch of operator inputs from a JSON file
pub fn load_operator_inputs(path: &Path) -> Result<BatchInput, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_reader(file).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Load an APR history from a headered CSV file (`block,block_time,apr`)
///
/// Rows that fail to parse are skipped with a warning. The series must
/// arrive sorted ascending by block; lookups rely on that ordering, so an
/// out-of-order file is rejected here rather than silently averaging the
/// wrong window.
pub fn load_apr_history(path: &Path) -> Result<AprHistory, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut samples: Vec<AprSample> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv {
            path: path.display().to_string(),
            source,
        })?;

        let block = record.get(0).and_then(|s| s.trim().parse::<u64>().ok());
        let block_time = record
            .get(1)
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let apr = record.get(2).and_then(|s| s.trim().parse::<f64>().ok());

        match (block, block_time, apr) {
            (Some(block), Some(block_time), Some(apr)) => samples.push(AprSample {
                block,
                block_time,
                apr,
            }),
            _ => warn!("skipping malformed APR history row: {:?}", record),
        }
    }

    if samples.windows(2).any(|pair| pair[0].block > pair[1].block) {
        return Err(LoadError::Unsorted {
            path: path.display().to_string(),
        });
    }

    Ok(AprHistory::new(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("staking_metrics_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_operator_inputs() {
        let path = write_temp(
            "operators.json",
            r#"{
                "operators": [{
                    "operator_id": 7,
                    "bond_events": [{
                        "kind": "deposit_eth",
                        "block_number": 1000000,
                        "timestamp": "2024-01-01T00:00:00+00:00",
                        "amount_wei": 2000000000000000000,
                        "amount_eth": 2.0,
                        "tx_hash": "0xabab",
                        "flow_direction": 1
                    }],
                    "total_rewards_eth": 0.2,
                    "current_bond_eth": 2.0,
                    "current_apr": 3.1
                }]
            }"#,
        );

        let batch = load_operator_inputs(&path).unwrap();
        assert_eq!(batch.operators.len(), 1);
        assert_eq!(batch.operators[0].operator_id, 7);
        assert_eq!(batch.operators[0].bond_events[0].amount_eth, 2.0);
        assert_eq!(batch.operators[0].current_apr, Some(3.1));
    }

    #[test]
    fn test_load_operator_inputs_bad_json() {
        let path = write_temp("bad.json", "{not json");
        assert!(matches!(
            load_operator_inputs(&path),
            Err(LoadError::Json { .. })
        ));
    }

    #[test]
    fn test_load_operator_inputs_missing_file() {
        let path = std::env::temp_dir().join("staking_metrics_does_not_exist.json");
        assert!(matches!(
            load_operator_inputs(&path),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_load_apr_history() {
        let path = write_temp(
            "apr.csv",
            "block,block_time,apr\n\
             100,2024-01-01T00:00:00+00:00,3.0\n\
             200,2024-02-01T00:00:00+00:00,3.2\n",
        );

        let history = load_apr_history(&path).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.samples()[1].apr, 3.2);
    }

    #[test]
    fn test_load_apr_history_skips_malformed_rows() {
        let path = write_temp(
            "apr_malformed.csv",
            "block,block_time,apr\n\
             100,2024-01-01T00:00:00+00:00,3.0\n\
             nonsense,also nonsense,much\n\
             200,2024-02-01T00:00:00+00:00,3.2\n",
        );

        let history = load_apr_history(&path).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_load_apr_history_rejects_unsorted() {
        let path = write_temp(
            "apr_unsorted.csv",
            "block,block_time,apr\n\
             200,2024-02-01T00:00:00+00:00,3.2\n\
             100,2024-01-01T00:00:00+00:00,3.0\n",
        );

        assert!(matches!(
            load_apr_history(&path),
            Err(LoadError::Unsorted { .. })
        ));
    }
}
