//! Ledger event and rate-series records supplied by external collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a bond ledger movement
///
/// The ledger reports a non-negative amount for every event; the direction
/// carries the sign. Serialized as the signed unit the ledger emits
/// (`1` = deposit, `-1` = withdrawal or claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum FlowDirection {
    /// Capital deposited into the bond
    Deposit,
    /// Capital withdrawn, claimed, or burned
    Withdrawal,
}

impl FlowDirection {
    /// Signed multiplier applied to the event amount
    pub fn sign(&self) -> f64 {
        match self {
            FlowDirection::Deposit => 1.0,
            FlowDirection::Withdrawal => -1.0,
        }
    }
}

impl TryFrom<i8> for FlowDirection {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FlowDirection::Deposit),
            -1 => Ok(FlowDirection::Withdrawal),
            other => Err(format!("invalid flow direction: {}", other)),
        }
    }
}

impl From<FlowDirection> for i8 {
    fn from(direction: FlowDirection) -> Self {
        match direction {
            FlowDirection::Deposit => 1,
            FlowDirection::Withdrawal => -1,
        }
    }
}

/// Classification tag attached to a bond ledger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondEventKind {
    DepositEth,
    DepositSteth,
    DepositWsteth,
    ClaimSteth,
    ClaimUnsteth,
    BondBurned,
    /// Tag from a ledger version this crate does not recognize
    #[serde(other)]
    Other,
}

/// One bond ledger movement for an operator
///
/// Timestamps arrive as ISO-8601 strings and are parsed on use; an event
/// with a malformed timestamp is skipped by date-sensitive calculations
/// rather than failing the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondEvent {
    /// Event classification from the ledger
    pub kind: BondEventKind,

    /// Block the event was mined in
    pub block_number: u64,

    /// ISO-8601 timestamp of the containing block
    pub timestamp: String,

    /// Amount in wei (base units)
    pub amount_wei: u128,

    /// Amount in ETH (display units); always non-negative
    pub amount_eth: f64,

    /// Transaction hash reference
    pub tx_hash: String,

    /// +1 = capital deposited, -1 = capital withdrawn or claimed
    pub flow_direction: FlowDirection,
}

impl BondEvent {
    /// Parse the ledger timestamp, returning None when malformed
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether this event added capital to the bond
    pub fn is_deposit(&self) -> bool {
        self.flow_direction == FlowDirection::Deposit
    }
}

/// One reward distribution credited to the operator outside the bond ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionFlow {
    /// When the distribution was paid out
    pub date: DateTime<Utc>,

    /// Amount paid out, in ETH; conventionally positive
    pub amount_eth: f64,
}

/// One oracle report of the reference rebase rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AprSample {
    /// Block of the oracle report; series are sorted ascending by block
    pub block: u64,

    /// Timestamp of the report block
    pub block_time: DateTime<Utc>,

    /// Annualized rate, as a percentage
    pub apr: f64,
}

/// Everything needed to compute metrics for one operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorInput {
    /// Module-assigned operator identifier
    pub operator_id: u64,

    /// Bond ledger history, in occurrence order
    pub bond_events: Vec<BondEvent>,

    /// Lifetime distributed rewards, in ETH
    pub total_rewards_eth: f64,

    /// Current bond value, in ETH
    pub current_bond_eth: f64,

    /// Point-in-time reference rebase rate, as a percentage
    #[serde(default)]
    pub current_apr: Option<f64>,

    /// Individual reward distributions, when the collaborator supplies them
    #[serde(default)]
    pub distribution_flows: Vec<DistributionFlow>,
}

/// Batch of operator inputs, as loaded from disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub operators: Vec<OperatorInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(timestamp: &str) -> BondEvent {
        BondEvent {
            kind: BondEventKind::DepositEth,
            block_number: 1_000_000,
            timestamp: timestamp.to_string(),
            amount_wei: 2_000_000_000_000_000_000,
            amount_eth: 2.0,
            tx_hash: format!("0x{}", "ab".repeat(32)),
            flow_direction: FlowDirection::Deposit,
        }
    }

    #[test]
    fn test_flow_direction_wire_format() {
        let deposit: FlowDirection = serde_json::from_str("1").unwrap();
        let withdrawal: FlowDirection = serde_json::from_str("-1").unwrap();
        assert_eq!(deposit, FlowDirection::Deposit);
        assert_eq!(withdrawal, FlowDirection::Withdrawal);

        assert_eq!(serde_json::to_string(&deposit).unwrap(), "1");
        assert_eq!(serde_json::to_string(&withdrawal).unwrap(), "-1");

        // Any other integer is rejected, not coerced
        assert!(serde_json::from_str::<FlowDirection>("0").is_err());
        assert!(serde_json::from_str::<FlowDirection>("2").is_err());
    }

    #[test]
    fn test_flow_direction_sign() {
        assert_eq!(FlowDirection::Deposit.sign(), 1.0);
        assert_eq!(FlowDirection::Withdrawal.sign(), -1.0);
    }

    #[test]
    fn test_event_kind_snake_case() {
        let kind: BondEventKind = serde_json::from_str("\"deposit_eth\"").unwrap();
        assert_eq!(kind, BondEventKind::DepositEth);

        // Unknown tags map to Other instead of failing the event
        let kind: BondEventKind = serde_json::from_str("\"deposit_future_token\"").unwrap();
        assert_eq!(kind, BondEventKind::Other);
    }

    #[test]
    fn test_parsed_timestamp() {
        let event = sample_event("2024-01-15T12:30:00+00:00");
        let parsed = event.parsed_timestamp().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-15T12:30:00+00:00");

        assert!(sample_event("not a date").parsed_timestamp().is_none());
        assert!(sample_event("").parsed_timestamp().is_none());
    }

    #[test]
    fn test_bond_event_round_trip() {
        let event = sample_event("2024-01-15T12:30:00+00:00");
        let json = serde_json::to_string(&event).unwrap();
        let back: BondEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.block_number, event.block_number);
        assert_eq!(back.amount_wei, event.amount_wei);
        assert_eq!(back.flow_direction, FlowDirection::Deposit);
    }

    #[test]
    fn test_operator_input_optional_fields() {
        let json = r#"{
            "operator_id": 7,
            "bond_events": [],
            "total_rewards_eth": 0.5,
            "current_bond_eth": 2.0
        }"#;
        let input: OperatorInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.operator_id, 7);
        assert!(input.current_apr.is_none());
        assert!(input.distribution_flows.is_empty());
    }
}
