//! Reference-rate series lookups and range averaging

use chrono::{DateTime, Utc};

use crate::events::AprSample;

/// Range lookup capability over a reference-rate series
///
/// The capital-efficiency calculator takes this as an explicit dependency
/// so benchmark selection stays testable in isolation from any concrete
/// rate source.
pub trait RateAggregator {
    /// Rate of the last sample at or before the given block
    fn rate_at_or_before(&self, block: u64) -> Option<f64>;

    /// Mean rate over `[start, end]`, falling back to the latest sample
    /// strictly before the range when none lands inside it
    fn average_over_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<f64>;
}

/// Oracle report history, sorted ascending by block
///
/// Callers guarantee the ordering; lookups rely on it for early exit and
/// never sort.
#[derive(Debug, Clone, Default)]
pub struct AprHistory {
    samples: Vec<AprSample>,
}

impl AprHistory {
    pub fn new(samples: Vec<AprSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[AprSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl RateAggregator for AprHistory {
    fn rate_at_or_before(&self, block: u64) -> Option<f64> {
        let mut closest = None;
        for sample in &self.samples {
            if sample.block <= block {
                closest = Some(sample.apr);
            } else {
                break;
            }
        }
        closest
    }

    /// A window that predates every report still gets a usable benchmark:
    /// the closest prior observation beats no estimate at all.
    fn average_over_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<f64> {
        let mut closest_before = None;
        let mut sum = 0.0;
        let mut count: u32 = 0;

        for sample in &self.samples {
            if sample.block_time < start {
                closest_before = Some(sample.apr);
            } else if sample.block_time <= end {
                sum += sample.apr;
                count += 1;
            } else {
                break;
            }
        }

        if count > 0 {
            Some(sum / count as f64)
        } else {
            closest_before
        }
    }
}
