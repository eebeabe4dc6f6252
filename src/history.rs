use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (timestamp, focus score) point retained for the trend chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySample {
    pub timestamp: DateTime<Utc>,
    pub focus_score: f64,
}

/// Fixed-capacity rolling buffer of focus samples, appended only at dispatch
/// time so chart points always land in dispatch order.
#[derive(Debug)]
pub struct HistoryRing {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, timestamp: DateTime<Utc>, focus_score: f64) {
        self.samples.push_back(HistorySample {
            timestamp,
            focus_score,
        });
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Ordered copy for rendering; oldest first.
    pub fn snapshot(&self) -> Vec<HistorySample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
