use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::util::{mean, std_dev};

/// Number of results the ledger keeps.
pub const LEDGER_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub cps: f64,
    pub timestamp: DateTime<Local>,
}

impl ScoreRecord {
    pub fn new(cps: f64, timestamp: DateTime<Local>) -> Self {
        Self {
            cps: cps.max(0.0),
            timestamp,
        }
    }
}

/// Bounded history of completed runs, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: VecDeque<ScoreRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored records, keeping only the newest `LEDGER_CAPACITY`.
    pub fn from_records<I: IntoIterator<Item = ScoreRecord>>(records: I) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.push(record);
        }
        ledger
    }

    pub fn record_result(&mut self, cps: f64) -> &Self {
        self.record_result_at(cps, Local::now())
    }

    pub fn record_result_at(&mut self, cps: f64, timestamp: DateTime<Local>) -> &Self {
        self.push(ScoreRecord::new(cps, timestamp));
        self
    }

    fn push(&mut self, record: ScoreRecord) {
        self.records.push_back(record);
        while self.records.len() > LEDGER_CAPACITY {
            self.records.pop_front();
        }
    }

    pub fn best_score(&self) -> Option<f64> {
        self.records.iter().map(|r| r.cps).reduce(f64::max)
    }

    pub fn average_score(&self) -> Option<f64> {
        mean(self.records.iter().map(|r| r.cps))
    }

    /// Spread of the stored scores; a rough consistency indicator.
    pub fn consistency(&self) -> Option<f64> {
        let scores = self.scores().collect::<Vec<f64>>();
        std_dev(&scores)
    }

    /// The newest `n` records, most recent first.
    pub fn recent_history(&self, n: usize) -> impl Iterator<Item = &ScoreRecord> + Clone + '_ {
        self.records.iter().rev().take(n)
    }

    /// All records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &ScoreRecord> + '_ {
        self.records.iter()
    }

    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.cps)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
