//! Persistence boundary
//!
//! The counter never stores history. Each completed rep becomes one
//! `RepRecord` with `repetitions = 1`; summing them into a per-day total is
//! the sink's job.

use serde::{Deserialize, Serialize};

use super::config::Exercise;

/// One unit of work for the persistence collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepRecord {
    pub exercise_name: String,
    pub repetitions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RepRecord {
    /// A single completed rep of `exercise`
    pub fn single(exercise: Exercise, notes: Option<String>) -> Self {
        Self {
            exercise_name: exercise.record_name().to_string(),
            repetitions: 1,
            notes,
        }
    }
}

/// Receives rep records as they happen
pub trait RepSink {
    fn record(&mut self, record: RepRecord);
}

/// Sink that keeps records in memory until drained
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Vec<RepRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[RepRecord] {
        &self.records
    }

    /// Take every pending record, oldest first
    pub fn drain(&mut self) -> Vec<RepRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RepSink for MemorySink {
    fn record(&mut self, record: RepRecord) {
        self.records.push(record);
    }
}

impl<F> RepSink for F
where
    F: FnMut(RepRecord),
{
    fn record(&mut self, record: RepRecord) {
        self(record)
    }
}
