//! Workout - several counters fed from the same pose stream
//!
//! Each counter still owns its own state; the workout only fans frames out
//! and forwards completed reps to the sink.

use super::config::{ConfigError, Exercise, ExerciseConfig};
use super::detector::RepCounter;
use super::event::{CounterSnapshot, RepetitionEvent};
use super::sink::{RepRecord, RepSink};
use crate::pose::Pose;

/// Ordered set of counters, at most one per exercise
#[derive(Clone, Debug, Default)]
pub struct Workout {
    counters: Vec<RepCounter>,
    notes: Option<String>,
}

impl Workout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workout with preset counters for the given exercises
    pub fn with_exercises<I>(exercises: I) -> Self
    where
        I: IntoIterator<Item = Exercise>,
    {
        let mut workout = Self::new();
        for exercise in exercises {
            workout.insert(RepCounter::for_exercise(exercise));
        }
        workout
    }

    /// Notes attached to every record this workout emits
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    /// Add a counter from a config, replacing any counter for the same exercise
    pub fn add(&mut self, config: ExerciseConfig) -> Result<(), ConfigError> {
        let counter = RepCounter::new(config)?;
        self.insert(counter);
        Ok(())
    }

    fn insert(&mut self, counter: RepCounter) {
        match self
            .counters
            .iter_mut()
            .find(|c| c.exercise() == counter.exercise())
        {
            Some(existing) => *existing = counter,
            None => self.counters.push(counter),
        }
    }

    /// Feed one frame to every counter in insertion order.
    ///
    /// Completed reps are recorded in `sink` as they occur.
    pub fn process<S>(
        &mut self,
        pose: &Pose,
        timestamp_ms: f64,
        sink: &mut S,
    ) -> Vec<(Exercise, RepetitionEvent)>
    where
        S: RepSink + ?Sized,
    {
        let mut out = Vec::new();
        for counter in &mut self.counters {
            let exercise = counter.exercise();
            for event in counter.process(pose, timestamp_ms) {
                if event.is_rep() {
                    sink.record(RepRecord::single(exercise, self.notes.clone()));
                }
                out.push((exercise, event));
            }
        }
        out
    }

    pub fn counter(&self, exercise: Exercise) -> Option<&RepCounter> {
        self.counters.iter().find(|c| c.exercise() == exercise)
    }

    pub fn count(&self, exercise: Exercise) -> Option<u32> {
        self.counter(exercise).map(RepCounter::count)
    }

    /// Reset one counter; false if the workout does not track it
    pub fn reset(&mut self, exercise: Exercise) -> bool {
        match self.counters.iter_mut().find(|c| c.exercise() == exercise) {
            Some(counter) => {
                counter.reset();
                true
            }
            None => false,
        }
    }

    pub fn exercises(&self) -> impl Iterator<Item = Exercise> + '_ {
        self.counters.iter().map(RepCounter::exercise)
    }

    pub fn snapshots(&self) -> Vec<CounterSnapshot> {
        self.counters.iter().map(RepCounter::snapshot).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
