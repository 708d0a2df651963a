//! Session storage and JS bridge
//!
//! JavaScript pushes one flat keypoint array per animation frame and pulls
//! events, overlay values and pending rep records back out. The session
//! lives in thread-local storage between calls.

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::error::CounterError;
use crate::counter::{
    CounterSnapshot, Exercise, ExerciseConfig, MemorySink, RepRecord, RepetitionEvent, Workout,
};
use crate::pose::{visible_keypoints, Keypoint, Pose, FLAT_POSE_LEN};

/// Keypoints scoring above this are drawn on the overlay by default
pub const DEFAULT_DISPLAY_SCORE: f32 = 0.5;

/// Event tagged with the exercise that produced it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaggedEvent {
    pub exercise: Exercise,
    #[serde(flatten)]
    pub event: RepetitionEvent,
}

// ============================================================================
// SESSION
// ============================================================================

/// Counters for one detection session plus reps not yet handed to JS
#[derive(Debug)]
pub struct Session {
    workout: Workout,
    pending: MemorySink,
}

impl Session {
    /// Preset counters for `exercises`, then `overrides` replacing presets
    /// of the same exercise (or adding new ones).
    pub fn start<I>(exercises: I, overrides: Vec<ExerciseConfig>) -> Result<Self, CounterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut workout = Workout::new();
        for name in exercises {
            let exercise: Exercise = name.as_ref().parse()?;
            workout.add(exercise.preset())?;
        }
        for config in overrides {
            workout.add(config)?;
        }
        if workout.is_empty() {
            return Err(CounterError::NoExercises);
        }

        Ok(Self {
            workout,
            pending: MemorySink::new(),
        })
    }

    pub fn push_flat(
        &mut self,
        data: &[f32],
        timestamp_ms: f64,
    ) -> Result<Vec<TaggedEvent>, CounterError> {
        let pose = parse_flat(data)?;
        Ok(self.push_pose(&pose, timestamp_ms))
    }

    pub fn push_pose(&mut self, pose: &Pose, timestamp_ms: f64) -> Vec<TaggedEvent> {
        self.workout
            .process(pose, timestamp_ms, &mut self.pending)
            .into_iter()
            .map(|(exercise, event)| TaggedEvent { exercise, event })
            .collect()
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.workout.set_notes(notes);
    }

    /// Rep records produced since the last call
    pub fn take_records(&mut self) -> Vec<RepRecord> {
        self.pending.drain()
    }

    pub fn snapshots(&self) -> Vec<CounterSnapshot> {
        self.workout.snapshots()
    }

    pub fn reset(&mut self, exercise: Exercise) -> bool {
        self.workout.reset(exercise)
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }
}

fn parse_flat(data: &[f32]) -> Result<Pose, CounterError> {
    Pose::from_flat(data).ok_or(CounterError::InvalidPoseLength {
        got: data.len(),
        expected: FLAT_POSE_LEN,
    })
}

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> Result<T, CounterError> {
    SESSION.with(|cell| {
        let mut slot = cell.borrow_mut();
        let session = slot.as_mut().ok_or(CounterError::NoSession)?;
        Ok(f(session))
    })
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, CounterError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Start a session, replacing any running one.
///
/// `exercises` is an array of names ("squat", "push_up", "biceps",
/// "jumping_jack", "vertical_jump"). `overrides` is null or an array of
/// exercise configs.
#[wasm_bindgen]
pub fn start_session(exercises: JsValue, overrides: JsValue) -> Result<(), JsValue> {
    let names: Vec<String> = serde_wasm_bindgen::from_value(exercises)
        .map_err(CounterError::from)?;
    let overrides: Vec<ExerciseConfig> = if overrides.is_null() || overrides.is_undefined() {
        Vec::new()
    } else {
        serde_wasm_bindgen::from_value(overrides).map_err(CounterError::from)?
    };

    let session = Session::start(&names, overrides)?;
    let tracked: Vec<&'static str> = session.workout().exercises().map(|e| e.as_str()).collect();
    log::info!("Session started: {}", tracked.join(", "));

    SESSION.with(|cell| *cell.borrow_mut() = Some(session));
    Ok(())
}

/// Called from JavaScript with a flat Float32Array of 51 values
/// (17 keypoints × x, y, score) and the frame time in milliseconds.
/// Returns the events this frame produced.
#[wasm_bindgen]
pub fn push_pose(data: &[f32], timestamp_ms: f64) -> Result<JsValue, JsValue> {
    if data.len() != FLAT_POSE_LEN {
        let msg = format!(
            "Invalid pose data length: {} (expected {})",
            data.len(),
            FLAT_POSE_LEN
        );
        web_sys::console::warn_1(&msg.into());
    }

    let events = with_session(|session| session.push_flat(data, timestamp_ms))??;
    Ok(to_js(&events)?)
}

/// Rep records to hand to the persistence call, each with repetitions = 1
#[wasm_bindgen]
pub fn take_rep_records() -> Result<JsValue, JsValue> {
    let records = with_session(Session::take_records)?;
    Ok(to_js(&records)?)
}

#[wasm_bindgen]
pub fn set_session_notes(notes: Option<String>) -> Result<(), JsValue> {
    with_session(|session| session.set_notes(notes))?;
    Ok(())
}

/// Phase, count and smoothed signal for every counter, for the overlay
#[wasm_bindgen]
pub fn get_snapshots() -> Result<JsValue, JsValue> {
    let snapshots = with_session(|session| session.snapshots())?;
    Ok(to_js(&snapshots)?)
}

/// Keypoints worth drawing. A negative `min_score` selects the default.
#[wasm_bindgen]
pub fn get_visible_keypoints(data: &[f32], min_score: f32) -> Result<JsValue, JsValue> {
    let pose = parse_flat(data)?;
    let min_score = if min_score < 0.0 { DEFAULT_DISPLAY_SCORE } else { min_score };
    let visible: Vec<Keypoint> = visible_keypoints(&pose, min_score);
    Ok(to_js(&visible)?)
}

/// Zero one exercise's count. Returns false if the session does not track it.
#[wasm_bindgen]
pub fn reset_exercise(name: &str) -> Result<bool, JsValue> {
    let exercise: Exercise = name.parse().map_err(CounterError::from)?;
    Ok(with_session(|session| session.reset(exercise))?)
}

/// Drop the session. Pending records are discarded.
#[wasm_bindgen]
pub fn end_session() {
    let ended = SESSION.with(|cell| cell.borrow_mut().take());
    if ended.is_some() {
        log::info!("Session ended");
    }
}
