//! Errors surfaced to JavaScript

use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::counter::{ConfigError, UnknownExercise};

/// Errors that can occur while driving a session from JS
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("invalid pose data length: {got} (expected {expected})")]
    InvalidPoseLength { got: usize, expected: usize },

    #[error(transparent)]
    UnknownExercise(#[from] UnknownExercise),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no active session, call start_session first")]
    NoSession,

    #[error("session needs at least one exercise")]
    NoExercises,

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_wasm_bindgen::Error> for CounterError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        CounterError::Serialization(err.to_string())
    }
}

impl From<CounterError> for JsValue {
    fn from(err: CounterError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
