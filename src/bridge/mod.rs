//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] session entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod error;
mod session;

pub use error::CounterError;

pub use session::{
    // WASM entry points
    end_session,
    get_snapshots,
    get_visible_keypoints,
    push_pose,
    reset_exercise,
    set_session_notes,
    start_session,
    take_rep_records,
    // Internal API
    Session,
    TaggedEvent,
    // Constants
    DEFAULT_DISPLAY_SCORE,
};
