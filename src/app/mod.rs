//! App layer - owns the binder state
//!
//! Key presses and backend results come in; render snapshots and
//! backend commands go out.

pub mod state;
pub mod actor;
pub mod commands;

pub use state::AppState;
pub use actor::AppActor;
