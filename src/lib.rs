//! # Garistagram TUI
//!
//! A terminal card binder with 300 numbered slots, backed by a Supabase
//! row store and object storage.
//!
//! ## Features
//! - Browse the binder as a grid, all cards or favorites only
//! - Stage images, pick their slot numbers and archive them in one batch
//! - Confirm before overwriting occupied slots
//! - Optimistic favorite toggle with rollback
//! - Delete cards together with their stored image
//! - Fortune draw: three face-down cards, flip one
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Backend Layer (Tokio runtime)

pub mod archive;
pub mod backend;
pub mod collection;
pub mod config;
pub mod constants;
pub mod error;
pub mod fortune;
pub mod models;
pub mod staging;
pub mod ui;
pub mod messages;
pub mod app;

// Re-export commonly used types
pub use models::{CardRecord, SlotNumber, StagedItem, Profile};
pub use collection::CollectionStore;
pub use staging::StagingBuffer;
pub use archive::ArchiveWorkflow;
pub use fortune::{FortuneDraw, FortuneError};
pub use error::{BackendError, BackendResult};
pub use messages::{UiEvent, BackendCommand, BackendResponse, RenderState};
pub use app::{AppState, AppActor};
pub use backend::{BackendActor, CardBackend, SupabaseBackend};
