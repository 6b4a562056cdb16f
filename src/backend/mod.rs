//! Backend layer - remote row store and object storage
//!
//! The Backend actor receives commands from the App layer, runs them
//! against a [`CardBackend`] and sends back responses.

pub mod actor;
pub mod client;
pub mod naming;
pub mod ops;

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::models::{CardRecord, SlotNumber};

pub use actor::BackendActor;
pub use client::SupabaseBackend;

/// Remote operations the app relies on
#[async_trait]
pub trait CardBackend: Send + Sync {
    /// Every row of the card table
    async fn fetch_all(&self) -> BackendResult<Vec<CardRecord>>;

    /// Insert or replace the row for `record.slot_number`
    async fn upsert_card(&self, record: &CardRecord) -> BackendResult<()>;

    /// Update only the favorite flag of a slot
    async fn update_favorite(&self, slot: SlotNumber, favorite: bool) -> BackendResult<()>;

    async fn delete_card(&self, slot: SlotNumber) -> BackendResult<()>;

    /// Store bytes under `name`, replacing an object of the same name
    async fn upload_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> BackendResult<()>;

    async fn remove_object(&self, name: &str) -> BackendResult<()>;

    /// Public reference for a stored object
    fn public_url(&self, name: &str) -> String;
}
