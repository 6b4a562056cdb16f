//! Backend messages - communication between App and Backend layers

use crate::models::{ArchiveItem, ArchiveOutcome, CardRecord, SlotNumber};

/// Commands sent from App layer to Backend layer
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Fetch every row and replace the collection
    LoadCollection { id: u64 },
    /// Upload and upsert a batch of staged images concurrently
    Archive { id: u64, items: Vec<ArchiveItem> },
    /// Delete a slot's row, then its stored image
    DeleteCard {
        id: u64,
        slot: SlotNumber,
        image_url: Option<String>,
    },
    /// Persist a favorite flag already applied locally
    SetFavorite {
        id: u64,
        slot: SlotNumber,
        favorite: bool,
    },
    /// Shutdown the backend actor
    Shutdown,
}

/// Responses sent from Backend layer to App layer
#[derive(Debug, Clone)]
pub enum BackendResponse {
    CollectionLoaded {
        id: u64,
        records: Vec<CardRecord>,
    },
    LoadFailed {
        id: u64,
        message: String,
    },
    /// One outcome per archived item, in submission order
    ArchiveFinished {
        id: u64,
        outcomes: Vec<ArchiveOutcome>,
    },
    CardDeleted {
        id: u64,
        slot: SlotNumber,
    },
    DeleteFailed {
        id: u64,
        slot: SlotNumber,
        message: String,
    },
    FavoriteSaved {
        id: u64,
        slot: SlotNumber,
        favorite: bool,
    },
    FavoriteFailed {
        id: u64,
        slot: SlotNumber,
        message: String,
    },
}

impl BackendResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            BackendResponse::CollectionLoaded { id, .. } => *id,
            BackendResponse::LoadFailed { id, .. } => *id,
            BackendResponse::ArchiveFinished { id, .. } => *id,
            BackendResponse::CardDeleted { id, .. } => *id,
            BackendResponse::DeleteFailed { id, .. } => *id,
            BackendResponse::FavoriteSaved { id, .. } => *id,
            BackendResponse::FavoriteFailed { id, .. } => *id,
        }
    }
}
