//! App state - pure data structure with no I/O logic

use std::collections::HashMap;

use crate::archive::ArchiveWorkflow;
use crate::collection::CollectionStore;
use crate::fortune::FortuneDraw;
use crate::messages::render::{DetailView, GridCell};
use crate::messages::ui_events::{AppTab, Focus, UploadField};
use crate::messages::RenderState;
use crate::models::{Profile, SlotNumber};
use crate::staging::StagingBuffer;

/// Severity of a status bar message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// The latest message shown in the status bar
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Notice {
            level,
            text: text.into(),
            timestamp: chrono::Local::now(),
        }
    }
}

/// A favorite flag applied locally but not yet confirmed remotely
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingFavorite {
    pub request_id: u64,
    /// Value applied locally and sent with the request
    pub requested: bool,
    /// Last value the backend is known to hold
    pub confirmed: bool,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub profile: Profile,

    // Collection and grid
    pub collection: CollectionStore,
    pub active_tab: AppTab,
    pub cursor: usize,
    pub is_loading: bool,
    pub load_request_id: Option<u64>,
    pub next_request_id: u64,

    // Remote mutations in flight
    pub pending_favorites: HashMap<SlotNumber, PendingFavorite>,
    pub pending_deletes: HashMap<SlotNumber, u64>,

    // Upload dialog
    pub staging: StagingBuffer,
    pub archive: ArchiveWorkflow,
    pub show_upload: bool,
    pub upload_field: UploadField,
    pub upload_path_input: String,
    pub slot_input: String,
    pub selected_staged: usize,

    // Card detail and delete confirmation
    pub detail_slot: Option<SlotNumber>,
    pub confirm_delete: Option<SlotNumber>,

    // Fortune overlay
    pub fortune: Option<FortuneDraw>,

    // Popups and status
    pub show_help: bool,
    pub notice: Option<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Profile::default())
    }
}

impl AppState {
    pub fn new(profile: Profile) -> Self {
        AppState {
            profile,
            collection: CollectionStore::new(),
            active_tab: AppTab::All,
            cursor: 0,
            is_loading: false,
            load_request_id: None,
            next_request_id: 1,
            pending_favorites: HashMap::new(),
            pending_deletes: HashMap::new(),
            staging: StagingBuffer::new(),
            archive: ArchiveWorkflow::new(),
            show_upload: false,
            upload_field: UploadField::Path,
            upload_path_input: String::new(),
            slot_input: String::new(),
            selected_staged: 0,
            detail_slot: None,
            confirm_delete: None,
            fortune: None,
            show_help: false,
            notice: None,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice::new(level, text));
    }

    /// Slots of the active tab
    pub fn visible_slots(&self) -> Vec<SlotNumber> {
        self.collection.visible_slots(self.active_tab)
    }

    /// Slot under the grid cursor
    pub fn selected_slot(&self) -> Option<SlotNumber> {
        self.visible_slots().get(self.cursor).copied()
    }

    /// Keep the cursor inside the visible grid after it shrinks
    pub fn clamp_cursor(&mut self) {
        let len = self.visible_slots().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Which layer receives key presses
    pub fn focus(&self) -> Focus {
        if self.show_help {
            Focus::Help
        } else if let Some(draw) = &self.fortune {
            Focus::Fortune {
                revealed: draw.revealed_index().is_some(),
            }
        } else if self.confirm_delete.is_some() {
            Focus::ConfirmDelete
        } else if self.detail_slot.is_some() {
            Focus::Detail
        } else if self.show_upload {
            if self.archive.conflicts().is_some() {
                Focus::ConfirmOverwrite
            } else {
                Focus::Upload(self.upload_field)
            }
        } else {
            Focus::Grid
        }
    }

    fn detail_view(&self, slot: SlotNumber) -> Option<DetailView> {
        self.collection.get(slot).map(|entry| DetailView {
            slot,
            image_url: entry.image_url.clone(),
            favorite: entry.favorite,
        })
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let cells = self
            .visible_slots()
            .into_iter()
            .map(|slot| {
                let entry = self.collection.get(slot);
                GridCell {
                    slot,
                    occupied: entry.is_some(),
                    favorite: entry.map(|e| e.favorite).unwrap_or(false),
                    pending: self.pending_favorites.contains_key(&slot)
                        || self.pending_deletes.contains_key(&slot),
                }
            })
            .collect();

        RenderState {
            profile: self.profile.clone(),
            focus: self.focus(),
            active_tab: self.active_tab,
            cells,
            cursor: self.cursor,
            occupied_count: self.collection.occupied_count(),
            favorite_count: self.collection.favorite_count(),
            is_loading: self.is_loading,
            show_upload: self.show_upload,
            upload_path_input: self.upload_path_input.clone(),
            staged: self.staging.items().to_vec(),
            selected_staged: self.selected_staged,
            slot_input: self.slot_input.clone(),
            is_committing: self.archive.is_committing(),
            conflicts: self.archive.conflicts().map(<[_]>::to_vec).unwrap_or_default(),
            detail: self
                .confirm_delete
                .or(self.detail_slot)
                .and_then(|slot| self.detail_view(slot)),
            fortune: self.fortune.clone(),
            notice: self.notice.clone(),
        }
    }
}
