//! Command handlers - business logic for processing UI events

use std::path::PathBuf;

use crate::app::state::{NoticeLevel, PendingFavorite};
use crate::app::AppState;
use crate::archive::CommitStep;
use crate::constants::GRID_COLUMNS;
use crate::fortune::FortuneDraw;
use crate::messages::ui_events::{AppTab, UploadField};
use crate::messages::{BackendCommand, BackendResponse};
use crate::models::{ArchiveOutcome, CardRecord, SlotNumber};
use crate::staging::{autocomplete_path, collect_image_files, expand_home};

impl AppState {
    // ========================
    // Grid navigation
    // ========================

    pub fn switch_tab(&mut self, tab: AppTab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.cursor = 0;
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let len = self.visible_slots().len();
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(GRID_COLUMNS);
    }

    pub fn cursor_down(&mut self) {
        let len = self.visible_slots().len();
        if self.cursor + GRID_COLUMNS < len {
            self.cursor += GRID_COLUMNS;
        }
    }

    // ========================
    // Loading
    // ========================

    pub fn request_load(&mut self) -> Option<BackendCommand> {
        if self.is_loading {
            return None;
        }
        let id = self.next_id();
        self.is_loading = true;
        self.load_request_id = Some(id);
        Some(BackendCommand::LoadCollection { id })
    }

    fn apply_load(&mut self, records: Vec<CardRecord>) {
        let kept = self.collection.load(records);
        // The fetch may predate a favorite request still in flight; keep the
        // optimistic value and let the response settle it
        let collection = &mut self.collection;
        self.pending_favorites.retain(|slot, pending| {
            let Some(fetched) = collection.get(*slot).map(|e| e.favorite) else {
                return false;
            };
            pending.confirmed = fetched;
            collection.set_favorite(*slot, pending.requested);
            true
        });
        self.clamp_cursor();
        if self.detail_slot.is_some_and(|s| !self.collection.is_occupied(s)) {
            self.detail_slot = None;
        }
        self.notify(NoticeLevel::Info, format!("Loaded {} cards", kept));
    }

    // ========================
    // Card detail
    // ========================

    pub fn open_detail(&mut self) {
        if let Some(slot) = self.selected_slot() {
            if self.collection.is_occupied(slot) {
                self.detail_slot = Some(slot);
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.detail_slot = None;
    }

    // ========================
    // Favorites
    // ========================

    /// Flip the favorite flag of the detail card (or the card under the
    /// cursor) locally and ask the backend to persist it
    pub fn toggle_favorite(&mut self) -> Option<BackendCommand> {
        let slot = self.detail_slot.or_else(|| self.selected_slot())?;
        let current = self.collection.get(slot)?.favorite;
        if self.archive.is_committing_slot(slot) {
            self.notify(
                NoticeLevel::Info,
                format!("No.{} is being archived, try again when it finishes", slot),
            );
            return None;
        }
        let favorite = !current;

        let id = self.next_id();
        let confirmed = self
            .pending_favorites
            .get(&slot)
            .map(|p| p.confirmed)
            .unwrap_or(current);
        self.pending_favorites.insert(
            slot,
            PendingFavorite {
                request_id: id,
                requested: favorite,
                confirmed,
            },
        );
        self.collection.set_favorite(slot, favorite);
        self.clamp_cursor();

        Some(BackendCommand::SetFavorite { id, slot, favorite })
    }

    fn favorite_saved(&mut self, id: u64, slot: SlotNumber, favorite: bool) {
        let Some(pending) = self.pending_favorites.get_mut(&slot) else {
            return;
        };
        if pending.request_id == id {
            self.pending_favorites.remove(&slot);
        } else {
            // An older toggle landed; a newer one is still in flight
            pending.confirmed = favorite;
        }
    }

    fn favorite_failed(&mut self, id: u64, slot: SlotNumber, message: String) {
        let Some(pending) = self.pending_favorites.get(&slot).copied() else {
            return;
        };
        if pending.request_id != id {
            return;
        }
        self.pending_favorites.remove(&slot);
        self.collection.set_favorite(slot, pending.confirmed);
        self.clamp_cursor();
        self.notify(
            NoticeLevel::Error,
            format!("Could not update favorite for No.{}: {}", slot, message),
        );
    }

    // ========================
    // Deletion
    // ========================

    pub fn request_delete(&mut self) {
        if let Some(slot) = self.detail_slot {
            if !self.pending_deletes.contains_key(&slot) {
                self.confirm_delete = Some(slot);
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<BackendCommand> {
        let slot = self.confirm_delete.take()?;
        let image_url = self.collection.get(slot).map(|e| e.image_url.clone())?;
        let id = self.next_id();
        self.pending_deletes.insert(slot, id);
        Some(BackendCommand::DeleteCard {
            id,
            slot,
            image_url: Some(image_url),
        })
    }

    fn card_deleted(&mut self, id: u64, slot: SlotNumber) {
        if self.pending_deletes.get(&slot) != Some(&id) {
            return;
        }
        self.pending_deletes.remove(&slot);
        self.pending_favorites.remove(&slot);
        self.collection.remove_slot(slot);
        if self.detail_slot == Some(slot) {
            self.detail_slot = None;
        }
        self.clamp_cursor();
        self.notify(NoticeLevel::Success, format!("No.{} deleted", slot));
    }

    fn delete_failed(&mut self, id: u64, slot: SlotNumber, message: String) {
        if self.pending_deletes.get(&slot) != Some(&id) {
            return;
        }
        self.pending_deletes.remove(&slot);
        self.notify(
            NoticeLevel::Error,
            format!("Could not delete No.{}: {}", slot, message),
        );
    }

    // ========================
    // Upload dialog
    // ========================

    pub fn open_upload(&mut self) {
        self.show_upload = true;
        self.upload_field = UploadField::Path;
    }

    pub fn close_upload(&mut self) {
        self.show_upload = false;
        self.upload_field = UploadField::Path;
        self.slot_input.clear();
    }

    pub fn upload_path_char(&mut self, c: char) {
        self.upload_path_input.push(c);
    }

    pub fn upload_path_backspace(&mut self) {
        self.upload_path_input.pop();
    }

    pub fn upload_path_autocomplete(&mut self) {
        if let Some(completed) = autocomplete_path(&self.upload_path_input) {
            self.upload_path_input = completed;
        }
    }

    /// Stage every image found at the typed path
    pub fn add_upload_path(&mut self) {
        if self.archive.is_committing() || self.upload_path_input.trim().is_empty() {
            return;
        }
        let path = PathBuf::from(expand_home(self.upload_path_input.trim()));

        match collect_image_files(&path) {
            Ok(files) if files.is_empty() => {
                self.notify(NoticeLevel::Error, format!("No images found at {}", path.display()));
            }
            Ok(files) => {
                let added = self.staging.add(files);
                self.archive.sync_with(&self.staging);
                self.selected_staged = self.staging.len() - added;
                self.upload_path_input.clear();
                self.notify(NoticeLevel::Info, format!("Staged {} images", added));
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Cannot read {}: {}", path.display(), e));
            }
        }
    }

    pub fn next_staged(&mut self) {
        if self.upload_field == UploadField::Slot {
            return;
        }
        if self.selected_staged + 1 < self.staging.len() {
            self.selected_staged += 1;
        }
    }

    pub fn prev_staged(&mut self) {
        if self.upload_field == UploadField::Slot {
            return;
        }
        self.selected_staged = self.selected_staged.saturating_sub(1);
    }

    pub fn remove_staged(&mut self) {
        if self.archive.is_committing() {
            return;
        }
        if self.staging.remove(self.selected_staged).is_some() {
            self.archive.sync_with(&self.staging);
            self.selected_staged = self
                .selected_staged
                .min(self.staging.len().saturating_sub(1));
            self.upload_field = UploadField::Path;
        }
    }

    pub fn edit_slot(&mut self) {
        if self.archive.is_committing() {
            return;
        }
        if let Some(item) = self.staging.get(self.selected_staged) {
            self.slot_input = item.slot.to_string();
            self.upload_field = UploadField::Slot;
        }
    }

    pub fn slot_char(&mut self, c: char) {
        self.slot_input.push(c);
    }

    pub fn slot_backspace(&mut self) {
        self.slot_input.pop();
    }

    pub fn apply_slot(&mut self) {
        if let Some(slot) = self.staging.set_slot(self.selected_staged, &self.slot_input) {
            tracing::debug!(index = self.selected_staged, %slot, "Retargeted staged image");
        }
        self.cancel_slot_edit();
    }

    pub fn cancel_slot_edit(&mut self) {
        self.slot_input.clear();
        self.upload_field = UploadField::Path;
    }

    /// Commit the buffer: dispatch directly or stop for overwrite confirmation
    pub fn commit(&mut self) -> Option<BackendCommand> {
        if self.upload_field == UploadField::Slot {
            self.apply_slot();
        }
        if self.favorite_in_flight_for_batch() {
            return None;
        }
        let id = self.next_id();
        let step = self.archive.commit(id, &self.staging, &self.collection);
        self.commit_step(id, step)
    }

    pub fn accept_overwrite(&mut self) -> Option<BackendCommand> {
        if self.favorite_in_flight_for_batch() {
            return None;
        }
        let id = self.next_id();
        let step = self.archive.accept(id, &self.staging, &self.collection);
        self.commit_step(id, step)
    }

    /// A batch copies each slot's favorite flag, so it waits for unsaved toggles
    fn favorite_in_flight_for_batch(&mut self) -> bool {
        let busy = self
            .staging
            .target_slots()
            .find(|slot| self.pending_favorites.contains_key(slot));
        if let Some(slot) = busy {
            self.notify(
                NoticeLevel::Info,
                format!("Favorite for No.{} is still saving, try again in a moment", slot),
            );
        }
        busy.is_some()
    }

    pub fn cancel_overwrite(&mut self) {
        self.archive.cancel(&self.staging);
    }

    fn commit_step(&mut self, id: u64, step: CommitStep) -> Option<BackendCommand> {
        match step {
            CommitStep::Inert => None,
            CommitStep::Confirm(conflicts) => {
                tracing::info!(count = conflicts.len(), "Commit waits for overwrite confirmation");
                None
            }
            CommitStep::Dispatch(items) => {
                self.notify(NoticeLevel::Info, format!("Archiving {} cards...", items.len()));
                Some(BackendCommand::Archive { id, items })
            }
        }
    }

    fn archive_finished(&mut self, id: u64, outcomes: Vec<ArchiveOutcome>) {
        let total = outcomes.len();
        let Some(report) = self
            .archive
            .complete(id, outcomes, &mut self.staging, &mut self.collection)
        else {
            return;
        };
        self.selected_staged = self
            .selected_staged
            .min(self.staging.len().saturating_sub(1));

        if report.is_complete() {
            self.notify(NoticeLevel::Success, format!("Archived {} cards!", report.stored));
        } else {
            let failed: Vec<String> = report
                .failed
                .iter()
                .map(|(slot, msg)| format!("No.{} ({})", slot, msg))
                .collect();
            self.notify(
                NoticeLevel::Error,
                format!(
                    "Archived {} of {} cards. Failed: {}",
                    report.stored,
                    total,
                    failed.join(", ")
                ),
            );
        }
    }

    // ========================
    // Fortune draw
    // ========================

    pub fn start_fortune(&mut self) {
        match FortuneDraw::deal(self.collection.owned_cards(), &mut rand::thread_rng()) {
            Ok(draw) => self.fortune = Some(draw),
            Err(e) => self.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    pub fn fortune_left(&mut self) {
        if let Some(draw) = self.fortune.as_mut() {
            draw.move_left();
        }
    }

    pub fn fortune_right(&mut self) {
        if let Some(draw) = self.fortune.as_mut() {
            draw.move_right();
        }
    }

    pub fn fortune_reveal(&mut self) {
        if let Some(draw) = self.fortune.as_mut() {
            draw.reveal();
        }
    }

    pub fn close_fortune(&mut self) {
        self.fortune = None;
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: BackendResponse) {
        match response {
            BackendResponse::CollectionLoaded { id, records } => {
                if self.load_request_id == Some(id) {
                    self.is_loading = false;
                    self.load_request_id = None;
                    self.apply_load(records);
                }
            }
            BackendResponse::LoadFailed { id, message } => {
                if self.load_request_id == Some(id) {
                    self.is_loading = false;
                    self.load_request_id = None;
                    self.notify(
                        NoticeLevel::Error,
                        format!("Could not load collection: {} (press r to retry)", message),
                    );
                }
            }
            BackendResponse::ArchiveFinished { id, outcomes } => self.archive_finished(id, outcomes),
            BackendResponse::CardDeleted { id, slot } => self.card_deleted(id, slot),
            BackendResponse::DeleteFailed { id, slot, message } => self.delete_failed(id, slot, message),
            BackendResponse::FavoriteSaved { id, slot, favorite } => self.favorite_saved(id, slot, favorite),
            BackendResponse::FavoriteFailed { id, slot, message } => self.favorite_failed(id, slot, message),
        }
    }
}
