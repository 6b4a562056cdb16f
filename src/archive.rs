//! Archive workflow - conflict check, confirmation and commit bookkeeping
//!
//! ```text
//! Idle -> Staged -> (ConfirmPending | Committing) -> Idle
//! ```
//!
//! The conflict check runs synchronously inside [`ArchiveWorkflow::commit`].

use crate::collection::CollectionStore;
use crate::models::{ArchiveItem, ArchiveOutcome, SlotNumber, StagedItem};
use crate::staging::StagingBuffer;

#[derive(Clone, Debug, PartialEq)]
pub enum ArchivePhase {
    Idle,
    Staged,
    /// Some target slots already hold a card
    ConfirmPending { conflicts: Vec<SlotNumber> },
    /// Batch handed to the backend under this request id
    Committing { id: u64, items: Vec<StagedItem> },
}

/// What the caller must do after a commit step
#[derive(Clone, Debug, PartialEq)]
pub enum CommitStep {
    /// Nothing to commit, or a commit is already running
    Inert,
    /// Ask the user before overwriting these slots
    Confirm(Vec<SlotNumber>),
    /// Send this batch to the backend
    Dispatch(Vec<ArchiveItem>),
}

/// Summary of a finished batch
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveReport {
    pub stored: usize,
    pub failed: Vec<(SlotNumber, String)>,
}

impl ArchiveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ArchiveWorkflow {
    phase: ArchivePhase,
}

impl Default for ArchiveWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWorkflow {
    pub fn new() -> Self {
        ArchiveWorkflow { phase: ArchivePhase::Idle }
    }

    pub fn phase(&self) -> &ArchivePhase {
        &self.phase
    }

    pub fn is_committing(&self) -> bool {
        matches!(self.phase, ArchivePhase::Committing { .. })
    }

    /// Whether a batch in flight writes to `slot`
    pub fn is_committing_slot(&self, slot: SlotNumber) -> bool {
        match &self.phase {
            ArchivePhase::Committing { items, .. } => items.iter().any(|item| item.slot == slot),
            _ => false,
        }
    }

    pub fn conflicts(&self) -> Option<&[SlotNumber]> {
        match &self.phase {
            ArchivePhase::ConfirmPending { conflicts } => Some(conflicts),
            _ => None,
        }
    }

    /// Re-derive Idle/Staged after the buffer was edited
    pub fn sync_with(&mut self, buffer: &StagingBuffer) {
        match self.phase {
            ArchivePhase::Idle | ArchivePhase::Staged => {
                self.phase = if buffer.is_empty() {
                    ArchivePhase::Idle
                } else {
                    ArchivePhase::Staged
                };
            }
            _ => {}
        }
    }

    /// Start a commit: check for conflicts and either ask or dispatch
    pub fn commit(
        &mut self,
        id: u64,
        buffer: &StagingBuffer,
        collection: &CollectionStore,
    ) -> CommitStep {
        if buffer.is_empty() || !matches!(self.phase, ArchivePhase::Idle | ArchivePhase::Staged) {
            return CommitStep::Inert;
        }

        let conflicts = collection.conflicts(buffer.target_slots());
        if conflicts.is_empty() {
            self.dispatch(id, buffer, collection)
        } else {
            self.phase = ArchivePhase::ConfirmPending {
                conflicts: conflicts.clone(),
            };
            CommitStep::Confirm(conflicts)
        }
    }

    /// The user agreed to overwrite the conflicting slots
    pub fn accept(
        &mut self,
        id: u64,
        buffer: &StagingBuffer,
        collection: &CollectionStore,
    ) -> CommitStep {
        if !matches!(self.phase, ArchivePhase::ConfirmPending { .. }) {
            return CommitStep::Inert;
        }
        self.dispatch(id, buffer, collection)
    }

    /// The user backed out of the overwrite; the buffer stays as it was
    pub fn cancel(&mut self, buffer: &StagingBuffer) {
        if matches!(self.phase, ArchivePhase::ConfirmPending { .. }) {
            self.phase = ArchivePhase::Staged;
            self.sync_with(buffer);
        }
    }

    fn dispatch(
        &mut self,
        id: u64,
        buffer: &StagingBuffer,
        collection: &CollectionStore,
    ) -> CommitStep {
        let items = buffer.deduplicated();
        let batch = items
            .iter()
            .map(|item| ArchiveItem {
                slot: item.slot,
                path: item.path.clone(),
                is_favorite: collection.is_favorite(item.slot),
                previous_url: collection.get(item.slot).map(|e| e.image_url.clone()),
            })
            .collect();
        self.phase = ArchivePhase::Committing { id, items };
        CommitStep::Dispatch(batch)
    }

    /// Apply a finished batch. Stored items land in the collection and leave
    /// the buffer; failed ones stay staged for another try.
    ///
    /// Returns `None` when `id` is not the batch in flight.
    pub fn complete(
        &mut self,
        id: u64,
        outcomes: Vec<ArchiveOutcome>,
        buffer: &mut StagingBuffer,
        collection: &mut CollectionStore,
    ) -> Option<ArchiveReport> {
        let ArchivePhase::Committing { id: pending, items } = &self.phase else {
            return None;
        };
        if *pending != id {
            return None;
        }
        let committed_items = items.clone();

        let mut report = ArchiveReport {
            stored: 0,
            failed: Vec::new(),
        };

        for outcome in outcomes {
            match outcome {
                ArchiveOutcome::Stored {
                    slot,
                    image_url,
                    is_favorite,
                    ..
                } => {
                    collection.upsert_slot(slot, image_url, is_favorite);
                    report.stored += 1;
                }
                ArchiveOutcome::Failed { slot, message, .. } => {
                    report.failed.push((slot, message));
                }
            }
        }

        // Items merged away by dedup or stored successfully leave the buffer
        let failed_slots: Vec<SlotNumber> = report.failed.iter().map(|(s, _)| *s).collect();
        buffer.retain(|item| {
            failed_slots.contains(&item.slot)
                && committed_items
                    .iter()
                    .any(|c| c.slot == item.slot && c.path == item.path)
        });

        self.phase = ArchivePhase::Idle;
        self.sync_with(buffer);
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn slot(n: i64) -> SlotNumber {
        SlotNumber::new(n).unwrap()
    }

    fn staged(names: &[&str]) -> StagingBuffer {
        let mut buffer = StagingBuffer::new();
        buffer.add(names.iter().map(PathBuf::from));
        buffer
    }

    fn stored(item: &ArchiveItem) -> ArchiveOutcome {
        ArchiveOutcome::Stored {
            slot: item.slot,
            path: item.path.clone(),
            image_url: format!("https://x/{}.png", item.slot),
            is_favorite: item.is_favorite,
        }
    }

    #[test]
    fn test_empty_buffer_is_inert() {
        let mut flow = ArchiveWorkflow::new();
        let step = flow.commit(1, &StagingBuffer::new(), &CollectionStore::new());
        assert_eq!(step, CommitStep::Inert);
        assert_eq!(flow.phase(), &ArchivePhase::Idle);
    }

    #[test]
    fn test_no_conflicts_dispatches_directly() {
        let mut flow = ArchiveWorkflow::new();
        let buffer = staged(&["a.png", "b.png"]);
        flow.sync_with(&buffer);
        assert_eq!(flow.phase(), &ArchivePhase::Staged);

        let step = flow.commit(1, &buffer, &CollectionStore::new());
        match step {
            CommitStep::Dispatch(items) => assert_eq!(items.len(), 2),
            other => panic!("expected dispatch, got {other:?}"),
        }
        assert!(flow.is_committing());
        assert!(flow.is_committing_slot(slot(2)));
        assert!(!flow.is_committing_slot(slot(3)));
    }

    #[test]
    fn test_conflicts_wait_for_accept() {
        let mut collection = CollectionStore::new();
        collection.upsert_slot(slot(2), "old", true);
        let buffer = staged(&["a.png", "b.png"]);

        let mut flow = ArchiveWorkflow::new();
        assert_eq!(flow.commit(1, &buffer, &collection), CommitStep::Confirm(vec![slot(2)]));
        assert_eq!(flow.conflicts(), Some(&[slot(2)][..]));

        // A second commit while confirming does nothing
        assert_eq!(flow.commit(2, &buffer, &collection), CommitStep::Inert);

        let CommitStep::Dispatch(items) = flow.accept(3, &buffer, &collection) else {
            panic!("expected dispatch");
        };
        let overwrite = items.iter().find(|i| i.slot == slot(2)).unwrap();
        assert!(overwrite.is_favorite);
        assert_eq!(overwrite.previous_url.as_deref(), Some("old"));
    }

    #[test]
    fn test_cancel_keeps_buffer() {
        let mut collection = CollectionStore::new();
        collection.upsert_slot(slot(1), "old", false);
        let buffer = staged(&["a.png"]);

        let mut flow = ArchiveWorkflow::new();
        flow.commit(1, &buffer, &collection);
        flow.cancel(&buffer);
        assert_eq!(flow.phase(), &ArchivePhase::Staged);
        assert_eq!(buffer.len(), 1);
        assert_eq!(flow.accept(2, &buffer, &collection), CommitStep::Inert);
    }

    #[test]
    fn test_complete_success_clears_buffer() {
        let mut collection = CollectionStore::new();
        let mut buffer = staged(&["a.png", "b.png", "c.png"]);
        let mut flow = ArchiveWorkflow::new();

        let CommitStep::Dispatch(items) = flow.commit(9, &buffer, &collection) else {
            panic!("expected dispatch");
        };
        let outcomes = items.iter().map(stored).collect();

        assert!(flow.complete(8, Vec::new(), &mut buffer, &mut collection).is_none());
        let report = flow.complete(9, outcomes, &mut buffer, &mut collection).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.stored, 3);
        assert!(buffer.is_empty());
        assert_eq!(collection.occupied_count(), 3);
        assert_eq!(flow.phase(), &ArchivePhase::Idle);
    }

    #[test]
    fn test_partial_failure_keeps_failed_items() {
        let mut collection = CollectionStore::new();
        let mut buffer = staged(&["a.png", "b.png"]);
        let mut flow = ArchiveWorkflow::new();

        let CommitStep::Dispatch(items) = flow.commit(1, &buffer, &collection) else {
            panic!("expected dispatch");
        };
        let outcomes = vec![
            stored(&items[0]),
            ArchiveOutcome::Failed {
                slot: items[1].slot,
                path: items[1].path.clone(),
                message: "upload failed".into(),
            },
        ];

        let report = flow.complete(1, outcomes, &mut buffer, &mut collection).unwrap();
        assert_eq!(report.stored, 1);
        assert_eq!(report.failed, vec![(slot(2), "upload failed".to_string())]);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.items()[0].path, PathBuf::from("b.png"));
        assert!(collection.is_occupied(slot(1)));
        assert!(!collection.is_occupied(slot(2)));
        assert_eq!(flow.phase(), &ArchivePhase::Staged);
    }
}
