//! In-memory collection - the 300 fixed slots and what they hold

use std::collections::HashSet;

use crate::constants::SLOT_COUNT;
use crate::messages::ui_events::AppTab;
use crate::models::{CardRecord, FortuneCard, SlotEntry, SlotNumber};

/// Current image and favorite state of every slot
#[derive(Clone, Debug)]
pub struct CollectionStore {
    slots: Vec<Option<SlotEntry>>,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    pub fn new() -> Self {
        CollectionStore {
            slots: vec![None; SLOT_COUNT as usize],
        }
    }

    /// Replace all state with the rows of a full fetch.
    ///
    /// Rows outside the slot range are skipped. Returns the number of rows kept.
    pub fn load(&mut self, records: Vec<CardRecord>) -> usize {
        let mut slots = vec![None; SLOT_COUNT as usize];
        let mut kept = 0;

        for record in records {
            let Some(slot) = SlotNumber::new(record.slot_number) else {
                tracing::warn!(slot = record.slot_number, "Skipping row outside slot range");
                continue;
            };
            slots[slot.index()] = Some(SlotEntry {
                image_url: record.image_url,
                favorite: record.is_favorite,
            });
            kept += 1;
        }

        self.slots = slots;
        kept
    }

    pub fn upsert_slot(&mut self, slot: SlotNumber, image_url: impl Into<String>, favorite: bool) {
        self.slots[slot.index()] = Some(SlotEntry {
            image_url: image_url.into(),
            favorite,
        });
    }

    /// Empty a slot, returning what it held
    pub fn remove_slot(&mut self, slot: SlotNumber) -> Option<SlotEntry> {
        self.slots[slot.index()].take()
    }

    /// Set the favorite flag of an occupied slot. Returns false for empty slots.
    pub fn set_favorite(&mut self, slot: SlotNumber, favorite: bool) -> bool {
        match self.slots[slot.index()].as_mut() {
            Some(entry) => {
                entry.favorite = favorite;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, slot: SlotNumber) -> Option<&SlotEntry> {
        self.slots[slot.index()].as_ref()
    }

    pub fn is_occupied(&self, slot: SlotNumber) -> bool {
        self.slots[slot.index()].is_some()
    }

    pub fn is_favorite(&self, slot: SlotNumber) -> bool {
        self.get(slot).map(|e| e.favorite).unwrap_or(false)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn favorite_count(&self) -> usize {
        self.occupied().filter(|(_, e)| e.favorite).count()
    }

    /// Occupied slots in ascending order
    pub fn occupied(&self) -> impl Iterator<Item = (SlotNumber, &SlotEntry)> + '_ {
        SlotNumber::all().filter_map(move |slot| self.get(slot).map(|e| (slot, e)))
    }

    /// Occupied slots as fortune draw candidates
    pub fn owned_cards(&self) -> Vec<FortuneCard> {
        self.occupied()
            .map(|(slot, entry)| FortuneCard {
                slot,
                image_url: entry.image_url.clone(),
                favorite: entry.favorite,
            })
            .collect()
    }

    /// Target slots that already hold a card, in input order without repeats
    pub fn conflicts(&self, slots: impl IntoIterator<Item = SlotNumber>) -> Vec<SlotNumber> {
        let mut seen = HashSet::new();
        slots
            .into_iter()
            .filter(|slot| self.is_occupied(*slot) && seen.insert(*slot))
            .collect()
    }

    /// Slots shown by a grid tab
    pub fn visible_slots(&self, tab: AppTab) -> Vec<SlotNumber> {
        match tab {
            AppTab::All => SlotNumber::all().collect(),
            AppTab::Favorites => self
                .occupied()
                .filter(|(_, e)| e.favorite)
                .map(|(slot, _)| slot)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: i64) -> SlotNumber {
        SlotNumber::new(n).unwrap()
    }

    #[test]
    fn test_load_replaces_state_and_skips_invalid_rows() {
        let mut store = CollectionStore::new();
        store.upsert_slot(slot(1), "old", false);

        let kept = store.load(vec![
            CardRecord::new(slot(5), "https://x/5.png", true),
            CardRecord { slot_number: 0, image_url: "bad".into(), is_favorite: false },
            CardRecord { slot_number: 301, image_url: "bad".into(), is_favorite: false },
        ]);

        assert_eq!(kept, 1);
        assert!(!store.is_occupied(slot(1)));
        assert!(store.is_favorite(slot(5)));
        assert_eq!(store.occupied_count(), 1);
    }

    #[test]
    fn test_set_favorite_on_empty_slot_is_noop() {
        let mut store = CollectionStore::new();
        assert!(!store.set_favorite(slot(3), true));
        assert!(!store.is_favorite(slot(3)));
    }

    #[test]
    fn test_conflicts_lists_only_occupied_once() {
        let mut store = CollectionStore::new();
        store.upsert_slot(slot(2), "a", false);
        store.upsert_slot(slot(9), "b", false);

        let conflicts = store.conflicts(vec![slot(9), slot(1), slot(2), slot(9)]);
        assert_eq!(conflicts, vec![slot(9), slot(2)]);
    }

    #[test]
    fn test_remove_drops_slot_from_both_views() {
        let mut store = CollectionStore::new();
        store.upsert_slot(slot(4), "a", true);
        assert_eq!(store.visible_slots(AppTab::Favorites), vec![slot(4)]);

        let removed = store.remove_slot(slot(4));
        assert!(removed.is_some());
        assert!(store.visible_slots(AppTab::Favorites).is_empty());
        assert_eq!(store.visible_slots(AppTab::All).len(), 300);
        assert!(store.get(slot(4)).is_none());
    }
}
