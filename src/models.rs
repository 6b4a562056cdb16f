use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::constants::SLOT_COUNT;

/// A slot position in the binder, always within `1..=SLOT_COUNT`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotNumber(u16);

impl SlotNumber {
    pub const MIN: SlotNumber = SlotNumber(1);
    pub const MAX: SlotNumber = SlotNumber(SLOT_COUNT);

    /// Clamp any integer into the valid slot range
    pub fn clamped(value: i64) -> Self {
        SlotNumber(value.clamp(1, SLOT_COUNT as i64) as u16)
    }

    /// Exact conversion, `None` when out of range
    pub fn new(value: i64) -> Option<Self> {
        if (1..=SLOT_COUNT as i64).contains(&value) {
            Some(SlotNumber(value as u16))
        } else {
            None
        }
    }

    /// Parse user input by its leading integer, then clamp.
    ///
    /// `"3.7"` reads as 3 and `"12x"` as 12. Text without a leading number
    /// falls back to slot 1.
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Self::MIN;
        }
        match rest[..digits].parse::<i64>() {
            Ok(n) => Self::clamped(if negative { -n } else { n }),
            // Too long for i64
            Err(_) if negative => Self::MIN,
            Err(_) => Self::MAX,
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Zero-based index into a slot array
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Every slot in ascending order
    pub fn all() -> impl Iterator<Item = SlotNumber> {
        (1..=SLOT_COUNT).map(SlotNumber)
    }
}

impl fmt::Display for SlotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the remote card table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub slot_number: i64,
    pub image_url: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl CardRecord {
    pub fn new(slot: SlotNumber, image_url: impl Into<String>, is_favorite: bool) -> Self {
        CardRecord {
            slot_number: slot.get() as i64,
            image_url: image_url.into(),
            is_favorite,
        }
    }
}

/// Contents of an occupied slot
#[derive(Clone, Debug, PartialEq)]
pub struct SlotEntry {
    pub image_url: String,
    pub favorite: bool,
}

/// A locally selected image waiting to be archived
#[derive(Clone, Debug, PartialEq)]
pub struct StagedItem {
    pub path: PathBuf,
    /// File name and size shown in place of an image preview
    pub preview: String,
    pub slot: SlotNumber,
}

/// One item of an archive batch as handed to the backend
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveItem {
    pub slot: SlotNumber,
    pub path: PathBuf,
    pub is_favorite: bool,
    /// Reference currently stored for the slot, cleaned up after overwrite
    pub previous_url: Option<String>,
}

/// Result of archiving a single item
#[derive(Clone, Debug, PartialEq)]
pub enum ArchiveOutcome {
    Stored {
        slot: SlotNumber,
        path: PathBuf,
        image_url: String,
        is_favorite: bool,
    },
    Failed {
        slot: SlotNumber,
        path: PathBuf,
        message: String,
    },
}

impl ArchiveOutcome {
    pub fn slot(&self) -> SlotNumber {
        match self {
            ArchiveOutcome::Stored { slot, .. } => *slot,
            ArchiveOutcome::Failed { slot, .. } => *slot,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, ArchiveOutcome::Stored { .. })
    }
}

/// A card dealt by the fortune draw
#[derive(Clone, Debug, PartialEq)]
pub struct FortuneCard {
    pub slot: SlotNumber,
    pub image_url: String,
    pub favorite: bool,
}

/// Profile text shown above the grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub handle: String,
    pub display_name: String,
    pub category: String,
    pub bio: String,
    pub link: String,
    pub followers: String,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            handle: String::from("garistagram03"),
            display_name: String::from("Lightning Dragon"),
            category: String::from("Games"),
            bio: String::from("My card binder (^o^)"),
            link: String::new(),
            followers: String::from("168K"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_bounds() {
        assert_eq!(SlotNumber::clamped(0).get(), 1);
        assert_eq!(SlotNumber::clamped(-42).get(), 1);
        assert_eq!(SlotNumber::clamped(301).get(), 300);
        assert_eq!(SlotNumber::clamped(150).get(), 150);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(SlotNumber::parse_lenient("12").get(), 12);
        assert_eq!(SlotNumber::parse_lenient(" 999 ").get(), 300);
        assert_eq!(SlotNumber::parse_lenient("-5").get(), 1);
        assert_eq!(SlotNumber::parse_lenient("abc").get(), 1);
        assert_eq!(SlotNumber::parse_lenient("").get(), 1);
        assert_eq!(SlotNumber::parse_lenient("99999999999999999999999").get(), 300);
        assert_eq!(SlotNumber::parse_lenient("-99999999999999999999999").get(), 1);
    }

    #[test]
    fn test_parse_lenient_reads_leading_integer() {
        assert_eq!(SlotNumber::parse_lenient("3.7").get(), 3);
        assert_eq!(SlotNumber::parse_lenient("12x").get(), 12);
        assert_eq!(SlotNumber::parse_lenient("+8").get(), 8);
        assert_eq!(SlotNumber::parse_lenient("-").get(), 1);
        assert_eq!(SlotNumber::parse_lenient("x12").get(), 1);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(SlotNumber::new(0).is_none());
        assert!(SlotNumber::new(301).is_none());
        assert_eq!(SlotNumber::new(300), Some(SlotNumber::MAX));
    }

    #[test]
    fn test_record_deserializes_without_favorite() {
        let record: CardRecord =
            serde_json::from_str(r#"{"slot_number": 7, "image_url": "https://x/7.png"}"#).unwrap();
        assert_eq!(record.slot_number, 7);
        assert!(!record.is_favorite);
    }
}
