//! Staged-upload buffer - local images waiting to be archived

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::IMAGE_EXTENSIONS;
use crate::models::{SlotNumber, StagedItem};

/// Pending items edited before a commit
#[derive(Clone, Debug, Default)]
pub struct StagingBuffer {
    items: Vec<StagedItem>,
}

impl StagingBuffer {
    pub fn new() -> Self {
        StagingBuffer { items: Vec::new() }
    }

    /// Append files, numbering them sequentially after the current buffer length
    pub fn add(&mut self, files: impl IntoIterator<Item = PathBuf>) -> usize {
        let before = self.items.len();
        for path in files {
            let slot = SlotNumber::clamped(self.items.len() as i64 + 1);
            let preview = preview_label(&path);
            self.items.push(StagedItem { path, preview, slot });
        }
        self.items.len() - before
    }

    /// Retarget an item from raw user input. Returns the slot that was stored.
    pub fn set_slot(&mut self, index: usize, value: &str) -> Option<SlotNumber> {
        let item = self.items.get_mut(index)?;
        item.slot = SlotNumber::parse_lenient(value);
        Some(item.slot)
    }

    pub fn remove(&mut self, index: usize) -> Option<StagedItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Keep only items matching the predicate
    pub fn retain(&mut self, f: impl FnMut(&StagedItem) -> bool) {
        self.items.retain(f);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[StagedItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&StagedItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn target_slots(&self) -> impl Iterator<Item = SlotNumber> + '_ {
        self.items.iter().map(|item| item.slot)
    }

    /// One item per target slot; a later item wins over an earlier one
    pub fn deduplicated(&self) -> Vec<StagedItem> {
        let mut out: Vec<StagedItem> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if let Some(existing) = out.iter_mut().find(|i| i.slot == item.slot) {
                *existing = item.clone();
            } else {
                out.push(item.clone());
            }
        }
        out
    }
}

/// Whether the path has an accepted image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Resolve a path typed in the upload dialog into image files.
///
/// A file yields itself when it is an image; a directory yields its image
/// files sorted by name (not recursive).
pub fn collect_image_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        files.sort();
        Ok(files)
    } else if path.is_file() {
        if is_image_file(path) {
            Ok(vec![path.to_path_buf()])
        } else {
            Ok(Vec::new())
        }
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        ))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(input: &str) -> String {
    if input.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return input.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    input.to_string()
}

/// Complete a partially typed directory path.
///
/// Returns the completed text, or `None` when nothing better is known.
pub fn autocomplete_path(input: &str) -> Option<String> {
    let expanded = expand_home(input);
    let path = PathBuf::from(&expanded);

    if path.is_dir() && !expanded.ends_with('/') {
        return Some(format!("{}/", expanded));
    }

    let (parent, prefix) = if expanded.ends_with('/') {
        (PathBuf::from(&expanded), String::new())
    } else {
        let parent = path.parent()?;
        let prefix = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        (parent.to_path_buf(), prefix)
    };

    let mut matches: Vec<String> = fs::read_dir(&parent)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.starts_with(&prefix) && !name.starts_with('.'))
        .collect();
    matches.sort();

    match matches.len() {
        0 => None,
        1 => {
            let completed = parent.join(&matches[0]);
            Some(format!("{}/", completed.to_string_lossy()))
        }
        _ => {
            let common = common_prefix(&matches)?;
            if common.len() > prefix.len() {
                Some(parent.join(&common).to_string_lossy().to_string())
            } else {
                None
            }
        }
    }
}

fn preview_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    match fs::metadata(path) {
        Ok(meta) => format!("{} ({} KB)", name, meta.len().div_ceil(1024)),
        Err(_) => name,
    }
}

/// Find common prefix among strings
fn common_prefix(strings: &[String]) -> Option<String> {
    let first = strings.first()?;
    let mut prefix_len = first.len();

    for s in &strings[1..] {
        prefix_len = first
            .char_indices()
            .zip(s.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, a), _)| i + a.len_utf8())
            .unwrap_or(0)
            .min(prefix_len);
    }

    if prefix_len > 0 {
        Some(first[..prefix_len].to_string())
    } else {
        None
    }
}
