//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Number of numbered slots in the binder
pub const SLOT_COUNT: u16 = 300;

/// Cards dealt face-down by a fortune draw
pub const FORTUNE_DRAW_SIZE: usize = 3;

/// Grid columns used for both rendering and cursor movement
pub const GRID_COLUMNS: usize = 10;

/// Default row-store table holding one row per occupied slot
pub const DEFAULT_TABLE: &str = "card_collection";

/// Default object-storage bucket for card images
pub const DEFAULT_BUCKET: &str = "cards";

/// Remote call timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Log file written next to the working directory
pub const LOG_FILE: &str = "garistagram.log";

/// Config directory under the user's home
pub const CONFIG_DIR: &str = ".garistagram";

/// Config file inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.yaml";

/// File extensions accepted by the upload dialog
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Application name
pub const APP_NAME: &str = "Garistagram TUI";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
