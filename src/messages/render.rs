//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::Notice;
use crate::fortune::FortuneDraw;
use crate::messages::ui_events::{AppTab, Focus};
use crate::models::{Profile, SlotNumber, StagedItem};

/// One cell of the slot grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub slot: SlotNumber,
    pub occupied: bool,
    pub favorite: bool,
    /// A favorite change for this slot is still in flight
    pub pending: bool,
}

/// Card shown in the detail dialog or the delete confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub slot: SlotNumber,
    pub image_url: String,
    pub favorite: bool,
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub profile: Profile,
    pub focus: Focus,
    pub active_tab: AppTab,

    // Grid
    pub cells: Vec<GridCell>,
    pub cursor: usize,
    pub occupied_count: usize,
    pub favorite_count: usize,
    pub is_loading: bool,

    // Upload dialog
    pub show_upload: bool,
    pub upload_path_input: String,
    pub staged: Vec<StagedItem>,
    pub selected_staged: usize,
    pub slot_input: String,
    pub is_committing: bool,
    pub conflicts: Vec<SlotNumber>,

    // Card detail
    pub detail: Option<DetailView>,

    // Fortune overlay
    pub fortune: Option<FortuneDraw>,

    // Status bar
    pub notice: Option<Notice>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            profile: Profile::default(),
            focus: Focus::Grid,
            active_tab: AppTab::All,
            cells: Vec::new(),
            cursor: 0,
            occupied_count: 0,
            favorite_count: 0,
            is_loading: false,
            show_upload: false,
            upload_path_input: String::new(),
            staged: Vec::new(),
            selected_staged: 0,
            slot_input: String::new(),
            is_committing: false,
            conflicts: Vec::new(),
            detail: None,
            fortune: None,
            notice: None,
        }
    }
}
