//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Grid tabs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AppTab {
    #[default]
    All,
    Favorites,
}

/// Field focused inside the upload dialog
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum UploadField {
    #[default]
    Path,
    Slot,
}

/// What currently receives key presses (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Focus {
    #[default]
    Grid,
    Help,
    Upload(UploadField),
    ConfirmOverwrite,
    Detail,
    ConfirmDelete,
    Fortune { revealed: bool },
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Grid
    SwitchTab(AppTab),
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    Reload,

    // Card detail
    OpenDetail,
    CloseDetail,
    ToggleFavorite,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,

    // Upload dialog
    OpenUpload,
    CloseUpload,
    UploadPathChar(char),
    UploadPathBackspace,
    UploadPathAutocomplete,
    AddUploadPath,
    NextStaged,
    PrevStaged,
    RemoveStaged,
    EditSlot,
    SlotChar(char),
    SlotBackspace,
    ApplySlot,
    CancelSlotEdit,
    Commit,
    AcceptOverwrite,
    CancelOverwrite,

    // Fortune draw
    StartFortune,
    FortuneLeft,
    FortuneRight,
    FortuneReveal,
    CloseFortune,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Convert a key event to a UiEvent based on current UI focus
pub fn key_to_ui_event(key: KeyEvent, focus: Focus) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    match focus {
        Focus::Grid => handle_grid_keys(key),
        Focus::Help => Some(UiEvent::CloseHelp),
        Focus::Upload(field) => handle_upload_keys(key, field, ctrl),
        Focus::ConfirmOverwrite => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(UiEvent::AcceptOverwrite),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::CancelOverwrite),
            _ => None,
        },
        Focus::Detail => match key.code {
            KeyCode::Char('f') => Some(UiEvent::ToggleFavorite),
            KeyCode::Char('d') | KeyCode::Delete => Some(UiEvent::RequestDelete),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(UiEvent::CloseDetail),
            _ => None,
        },
        Focus::ConfirmDelete => match key.code {
            KeyCode::Char('y') => Some(UiEvent::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::CancelDelete),
            _ => None,
        },
        Focus::Fortune { revealed } => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(UiEvent::CloseFortune),
            KeyCode::Enter | KeyCode::Char(' ') if revealed => Some(UiEvent::CloseFortune),
            KeyCode::Enter | KeyCode::Char(' ') => Some(UiEvent::FortuneReveal),
            KeyCode::Left | KeyCode::Char('h') => Some(UiEvent::FortuneLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(UiEvent::FortuneRight),
            _ => None,
        },
    }
}

/// Handle keys on the main grid
fn handle_grid_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('1') => Some(UiEvent::SwitchTab(AppTab::All)),
        KeyCode::Char('2') => Some(UiEvent::SwitchTab(AppTab::Favorites)),
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::CursorUp),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::CursorDown),
        KeyCode::Left | KeyCode::Char('h') => Some(UiEvent::CursorLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(UiEvent::CursorRight),
        KeyCode::Enter => Some(UiEvent::OpenDetail),
        KeyCode::Char('f') => Some(UiEvent::ToggleFavorite),
        KeyCode::Char('u') => Some(UiEvent::OpenUpload),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(UiEvent::StartFortune),
        KeyCode::Char('r') => Some(UiEvent::Reload),
        _ => None,
    }
}

/// Handle keys inside the upload dialog
fn handle_upload_keys(key: KeyEvent, field: UploadField, ctrl: bool) -> Option<UiEvent> {
    if ctrl {
        return match key.code {
            KeyCode::Char('s') => Some(UiEvent::Commit),
            KeyCode::Char('d') => Some(UiEvent::RemoveStaged),
            KeyCode::Char('n') => Some(UiEvent::EditSlot),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up => return Some(UiEvent::PrevStaged),
        KeyCode::Down => return Some(UiEvent::NextStaged),
        _ => {}
    }

    match field {
        UploadField::Path => match key.code {
            KeyCode::Esc => Some(UiEvent::CloseUpload),
            KeyCode::Enter => Some(UiEvent::AddUploadPath),
            KeyCode::Tab => Some(UiEvent::UploadPathAutocomplete),
            KeyCode::Backspace => Some(UiEvent::UploadPathBackspace),
            KeyCode::Char(c) => Some(UiEvent::UploadPathChar(c)),
            _ => None,
        },
        UploadField::Slot => match key.code {
            KeyCode::Esc => Some(UiEvent::CancelSlotEdit),
            KeyCode::Enter => Some(UiEvent::ApplySlot),
            KeyCode::Backspace => Some(UiEvent::SlotBackspace),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => Some(UiEvent::SlotChar(c)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_grid_bindings() {
        assert_eq!(key_to_ui_event(press(KeyCode::Char('2')), Focus::Grid), Some(UiEvent::SwitchTab(AppTab::Favorites)));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('p')), Focus::Grid), Some(UiEvent::StartFortune));
    }

    #[test]
    fn test_upload_typing_goes_to_focused_field() {
        let path = Focus::Upload(UploadField::Path);
        let slot = Focus::Upload(UploadField::Slot);
        assert_eq!(key_to_ui_event(press(KeyCode::Char('q')), path), Some(UiEvent::UploadPathChar('q')));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('7')), slot), Some(UiEvent::SlotChar('7')));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('-')), slot), Some(UiEvent::SlotChar('-')));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('x')), slot), None);
        assert_eq!(key_to_ui_event(press(KeyCode::Char('.')), slot), None);
        let commit = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(key_to_ui_event(commit, path), Some(UiEvent::Commit));
    }

    #[test]
    fn test_fortune_enter_reveals_then_closes() {
        let enter = press(KeyCode::Enter);
        assert_eq!(key_to_ui_event(enter, Focus::Fortune { revealed: false }), Some(UiEvent::FortuneReveal));
        assert_eq!(key_to_ui_event(enter, Focus::Fortune { revealed: true }), Some(UiEvent::CloseFortune));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(key_to_ui_event(key, Focus::Grid), None);
    }
}
