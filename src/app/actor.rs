//! App actor - message loop processing UI events and backend responses

use tokio::sync::mpsc;

use crate::app::state::{AppState, NoticeLevel};
use crate::messages::{BackendCommand, BackendResponse, RenderState, UiEvent};
use crate::models::Profile;

/// App actor that processes UI events and backend responses
pub struct AppActor {
    state: AppState,
    backend_tx: mpsc::UnboundedSender<BackendCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        profile: Profile,
        backend_tx: mpsc::UnboundedSender<BackendCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(profile),
            backend_tx,
            render_tx,
        }
    }

    /// Show a start-up problem (e.g. missing credentials) in the status bar
    pub fn with_startup_error(mut self, message: impl Into<String>) -> Self {
        self.state.notify(NoticeLevel::Error, message);
        self
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut backend_rx: mpsc::UnboundedReceiver<BackendResponse>,
    ) {
        // Initial full fetch
        if let Some(cmd) = self.state.request_load() {
            self.send(cmd);
        }
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.backend_tx.send(BackendCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = backend_rx.recv() => {
                    tracing::debug!(id = response.id(), "Backend response");
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send(&self, cmd: BackendCommand) {
        let _ = self.backend_tx.send(cmd);
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let cmd = match event {
            // Grid
            UiEvent::SwitchTab(tab) => {
                self.state.switch_tab(tab);
                None
            }
            UiEvent::CursorUp => {
                self.state.cursor_up();
                None
            }
            UiEvent::CursorDown => {
                self.state.cursor_down();
                None
            }
            UiEvent::CursorLeft => {
                self.state.cursor_left();
                None
            }
            UiEvent::CursorRight => {
                self.state.cursor_right();
                None
            }
            UiEvent::Reload => self.state.request_load(),

            // Card detail
            UiEvent::OpenDetail => {
                self.state.open_detail();
                None
            }
            UiEvent::CloseDetail => {
                self.state.close_detail();
                None
            }
            UiEvent::ToggleFavorite => self.state.toggle_favorite(),
            UiEvent::RequestDelete => {
                self.state.request_delete();
                None
            }
            UiEvent::ConfirmDelete => self.state.confirm_delete(),
            UiEvent::CancelDelete => {
                self.state.cancel_delete();
                None
            }

            // Upload dialog
            UiEvent::OpenUpload => {
                self.state.open_upload();
                None
            }
            UiEvent::CloseUpload => {
                self.state.close_upload();
                None
            }
            UiEvent::UploadPathChar(c) => {
                self.state.upload_path_char(c);
                None
            }
            UiEvent::UploadPathBackspace => {
                self.state.upload_path_backspace();
                None
            }
            UiEvent::UploadPathAutocomplete => {
                self.state.upload_path_autocomplete();
                None
            }
            UiEvent::AddUploadPath => {
                self.state.add_upload_path();
                None
            }
            UiEvent::NextStaged => {
                self.state.next_staged();
                None
            }
            UiEvent::PrevStaged => {
                self.state.prev_staged();
                None
            }
            UiEvent::RemoveStaged => {
                self.state.remove_staged();
                None
            }
            UiEvent::EditSlot => {
                self.state.edit_slot();
                None
            }
            UiEvent::SlotChar(c) => {
                self.state.slot_char(c);
                None
            }
            UiEvent::SlotBackspace => {
                self.state.slot_backspace();
                None
            }
            UiEvent::ApplySlot => {
                self.state.apply_slot();
                None
            }
            UiEvent::CancelSlotEdit => {
                self.state.cancel_slot_edit();
                None
            }
            UiEvent::Commit => self.state.commit(),
            UiEvent::AcceptOverwrite => self.state.accept_overwrite(),
            UiEvent::CancelOverwrite => {
                self.state.cancel_overwrite();
                None
            }

            // Fortune draw
            UiEvent::StartFortune => {
                self.state.start_fortune();
                None
            }
            UiEvent::FortuneLeft => {
                self.state.fortune_left();
                None
            }
            UiEvent::FortuneRight => {
                self.state.fortune_right();
                None
            }
            UiEvent::FortuneReveal => {
                self.state.fortune_reveal();
                None
            }
            UiEvent::CloseFortune => {
                self.state.close_fortune();
                None
            }

            // Popups
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                None
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                None
            }

            // System
            UiEvent::Quit => return true,
        };

        if let Some(cmd) = cmd {
            self.send(cmd);
        }
        false
    }
}
