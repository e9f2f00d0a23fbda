//! App actor - message loop processing UI events and sender events

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{RenderState, SenderCommand, SenderEvent, UiEvent};

/// App actor that processes UI events and sender events
pub struct AppActor {
    state: AppState,
    sender_tx: mpsc::UnboundedSender<SenderCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        sender_tx: mpsc::UnboundedSender<SenderCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            sender_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut sender_rx: mpsc::UnboundedReceiver<SenderEvent>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.sender_tx.send(SenderCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(event) = sender_rx.recv() => {
                    self.state.handle_sender_event(event);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send(&self, command: Option<SenderCommand>) {
        if let Some(command) = command {
            let _ = self.sender_tx.send(command);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Tab and list navigation
            UiEvent::SwitchTab(tab) => self.state.switch_tab(tab),
            UiEvent::ListUp => self.state.list_up(),
            UiEvent::ListDown => self.state.list_down(),

            // Editor lifecycle
            UiEvent::OpenCreate => self.state.open_create(),
            UiEvent::OpenEdit => self.state.open_edit(),
            UiEvent::DeleteSelected => self.state.delete_selected(),
            UiEvent::SaveEditor => {
                let command = self.state.save_editor();
                self.send(command);
            }
            UiEvent::CancelEditor => {
                let command = self.state.cancel_editor();
                self.send(command);
            }

            // Field navigation and editing
            UiEvent::FieldNext => self.state.field_next(),
            UiEvent::FieldPrev => self.state.field_prev(),
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::ToggleField => self.state.toggle_field(),

            // Posting times
            UiEvent::AddTime => self.state.add_time(),
            UiEvent::RemoveTime => self.state.remove_time(),

            // Test mode
            UiEvent::StartTest => {
                let command = self.state.start_test();
                self.send(command);
            }
            UiEvent::StopTest => {
                let command = self.state.stop_test();
                self.send(command);
            }

            // Clipboard config transfer
            UiEvent::ExportConfig => self.state.export_config(),
            UiEvent::ImportConfig => self.state.import_config(),

            // Popups
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
