//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::state::Editor;
use crate::messages::RenderState;

/// Application tabs, one per entity collection
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum AppTab {
    #[default]
    Accounts,
    Proxies,
    Chats,
}

impl AppTab {
    pub fn next(&self) -> AppTab {
        match self {
            AppTab::Accounts => AppTab::Proxies,
            AppTab::Proxies => AppTab::Chats,
            AppTab::Chats => AppTab::Accounts,
        }
    }

    pub fn prev(&self) -> AppTab {
        match self {
            AppTab::Accounts => AppTab::Chats,
            AppTab::Proxies => AppTab::Accounts,
            AppTab::Chats => AppTab::Proxies,
        }
    }

}

/// Input mode
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Focused field on the account editor
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum AccountField {
    #[default]
    Name,
    ApiId,
    ApiHash,
    PhoneNumber,
    SessionFile,
    Proxy,
}

impl AccountField {
    pub fn next(&self) -> AccountField {
        match self {
            AccountField::Name => AccountField::ApiId,
            AccountField::ApiId => AccountField::ApiHash,
            AccountField::ApiHash => AccountField::PhoneNumber,
            AccountField::PhoneNumber => AccountField::SessionFile,
            AccountField::SessionFile => AccountField::Proxy,
            AccountField::Proxy => AccountField::Name,
        }
    }

    pub fn prev(&self) -> AccountField {
        match self {
            AccountField::Name => AccountField::Proxy,
            AccountField::ApiId => AccountField::Name,
            AccountField::ApiHash => AccountField::ApiId,
            AccountField::PhoneNumber => AccountField::ApiHash,
            AccountField::SessionFile => AccountField::PhoneNumber,
            AccountField::Proxy => AccountField::SessionFile,
        }
    }

    /// True for fields edited as free text (as opposed to the proxy selector)
    pub fn is_text(&self) -> bool {
        !matches!(self, AccountField::Proxy)
    }
}

/// Focused field on the proxy editor
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum ProxyField {
    #[default]
    Name,
    Kind,
    Host,
    Port,
    Username,
    Password,
}

impl ProxyField {
    pub fn next(&self) -> ProxyField {
        match self {
            ProxyField::Name => ProxyField::Kind,
            ProxyField::Kind => ProxyField::Host,
            ProxyField::Host => ProxyField::Port,
            ProxyField::Port => ProxyField::Username,
            ProxyField::Username => ProxyField::Password,
            ProxyField::Password => ProxyField::Name,
        }
    }

    pub fn prev(&self) -> ProxyField {
        match self {
            ProxyField::Name => ProxyField::Password,
            ProxyField::Kind => ProxyField::Name,
            ProxyField::Host => ProxyField::Kind,
            ProxyField::Port => ProxyField::Host,
            ProxyField::Username => ProxyField::Port,
            ProxyField::Password => ProxyField::Username,
        }
    }

    pub fn is_text(&self) -> bool {
        !matches!(self, ProxyField::Kind)
    }
}

/// Focused field on the chat editor
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum ChatField {
    #[default]
    Name,
    ChatId,
    Message,
    SendPhoto,
    PhotoUrl,
    Account,
    TimeInput,
    TestInterval,
}

impl ChatField {
    pub fn next(&self) -> ChatField {
        match self {
            ChatField::Name => ChatField::ChatId,
            ChatField::ChatId => ChatField::Message,
            ChatField::Message => ChatField::SendPhoto,
            ChatField::SendPhoto => ChatField::PhotoUrl,
            ChatField::PhotoUrl => ChatField::Account,
            ChatField::Account => ChatField::TimeInput,
            ChatField::TimeInput => ChatField::TestInterval,
            ChatField::TestInterval => ChatField::Name,
        }
    }

    pub fn prev(&self) -> ChatField {
        match self {
            ChatField::Name => ChatField::TestInterval,
            ChatField::ChatId => ChatField::Name,
            ChatField::Message => ChatField::ChatId,
            ChatField::SendPhoto => ChatField::Message,
            ChatField::PhotoUrl => ChatField::SendPhoto,
            ChatField::Account => ChatField::PhotoUrl,
            ChatField::TimeInput => ChatField::Account,
            ChatField::TestInterval => ChatField::TimeInput,
        }
    }

    pub fn is_text(&self) -> bool {
        !matches!(self, ChatField::SendPhoto | ChatField::Account)
    }
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone)]
pub enum UiEvent {
    // Tab and list navigation
    SwitchTab(AppTab),
    ListUp,
    ListDown,

    // Entity actions
    OpenCreate,
    OpenEdit,
    DeleteSelected,

    // Clipboard config transfer
    ExportConfig,
    ImportConfig,

    // Editor lifecycle
    SaveEditor,
    CancelEditor,

    // Field navigation and editing
    FieldNext,
    FieldPrev,
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    /// Toggle a checkbox field or cycle a selector field
    ToggleField,

    // Posting times on the chat editor
    AddTime,
    RemoveTime,

    // Test mode
    StartTest,
    StopTest,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('c') = key.code {
            return Some(UiEvent::Quit);
        }
    }

    if state.show_help {
        return Some(UiEvent::CloseHelp);
    }

    match &state.editor {
        Some(editor) => handle_editor_keys(key, editor, state.input_mode),
        None => handle_list_keys(key, state.active_tab),
    }
}

/// Handle keys while an editor popup is open
fn handle_editor_keys(key: KeyEvent, editor: &Editor, input_mode: InputMode) -> Option<UiEvent> {
    match input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Esc => Some(UiEvent::CancelEditor),
            KeyCode::Tab | KeyCode::Down => Some(UiEvent::FieldNext),
            KeyCode::BackTab | KeyCode::Up => Some(UiEvent::FieldPrev),
            KeyCode::Char('s') => Some(UiEvent::SaveEditor),
            KeyCode::Char(' ') => Some(UiEvent::ToggleField),
            KeyCode::Char('e') | KeyCode::Enter => {
                if focus_is_text(editor) {
                    Some(UiEvent::StartEditing)
                } else {
                    Some(UiEvent::ToggleField)
                }
            }
            KeyCode::Char('d') if matches!(editor, Editor::Chat(_)) => Some(UiEvent::RemoveTime),
            KeyCode::Char('t') if matches!(editor, Editor::Chat(_)) => Some(UiEvent::StartTest),
            KeyCode::Char('x') if matches!(editor, Editor::Chat(_)) => Some(UiEvent::StopTest),
            _ => None,
        },
        InputMode::Editing => match key.code {
            KeyCode::Esc => Some(UiEvent::StopEditing),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Tab => Some(UiEvent::StopEditing),
            KeyCode::Enter => match editor {
                // Multi-line message body: Enter inserts a newline
                Editor::Chat(form) if form.focus == ChatField::Message => {
                    Some(UiEvent::CharInput('\n'))
                }
                // Enter on the time input commits the entry
                Editor::Chat(form) if form.focus == ChatField::TimeInput => {
                    Some(UiEvent::AddTime)
                }
                _ => Some(UiEvent::StopEditing),
            },
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        },
    }
}

/// Handle keys on the entity list screens
fn handle_list_keys(key: KeyEvent, active_tab: AppTab) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('1') => Some(UiEvent::SwitchTab(AppTab::Accounts)),
        KeyCode::Char('2') => Some(UiEvent::SwitchTab(AppTab::Proxies)),
        KeyCode::Char('3') => Some(UiEvent::SwitchTab(AppTab::Chats)),
        KeyCode::Tab => Some(UiEvent::SwitchTab(active_tab.next())),
        KeyCode::BackTab => Some(UiEvent::SwitchTab(active_tab.prev())),
        KeyCode::Up => Some(UiEvent::ListUp),
        KeyCode::Down => Some(UiEvent::ListDown),
        KeyCode::Char('a') | KeyCode::Char('n') => Some(UiEvent::OpenCreate),
        KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::OpenEdit),
        KeyCode::Char('d') | KeyCode::Delete => Some(UiEvent::DeleteSelected),
        KeyCode::Char('c') => Some(UiEvent::ExportConfig),
        KeyCode::Char('l') => Some(UiEvent::ImportConfig),
        _ => None,
    }
}

/// Whether the focused editor field is edited as free text
fn focus_is_text(editor: &Editor) -> bool {
    match editor {
        Editor::Account(form) => form.focus.is_text(),
        Editor::Proxy(form) => form.focus.is_text(),
        Editor::Chat(form) => form.focus.is_text(),
    }
}
