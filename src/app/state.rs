//! App state - pure data structure with no I/O logic beyond the store

use chrono::{DateTime, Utc};

use crate::constants::{DEFAULT_PHOTO_URL, DEFAULT_TEST_INTERVAL_SECS};
use crate::messages::ui_events::{AccountField, AppTab, ChatField, InputMode, ProxyField};
use crate::messages::{AccountCard, ChatCard, RenderState};
use crate::models::{Account, Chat, PostTime, Proxy, ProxyType};
use crate::store::Store;

/// Severity of a transient user-facing notification
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A transient status message shown at the bottom of the screen
#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub at: DateTime<Utc>,
}

impl Notification {
    /// Notifications fade out after a few seconds
    pub fn is_fresh(&self) -> bool {
        Utc::now().signed_duration_since(self.at) < chrono::Duration::seconds(3)
    }
}

/// Account editor form buffers
#[derive(Clone, Debug, Default)]
pub struct AccountForm {
    pub edit_id: Option<String>,
    pub name: String,
    pub api_id: String,
    pub api_hash: String,
    pub phone_number: String,
    pub session_file: String,
    pub proxy_id: Option<String>,
    pub focus: AccountField,
}

impl AccountForm {
    pub fn from_account(account: &Account) -> Self {
        AccountForm {
            edit_id: Some(account.id.clone()),
            name: account.name.clone(),
            api_id: account.api_id.clone(),
            api_hash: account.api_hash.clone(),
            phone_number: account.phone_number.clone(),
            session_file: account.session_file.clone(),
            proxy_id: account.proxy.clone(),
            focus: AccountField::default(),
        }
    }
}

/// Proxy editor form buffers
#[derive(Clone, Debug, Default)]
pub struct ProxyForm {
    pub edit_id: Option<String>,
    pub name: String,
    pub kind: ProxyType,
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub focus: ProxyField,
}

impl ProxyForm {
    pub fn from_proxy(proxy: &Proxy) -> Self {
        ProxyForm {
            edit_id: Some(proxy.id.clone()),
            name: proxy.name.clone(),
            kind: proxy.kind,
            host: proxy.host.clone(),
            port: proxy.port.clone(),
            username: proxy.username.clone(),
            password: proxy.password.clone(),
            focus: ProxyField::default(),
        }
    }
}

/// Chat editor form buffers, including the test-mode panel
#[derive(Clone, Debug)]
pub struct ChatForm {
    pub edit_id: Option<String>,
    pub name: String,
    pub chat_id: String,
    pub message: String,
    pub send_photo: bool,
    pub photo_url: String,
    pub account_id: Option<String>,
    pub times: Vec<PostTime>,
    /// `HH:MM` buffer for the next time entry
    pub time_input: String,
    pub test_interval: String,
    pub focus: ChatField,
}

impl Default for ChatForm {
    fn default() -> Self {
        ChatForm {
            edit_id: None,
            name: String::new(),
            chat_id: String::new(),
            message: String::new(),
            send_photo: true,
            photo_url: String::from(DEFAULT_PHOTO_URL),
            account_id: None,
            times: vec![PostTime::default()],
            time_input: String::new(),
            test_interval: DEFAULT_TEST_INTERVAL_SECS.to_string(),
            focus: ChatField::default(),
        }
    }
}

impl ChatForm {
    pub fn from_chat(chat: &Chat) -> Self {
        ChatForm {
            edit_id: Some(chat.id.clone()),
            name: chat.name.clone(),
            chat_id: chat.chat_id.clone(),
            message: chat.message.clone(),
            send_photo: chat.send_photo,
            photo_url: chat.photo_url.clone(),
            account_id: chat.account_id.clone(),
            times: chat.times.clone(),
            time_input: String::new(),
            test_interval: DEFAULT_TEST_INTERVAL_SECS.to_string(),
            focus: ChatField::default(),
        }
    }
}

/// The currently open editor popup, if any
#[derive(Clone, Debug)]
pub enum Editor {
    Account(AccountForm),
    Proxy(ProxyForm),
    Chat(ChatForm),
}

impl Editor {
    /// Content of the focused field, empty for non-text fields
    pub fn focused_text(&self) -> &str {
        match self {
            Editor::Account(form) => match form.focus {
                AccountField::Name => &form.name,
                AccountField::ApiId => &form.api_id,
                AccountField::ApiHash => &form.api_hash,
                AccountField::PhoneNumber => &form.phone_number,
                AccountField::SessionFile => &form.session_file,
                AccountField::Proxy => "",
            },
            Editor::Proxy(form) => match form.focus {
                ProxyField::Name => &form.name,
                ProxyField::Host => &form.host,
                ProxyField::Port => &form.port,
                ProxyField::Username => &form.username,
                ProxyField::Password => &form.password,
                ProxyField::Kind => "",
            },
            Editor::Chat(form) => match form.focus {
                ChatField::Name => &form.name,
                ChatField::ChatId => &form.chat_id,
                ChatField::Message => &form.message,
                ChatField::PhotoUrl => &form.photo_url,
                ChatField::TimeInput => &form.time_input,
                ChatField::TestInterval => &form.test_interval,
                ChatField::SendPhoto | ChatField::Account => "",
            },
        }
    }
}

/// Test-mode run state (ephemeral, never persisted)
#[derive(Clone, Debug, Default)]
pub struct TestMode {
    pub active: bool,
    pub count: u64,
    pub status: String,
}

/// Main application state - all mutation happens synchronously in the
/// app actor task
pub struct AppState {
    pub store: Store,

    // Tab navigation
    pub active_tab: AppTab,
    pub selected_account: usize,
    pub selected_proxy: usize,
    pub selected_chat: usize,

    // Editor popup
    pub editor: Option<Editor>,
    pub input_mode: InputMode,
    pub cursor_position: usize,

    // Test mode
    pub test: TestMode,

    // Popups and transient messages
    pub show_help: bool,
    pub notification: Option<Notification>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_store(Store::new())
    }

    pub fn with_store(store: Store) -> Self {
        AppState {
            store,
            active_tab: AppTab::Accounts,
            selected_account: 0,
            selected_proxy: 0,
            selected_chat: 0,
            editor: None,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            test: TestMode::default(),
            show_help: false,
            notification: None,
        }
    }

    /// Get the current input field content
    pub fn current_input(&self) -> &str {
        self.editor.as_ref().map(Editor::focused_text).unwrap_or("")
    }

    /// Get mutable reference to the current input field
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        match self.editor.as_mut()? {
            Editor::Account(form) => match form.focus {
                AccountField::Name => Some(&mut form.name),
                AccountField::ApiId => Some(&mut form.api_id),
                AccountField::ApiHash => Some(&mut form.api_hash),
                AccountField::PhoneNumber => Some(&mut form.phone_number),
                AccountField::SessionFile => Some(&mut form.session_file),
                AccountField::Proxy => None,
            },
            Editor::Proxy(form) => match form.focus {
                ProxyField::Name => Some(&mut form.name),
                ProxyField::Host => Some(&mut form.host),
                ProxyField::Port => Some(&mut form.port),
                ProxyField::Username => Some(&mut form.username),
                ProxyField::Password => Some(&mut form.password),
                ProxyField::Kind => None,
            },
            Editor::Chat(form) => match form.focus {
                ChatField::Name => Some(&mut form.name),
                ChatField::ChatId => Some(&mut form.chat_id),
                ChatField::Message => Some(&mut form.message),
                ChatField::PhotoUrl => Some(&mut form.photo_url),
                ChatField::TimeInput => Some(&mut form.time_input),
                ChatField::TestInterval => Some(&mut form.test_interval),
                ChatField::SendPhoto | ChatField::Account => None,
            },
        }
    }

    /// Convert state to RenderState for the UI
    pub fn to_render_state(&self) -> RenderState {
        let accounts = self
            .store
            .accounts_sorted()
            .into_iter()
            .map(|account| AccountCard {
                proxy_label: account.proxy.as_deref().map(|pid| {
                    self.store
                        .proxy(pid)
                        .map(|p| format!("{} Proxy", p.kind.as_str().to_uppercase()))
                        .unwrap_or_else(|| String::from("Unknown Proxy"))
                }),
                account: account.clone(),
            })
            .collect();

        let chats = self
            .store
            .chats_sorted()
            .into_iter()
            .map(|chat| ChatCard {
                account_name: chat
                    .account_id
                    .as_deref()
                    .and_then(|aid| self.store.account(aid))
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| String::from("Unknown Account")),
                chat: chat.clone(),
            })
            .collect();

        RenderState {
            active_tab: self.active_tab,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            accounts,
            proxies: self.store.proxies_sorted().into_iter().cloned().collect(),
            chats,
            selected_account: self.selected_account,
            selected_proxy: self.selected_proxy,
            selected_chat: self.selected_chat,
            editor: self.editor.clone(),
            test_active: self.test.active,
            test_count: self.test.count,
            test_status: self.test.status.clone(),
            show_help: self.show_help,
            notification: self.notification.clone(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
