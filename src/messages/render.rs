//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::{Editor, Notification};
use crate::messages::ui_events::{AppTab, InputMode};
use crate::models::{Account, Chat, Proxy};

/// An account plus its resolved proxy tag for display
#[derive(Debug, Clone)]
pub struct AccountCard {
    pub account: Account,
    /// e.g. "SOCKS5 Proxy", or "Unknown Proxy" for a dangling reference
    pub proxy_label: Option<String>,
}

/// A chat plus its resolved account name for display
#[derive(Debug, Clone)]
pub struct ChatCard {
    pub chat: Chat,
    /// "Unknown Account" when the reference is missing or dangling
    pub account_name: String,
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Navigation
    pub active_tab: AppTab,
    pub input_mode: InputMode,
    pub cursor_position: usize,

    // Entity lists (already in display order)
    pub accounts: Vec<AccountCard>,
    pub proxies: Vec<Proxy>,
    pub chats: Vec<ChatCard>,
    pub selected_account: usize,
    pub selected_proxy: usize,
    pub selected_chat: usize,

    // Editor popup
    pub editor: Option<Editor>,

    // Test mode
    pub test_active: bool,
    pub test_count: u64,
    pub test_status: String,

    // Popups and transient messages
    pub show_help: bool,
    pub notification: Option<Notification>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            active_tab: AppTab::Accounts,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            accounts: Vec::new(),
            proxies: Vec::new(),
            chats: Vec::new(),
            selected_account: 0,
            selected_proxy: 0,
            selected_chat: 0,
            editor: None,
            test_active: false,
            test_count: 0,
            test_status: String::new(),
            show_help: false,
            notification: None,
        }
    }
}
