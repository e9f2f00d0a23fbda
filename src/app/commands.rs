//! Command handlers - business logic for processing UI events

use std::time::Duration;

use crate::app::state::{
    AccountForm, ChatForm, Editor, Notification, NotificationKind, ProxyForm,
};
use crate::app::AppState;
use crate::chat_id::normalize_chat_id;
use crate::clipboard;
use crate::constants::DEFAULT_TEST_INTERVAL_SECS;
use crate::messages::ui_events::{AppTab, ChatField, InputMode};
use crate::messages::{SenderCommand, SenderEvent};
use crate::models::{default_session_file, Account, Chat, PostTime, Proxy};

impl AppState {
    // ========================
    // Notifications
    // ========================

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            at: chrono::Utc::now(),
        });
    }

    // ========================
    // Tab and list navigation
    // ========================

    pub fn switch_tab(&mut self, tab: AppTab) {
        self.active_tab = tab;
    }

    fn active_list_len(&self) -> usize {
        match self.active_tab {
            AppTab::Accounts => self.store.accounts.len(),
            AppTab::Proxies => self.store.proxies.len(),
            AppTab::Chats => self.store.chats.len(),
        }
    }

    fn active_selection_mut(&mut self) -> &mut usize {
        match self.active_tab {
            AppTab::Accounts => &mut self.selected_account,
            AppTab::Proxies => &mut self.selected_proxy,
            AppTab::Chats => &mut self.selected_chat,
        }
    }

    pub fn list_up(&mut self) {
        let selection = self.active_selection_mut();
        *selection = selection.saturating_sub(1);
    }

    pub fn list_down(&mut self) {
        let len = self.active_list_len();
        let selection = self.active_selection_mut();
        if len > 0 && *selection < len - 1 {
            *selection += 1;
        }
    }

    // ========================
    // Editor lifecycle
    // ========================

    /// Open a blank editor for the active tab
    pub fn open_create(&mut self) {
        self.editor = Some(match self.active_tab {
            AppTab::Accounts => Editor::Account(AccountForm::default()),
            AppTab::Proxies => Editor::Proxy(ProxyForm::default()),
            AppTab::Chats => Editor::Chat(ChatForm::default()),
        });
        self.input_mode = InputMode::Normal;
        self.cursor_position = 0;
    }

    /// Open the editor populated from the selected entity
    pub fn open_edit(&mut self) {
        let editor = match self.active_tab {
            AppTab::Accounts => self
                .store
                .accounts_sorted()
                .get(self.selected_account)
                .map(|a| Editor::Account(AccountForm::from_account(a))),
            AppTab::Proxies => self
                .store
                .proxies_sorted()
                .get(self.selected_proxy)
                .map(|p| Editor::Proxy(ProxyForm::from_proxy(p))),
            AppTab::Chats => self
                .store
                .chats_sorted()
                .get(self.selected_chat)
                .map(|c| Editor::Chat(ChatForm::from_chat(c))),
        };

        if editor.is_some() {
            self.editor = editor;
            self.input_mode = InputMode::Normal;
            self.cursor_position = 0;
        }
    }

    /// Close the editor without saving; stops any active test run
    pub fn cancel_editor(&mut self) -> Option<SenderCommand> {
        self.editor = None;
        self.input_mode = InputMode::Normal;
        self.stop_test()
    }

    /// Validate and save the open editor into the store
    pub fn save_editor(&mut self) -> Option<SenderCommand> {
        match self.editor.clone() {
            Some(Editor::Account(form)) => {
                self.save_account(form);
                None
            }
            Some(Editor::Proxy(form)) => {
                self.save_proxy(form);
                None
            }
            Some(Editor::Chat(form)) => self.save_chat(form),
            None => None,
        }
    }

    fn save_account(&mut self, form: AccountForm) {
        let name = form.name.trim();
        if name.is_empty()
            || form.api_id.trim().is_empty()
            || form.api_hash.trim().is_empty()
            || form.phone_number.trim().is_empty()
        {
            self.notify(
                NotificationKind::Error,
                "Please fill in all required fields",
            );
            return;
        }

        let session_file = if form.session_file.trim().is_empty() {
            default_session_file(name)
        } else {
            form.session_file.trim().to_string()
        };

        let account = Account {
            id: form.edit_id.unwrap_or_default(),
            name: name.to_string(),
            api_id: form.api_id.trim().to_string(),
            api_hash: form.api_hash.trim().to_string(),
            phone_number: form.phone_number.trim().to_string(),
            session_file,
            proxy: form.proxy_id,
        };
        self.store.upsert_account(account);

        self.editor = None;
        self.input_mode = InputMode::Normal;
        self.notify(NotificationKind::Success, "Account saved successfully!");
    }

    fn save_proxy(&mut self, form: ProxyForm) {
        if form.name.trim().is_empty()
            || form.host.trim().is_empty()
            || form.port.trim().is_empty()
        {
            self.notify(
                NotificationKind::Error,
                "Please fill in all required fields",
            );
            return;
        }

        let proxy = Proxy {
            id: form.edit_id.unwrap_or_default(),
            name: form.name.trim().to_string(),
            kind: form.kind,
            host: form.host.trim().to_string(),
            port: form.port.trim().to_string(),
            username: form.username.trim().to_string(),
            password: form.password.trim().to_string(),
        };
        self.store.upsert_proxy(proxy);

        self.editor = None;
        self.input_mode = InputMode::Normal;
        self.notify(NotificationKind::Success, "Proxy saved successfully!");
    }

    fn save_chat(&mut self, form: ChatForm) -> Option<SenderCommand> {
        if form.name.trim().is_empty()
            || form.chat_id.trim().is_empty()
            || form.message.trim().is_empty()
            || form.account_id.is_none()
        {
            self.notify(
                NotificationKind::Error,
                "Please fill in all required fields",
            );
            return None;
        }

        if form.times.is_empty() {
            self.notify(
                NotificationKind::Error,
                "Please add at least one posting time",
            );
            return None;
        }

        let chat = Chat {
            id: form.edit_id.unwrap_or_default(),
            name: form.name.trim().to_string(),
            chat_id: normalize_chat_id(form.chat_id.trim()),
            message: form.message.trim().to_string(),
            send_photo: form.send_photo,
            photo_url: if form.send_photo {
                form.photo_url.trim().to_string()
            } else {
                String::new()
            },
            account_id: form.account_id,
            times: form.times,
        };
        self.store.upsert_chat(chat);

        self.editor = None;
        self.input_mode = InputMode::Normal;
        self.notify(NotificationKind::Success, "Chat saved successfully!");
        self.stop_test()
    }

    /// Delete the selected entity on the active tab
    pub fn delete_selected(&mut self) {
        match self.active_tab {
            AppTab::Accounts => {
                let id = self
                    .store
                    .accounts_sorted()
                    .get(self.selected_account)
                    .map(|a| a.id.clone());
                if let Some(id) = id {
                    self.store.delete_account(&id);
                    self.notify(NotificationKind::Success, "Account deleted successfully!");
                }
            }
            AppTab::Proxies => {
                let id = self
                    .store
                    .proxies_sorted()
                    .get(self.selected_proxy)
                    .map(|p| p.id.clone());
                if let Some(id) = id {
                    self.store.delete_proxy(&id);
                    self.notify(NotificationKind::Success, "Proxy deleted successfully!");
                }
            }
            AppTab::Chats => {
                let id = self
                    .store
                    .chats_sorted()
                    .get(self.selected_chat)
                    .map(|c| c.id.clone());
                if let Some(id) = id {
                    self.store.delete_chat(&id);
                    self.notify(NotificationKind::Success, "Chat deleted successfully!");
                }
            }
        }

        // Keep the selection inside the shrunk list
        let len = self.active_list_len();
        let selection = self.active_selection_mut();
        if *selection >= len {
            *selection = len.saturating_sub(1);
        }
    }

    // ========================
    // Field navigation and editing
    // ========================

    pub fn field_next(&mut self) {
        match self.editor.as_mut() {
            Some(Editor::Account(form)) => form.focus = form.focus.next(),
            Some(Editor::Proxy(form)) => form.focus = form.focus.next(),
            Some(Editor::Chat(form)) => form.focus = form.focus.next(),
            None => {}
        }
    }

    pub fn field_prev(&mut self) {
        match self.editor.as_mut() {
            Some(Editor::Account(form)) => form.focus = form.focus.prev(),
            Some(Editor::Proxy(form)) => form.focus = form.focus.prev(),
            Some(Editor::Chat(form)) => form.focus = form.focus.prev(),
            None => {}
        }
    }

    pub fn start_editing(&mut self) {
        if self.editor.is_some() {
            self.input_mode = InputMode::Editing;
            self.cursor_position = self.current_input().len();
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            if cursor_pos <= input.len() {
                input.insert(cursor_pos, c);
                self.cursor_position = cursor_pos + c.len_utf8();
            }
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    pub fn move_cursor_left(&mut self) {
        let input = self.current_input();
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let input = self.current_input();
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    /// Toggle a checkbox field or cycle a selector field
    pub fn toggle_field(&mut self) {
        let proxy_ids: Vec<String> = self.store.proxies_sorted().iter().map(|p| p.id.clone()).collect();
        let account_ids: Vec<String> = self.store.accounts_sorted().iter().map(|a| a.id.clone()).collect();

        match self.editor.as_mut() {
            Some(Editor::Account(form)) if !form.focus.is_text() => {
                form.proxy_id = cycle_selection(form.proxy_id.as_deref(), &proxy_ids);
            }
            Some(Editor::Proxy(form)) if !form.focus.is_text() => {
                form.kind = form.kind.next();
            }
            Some(Editor::Chat(form)) => match form.focus {
                ChatField::SendPhoto => form.send_photo = !form.send_photo,
                ChatField::Account => {
                    form.account_id = cycle_selection(form.account_id.as_deref(), &account_ids);
                }
                _ => {}
            },
            _ => {}
        }
    }

    // ========================
    // Posting times
    // ========================

    /// Parse the `HH:MM` buffer and append a time entry
    pub fn add_time(&mut self) {
        let Some(Editor::Chat(form)) = self.editor.as_mut() else {
            return;
        };

        match parse_time_entry(form.time_input.trim()) {
            Some(time) => {
                form.times.push(time);
                form.time_input.clear();
                self.cursor_position = 0;
            }
            None => {
                self.notify(NotificationKind::Error, "Invalid time, use HH:MM");
            }
        }
    }

    /// Remove the most recently added time entry
    pub fn remove_time(&mut self) {
        if let Some(Editor::Chat(form)) = self.editor.as_mut() {
            form.times.pop();
        }
    }

    // ========================
    // Clipboard config transfer
    // ========================

    pub fn export_config(&mut self) {
        let result = self
            .store
            .export_snapshot()
            .and_then(|text| clipboard::copy_text(&text));
        match result {
            Ok(()) => {
                self.notify(
                    NotificationKind::Success,
                    "Configuration copied to clipboard!",
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Config export failed");
                self.notify(NotificationKind::Error, "Could not access the clipboard");
            }
        }
    }

    pub fn import_config(&mut self) {
        let text = match clipboard::read_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Clipboard read failed");
                self.notify(NotificationKind::Error, "Could not access the clipboard");
                return;
            }
        };

        match self.store.import_snapshot(&text) {
            Ok(()) => {
                self.selected_account = 0;
                self.selected_proxy = 0;
                self.selected_chat = 0;
                self.notify(
                    NotificationKind::Success,
                    "Configuration loaded successfully!",
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Config import rejected");
                self.notify(NotificationKind::Error, "Invalid configuration format");
            }
        }
    }

    // ========================
    // Test mode
    // ========================

    /// Begin a simulated delivery run from the open chat form.
    /// No-op while a run is already active.
    pub fn start_test(&mut self) -> Option<SenderCommand> {
        if self.test.active {
            return None;
        }

        let Some(Editor::Chat(form)) = self.editor.as_ref() else {
            return None;
        };

        if form.chat_id.trim().is_empty()
            || form.message.trim().is_empty()
            || form.account_id.is_none()
        {
            self.notify(
                NotificationKind::Error,
                "Please fill in chat ID, message and select an account for testing",
            );
            return None;
        }

        let interval = form
            .test_interval
            .trim()
            .parse::<u64>()
            .unwrap_or(DEFAULT_TEST_INTERVAL_SECS)
            .max(1);

        let command = SenderCommand::StartTest {
            target: normalize_chat_id(form.chat_id.trim()),
            message: form.message.clone(),
            photo_url: form
                .send_photo
                .then(|| form.photo_url.trim().to_string())
                .filter(|url| !url.is_empty()),
            account_id: form.account_id.clone().unwrap_or_default(),
            interval: Duration::from_secs(interval),
        };

        self.test.active = true;
        self.test.count = 0;
        self.test.status = String::from("Test mode active. Sending messages...");
        Some(command)
    }

    /// Stop the active run, if any. Idempotent.
    pub fn stop_test(&mut self) -> Option<SenderCommand> {
        if !self.test.active {
            return None;
        }
        self.test.active = false;
        Some(SenderCommand::StopTest)
    }

    // ========================
    // Sender events
    // ========================

    pub fn handle_sender_event(&mut self, event: SenderEvent) {
        match event {
            SenderEvent::TestFired {
                count,
                target,
                with_photo,
            } => {
                self.test.count = count;
                let photo_status = if with_photo { "with photo" } else { "without photo" };
                self.test.status =
                    format!("Sent {} test messages to {} ({})", count, target, photo_status);
                self.notify(
                    NotificationKind::Success,
                    format!("Test message #{} sent to {}", count, target),
                );
            }
            SenderEvent::TestStopped { count } => {
                self.test.active = false;
                self.test.count = count;
                self.test.status = format!("Test stopped. Sent {} test messages.", count);
            }
        }
    }

    // ========================
    // Popups
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}

/// Cycle a selector through None and each available id in order
fn cycle_selection(current: Option<&str>, ids: &[String]) -> Option<String> {
    match current {
        None => ids.first().cloned(),
        Some(id) => {
            let pos = ids.iter().position(|candidate| candidate == id);
            match pos {
                Some(i) if i + 1 < ids.len() => Some(ids[i + 1].clone()),
                // Past the end, or a dangling selection: wrap to None
                _ => None,
            }
        }
    }
}

/// Parse an `HH:MM` time entry with bounds checking
fn parse_time_entry(input: &str) -> Option<PostTime> {
    let (hour, minute) = input.split_once(':')?;
    let hour: u8 = hour.trim().parse().ok()?;
    let minute: u8 = minute.trim().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(PostTime { hour, minute })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let state = AppState::with_store(Store::with_dir(dir.path()));
        (state, dir)
    }

    fn filled_chat_form(account_id: &str) -> ChatForm {
        ChatForm {
            name: "News".into(),
            chat_id: "123456".into(),
            message: "hello".into(),
            account_id: Some(account_id.to_string()),
            ..ChatForm::default()
        }
    }

    fn add_account(state: &mut AppState) -> String {
        state.store.upsert_account(Account {
            id: String::new(),
            name: "Main".into(),
            api_id: "1".into(),
            api_hash: "h".into(),
            phone_number: "+1".into(),
            session_file: "main.session".into(),
            proxy: None,
        })
    }

    #[test]
    fn test_save_account_requires_fields() {
        let (mut state, _dir) = test_state();
        state.editor = Some(Editor::Account(AccountForm {
            name: "Main".into(),
            ..AccountForm::default()
        }));

        state.save_editor();

        assert!(state.store.accounts.is_empty());
        assert!(state.editor.is_some(), "editor stays open on failure");
        let notification = state.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
    }

    #[test]
    fn test_save_account_defaults_session_file() {
        let (mut state, _dir) = test_state();
        state.editor = Some(Editor::Account(AccountForm {
            name: "My Main".into(),
            api_id: "12345".into(),
            api_hash: "abc".into(),
            phone_number: "+10".into(),
            ..AccountForm::default()
        }));

        state.save_editor();

        assert!(state.editor.is_none());
        let account = state.store.accounts.values().next().unwrap();
        assert_eq!(account.session_file, "my_main.session");
    }

    #[test]
    fn test_save_chat_requires_time_entry() {
        let (mut state, _dir) = test_state();
        let account_id = add_account(&mut state);
        let mut form = filled_chat_form(&account_id);
        form.times.clear();
        state.editor = Some(Editor::Chat(form));

        state.save_editor();

        assert!(state.store.chats.is_empty());
        let notification = state.notification.unwrap();
        assert!(notification.message.contains("posting time"));
    }

    #[test]
    fn test_save_chat_normalizes_chat_id() {
        let (mut state, _dir) = test_state();
        let account_id = add_account(&mut state);
        state.editor = Some(Editor::Chat(filled_chat_form(&account_id)));

        state.save_editor();

        let chat = state.store.chats.values().next().unwrap();
        assert_eq!(chat.chat_id, "-100123456");
    }

    #[test]
    fn test_save_chat_drops_photo_url_when_photo_disabled() {
        let (mut state, _dir) = test_state();
        let account_id = add_account(&mut state);
        let mut form = filled_chat_form(&account_id);
        form.send_photo = false;
        state.editor = Some(Editor::Chat(form));

        state.save_editor();

        let chat = state.store.chats.values().next().unwrap();
        assert!(!chat.send_photo);
        assert!(chat.photo_url.is_empty());
    }

    #[test]
    fn test_start_test_twice_is_noop() {
        let (mut state, _dir) = test_state();
        let account_id = add_account(&mut state);
        state.editor = Some(Editor::Chat(filled_chat_form(&account_id)));

        let first = state.start_test();
        let second = state.start_test();

        assert!(matches!(first, Some(SenderCommand::StartTest { .. })));
        assert!(second.is_none());
        assert!(state.test.active);
    }

    #[test]
    fn test_start_test_requires_form_fields() {
        let (mut state, _dir) = test_state();
        state.editor = Some(Editor::Chat(ChatForm::default()));

        assert!(state.start_test().is_none());
        assert!(!state.test.active);
        let notification = state.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
    }

    #[test]
    fn test_stop_test_is_idempotent() {
        let (mut state, _dir) = test_state();
        let account_id = add_account(&mut state);
        state.editor = Some(Editor::Chat(filled_chat_form(&account_id)));
        state.start_test();

        assert!(matches!(state.stop_test(), Some(SenderCommand::StopTest)));
        assert!(state.stop_test().is_none());
    }

    #[test]
    fn test_cancel_editor_stops_active_test() {
        let (mut state, _dir) = test_state();
        let account_id = add_account(&mut state);
        state.editor = Some(Editor::Chat(filled_chat_form(&account_id)));
        state.start_test();

        let command = state.cancel_editor();

        assert!(matches!(command, Some(SenderCommand::StopTest)));
        assert!(state.editor.is_none());
        assert!(!state.test.active);
    }

    #[test]
    fn test_delete_selected_account_clears_chat_reference() {
        let (mut state, _dir) = test_state();
        let account_id = add_account(&mut state);
        state.editor = Some(Editor::Chat(filled_chat_form(&account_id)));
        state.save_editor();
        state.active_tab = AppTab::Accounts;
        state.selected_account = 0;

        state.delete_selected();

        assert!(state.store.accounts.is_empty());
        let chat = state.store.chats.values().next().unwrap();
        assert!(chat.account_id.is_none());
    }

    #[test]
    fn test_toggle_field_cycles_proxy_selection() {
        let (mut state, _dir) = test_state();
        let proxy_id = state.store.upsert_proxy(Proxy {
            id: String::new(),
            name: "p".into(),
            kind: Default::default(),
            host: "h".into(),
            port: "1080".into(),
            username: String::new(),
            password: String::new(),
        });
        state.editor = Some(Editor::Account(AccountForm {
            focus: crate::messages::ui_events::AccountField::Proxy,
            ..AccountForm::default()
        }));

        state.toggle_field();
        let Some(Editor::Account(form)) = &state.editor else {
            unreachable!()
        };
        assert_eq!(form.proxy_id.as_deref(), Some(proxy_id.as_str()));

        state.toggle_field();
        let Some(Editor::Account(form)) = &state.editor else {
            unreachable!()
        };
        assert!(form.proxy_id.is_none(), "cycles back to no proxy");
    }

    #[test]
    fn test_add_time_parses_and_validates() {
        let (mut state, _dir) = test_state();
        let mut form = ChatForm::default();
        form.times.clear();
        form.time_input = "18:30".into();
        state.editor = Some(Editor::Chat(form));

        state.add_time();
        let Some(Editor::Chat(form)) = &state.editor else {
            unreachable!()
        };
        assert_eq!(form.times, vec![PostTime { hour: 18, minute: 30 }]);
        assert!(form.time_input.is_empty());
    }

    #[test]
    fn test_add_time_rejects_out_of_range() {
        let (mut state, _dir) = test_state();
        let mut form = ChatForm::default();
        form.times.clear();
        form.time_input = "24:00".into();
        state.editor = Some(Editor::Chat(form));

        state.add_time();
        let Some(Editor::Chat(form)) = &state.editor else {
            unreachable!()
        };
        assert!(form.times.is_empty());
        assert_eq!(state.notification.unwrap().kind, NotificationKind::Error);
    }

    #[test]
    fn test_parse_time_entry_bounds() {
        assert_eq!(parse_time_entry("0:0"), Some(PostTime { hour: 0, minute: 0 }));
        assert_eq!(
            parse_time_entry("23:59"),
            Some(PostTime { hour: 23, minute: 59 })
        );
        assert_eq!(parse_time_entry("24:00"), None);
        assert_eq!(parse_time_entry("12:60"), None);
        assert_eq!(parse_time_entry("noon"), None);
    }

    #[test]
    fn test_list_selection_clamps_after_delete() {
        let (mut state, _dir) = test_state();
        add_account(&mut state);
        add_account(&mut state);
        state.active_tab = AppTab::Accounts;
        state.selected_account = 1;

        state.delete_selected();

        assert_eq!(state.selected_account, 0);
    }

    #[test]
    fn test_sender_events_update_test_state() {
        let (mut state, _dir) = test_state();
        state.test.active = true;

        state.handle_sender_event(SenderEvent::TestFired {
            count: 3,
            target: "-100123456".into(),
            with_photo: false,
        });
        assert_eq!(state.test.count, 3);
        assert!(state.test.status.contains("without photo"));

        state.handle_sender_event(SenderEvent::TestStopped { count: 3 });
        assert!(!state.test.active);
        assert!(state.test.status.contains("Sent 3 test messages"));
    }
}
