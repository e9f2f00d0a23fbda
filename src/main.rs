//! Telepost TUI - Actor-based Telegram posting manager
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Sender Layer (Tokio) - async simulated delivery runs

mod models;
mod store;
mod ui;
mod chat_id;
mod clipboard;
mod messages;
mod app;
mod sender;
mod constants;

use std::io;
use std::time::Duration;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use tokio::sync::mpsc;

use app::state::{ChatForm, Editor};
use app::{AppActor, AppState};
use messages::ui_events::{key_to_ui_event, AccountField, AppTab, ChatField, InputMode, ProxyField};
use messages::{RenderState, SenderCommand, SenderEvent, UiEvent};
use sender::SenderActor;
use ui::{cursor_column, field_line, mask_secret, notification_color};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file; the terminal belongs to the TUI
    let log_dir = dirs::home_dir()
        .map(|home| home.join(constants::APP_DIR))
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "telepost.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (sender_cmd_tx, sender_cmd_rx) = mpsc::unbounded_channel::<SenderCommand>();
    let (sender_event_tx, sender_event_rx) = mpsc::unbounded_channel::<SenderEvent>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn sender actor
    let sender_actor = SenderActor::new(sender_event_tx);
    tokio::spawn(sender_actor.run(sender_cmd_rx));

    // Spawn app actor with state loaded from disk
    let app_actor = AppActor::new(AppState::new(), sender_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, sender_event_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, &current_state) {
                    if matches!(event, UiEvent::Quit) {
                        let _ = ui_tx.send(event);
                        break;
                    }
                    let _ = ui_tx.send(event);
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    // Main layout with tab bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Tab bar
            Constraint::Min(0),     // Content
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    // Draw tab bar
    draw_tab_bar(f, state, main_chunks[0]);

    // Draw the entity list for the active tab
    match state.active_tab {
        AppTab::Accounts => draw_accounts_tab(f, state, main_chunks[1]),
        AppTab::Proxies => draw_proxies_tab(f, state, main_chunks[1]),
        AppTab::Chats => draw_chats_tab(f, state, main_chunks[1]),
    }

    // Status bar
    draw_status_bar(f, state, main_chunks[2]);

    // Popups
    if let Some(editor) = &state.editor {
        draw_editor_popup(f, state, editor, area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let labels = [
        (AppTab::Accounts, format!(" 1:Accounts ({}) ", state.accounts.len()), Color::Cyan),
        (AppTab::Proxies, format!(" 2:Proxies ({}) ", state.proxies.len()), Color::Magenta),
        (AppTab::Chats, format!(" 3:Chats ({}) ", state.chats.len()), Color::Green),
    ];

    let mut tabs: Vec<Span> = Vec::new();
    for (tab, label, color) in labels {
        tabs.push(Span::styled(
            label,
            if state.active_tab == tab {
                Style::default().fg(Color::Black).bg(color).bold()
            } else {
                Style::default().fg(Color::Gray)
            },
        ));
        tabs.push(Span::raw(" "));
    }

    if state.test_active {
        tabs.push(Span::styled(
            format!(" [test: {}] ", state.test_count),
            Style::default().fg(Color::Yellow),
        ));
    }

    let tab_line = Line::from(tabs);
    f.render_widget(Paragraph::new(tab_line), area);
}

fn draw_accounts_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let items: Vec<ListItem> = state
        .accounts
        .iter()
        .map(|card| {
            let mut spans = vec![
                Span::styled(card.account.name.clone(), Style::default().bold()),
                Span::styled(
                    format!("  {}", card.account.phone_number),
                    Style::default().fg(Color::Gray),
                ),
            ];
            match &card.proxy_label {
                Some(label) => {
                    let color = if label.starts_with("Unknown") {
                        Color::Red
                    } else {
                        Color::Magenta
                    };
                    spans.push(Span::styled(
                        format!("  [{}]", label),
                        Style::default().fg(color),
                    ));
                }
                None => spans.push(Span::styled(
                    "  [no proxy]",
                    Style::default().fg(Color::DarkGray),
                )),
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = entity_list(items, " Accounts (a:add e:edit d:delete) ", state.accounts.is_empty());
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_account));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_proxies_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let items: Vec<ListItem> = state
        .proxies
        .iter()
        .map(|proxy| {
            let auth = if proxy.username.is_empty() { "" } else { " (auth)" };
            ListItem::new(Line::from(vec![
                Span::styled(proxy.name.clone(), Style::default().bold()),
                Span::styled(
                    format!("  {}", proxy.kind.as_str().to_uppercase()),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    format!("  {}:{}{}", proxy.host, proxy.port, auth),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let list = entity_list(items, " Proxies (a:add e:edit d:delete) ", state.proxies.is_empty());
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_proxy));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_chats_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let items: Vec<ListItem> = state
        .chats
        .iter()
        .map(|card| {
            let times = card
                .chat
                .times
                .iter()
                .map(|t| t.label())
                .collect::<Vec<_>>()
                .join(", ");
            let account_color = if card.account_name == "Unknown Account" {
                Color::Red
            } else {
                Color::Cyan
            };

            let mut spans = vec![
                Span::styled(card.chat.name.clone(), Style::default().bold()),
                Span::styled(
                    format!("  {}", card.chat.chat_id),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("  {}", card.account_name),
                    Style::default().fg(account_color),
                ),
                Span::styled(format!("  @ {}", times), Style::default().fg(Color::Green)),
            ];
            if card.chat.send_photo {
                spans.push(Span::styled(" [photo]", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = entity_list(items, " Chats (a:add e:edit d:delete) ", state.chats.is_empty());
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_chat));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn entity_list<'a>(items: Vec<ListItem<'a>>, title: &str, empty: bool) -> List<'a> {
    let items = if empty {
        vec![ListItem::new(Span::styled(
            "Nothing here yet. Press 'a' to add.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        items
    };

    List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .highlight_symbol("> ")
}

// ============================================================================
// Editor popups
// ============================================================================

fn draw_editor_popup(f: &mut Frame, state: &RenderState, editor: &Editor, area: Rect) {
    match editor {
        Editor::Account(form) => {
            let popup_area = centered_rect(60, 60, area);
            let focus = form.focus;
            let is_editing = state.input_mode == InputMode::Editing;

            let proxy_label = match &form.proxy_id {
                Some(id) => state
                    .proxies
                    .iter()
                    .find(|p| &p.id == id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| String::from("<unknown>")),
                None => String::from("None"),
            };

            let lines = vec![
                field_line("Name", form.name.clone(), focus == AccountField::Name, is_editing),
                field_line("API ID", form.api_id.clone(), focus == AccountField::ApiId, is_editing),
                field_line("API Hash", form.api_hash.clone(), focus == AccountField::ApiHash, is_editing),
                field_line("Phone", form.phone_number.clone(), focus == AccountField::PhoneNumber, is_editing),
                field_line("Session file", form.session_file.clone(), focus == AccountField::SessionFile, is_editing),
                field_line("Proxy", proxy_label, focus == AccountField::Proxy, false),
            ];

            let title = if form.edit_id.is_some() { " Edit Account " } else { " New Account " };
            render_form(f, popup_area, title, lines);

            let row = match focus {
                AccountField::Name => 0,
                AccountField::ApiId => 1,
                AccountField::ApiHash => 2,
                AccountField::PhoneNumber => 3,
                AccountField::SessionFile => 4,
                AccountField::Proxy => 5,
            };
            set_form_cursor(f, state, popup_area, row, focus.is_text());
        }
        Editor::Proxy(form) => {
            let popup_area = centered_rect(60, 60, area);
            let focus = form.focus;
            let is_editing = state.input_mode == InputMode::Editing;

            let lines = vec![
                field_line("Name", form.name.clone(), focus == ProxyField::Name, is_editing),
                field_line("Type", form.kind.as_str().to_uppercase(), focus == ProxyField::Kind, false),
                field_line("Host", form.host.clone(), focus == ProxyField::Host, is_editing),
                field_line("Port", form.port.clone(), focus == ProxyField::Port, is_editing),
                field_line("Username", form.username.clone(), focus == ProxyField::Username, is_editing),
                field_line(
                    "Password",
                    if focus == ProxyField::Password && is_editing {
                        form.password.clone()
                    } else {
                        mask_secret(&form.password)
                    },
                    focus == ProxyField::Password,
                    is_editing,
                ),
            ];

            let title = if form.edit_id.is_some() { " Edit Proxy " } else { " New Proxy " };
            render_form(f, popup_area, title, lines);

            let row = match focus {
                ProxyField::Name => 0,
                ProxyField::Kind => 1,
                ProxyField::Host => 2,
                ProxyField::Port => 3,
                ProxyField::Username => 4,
                ProxyField::Password => 5,
            };
            set_form_cursor(f, state, popup_area, row, focus.is_text());
        }
        Editor::Chat(form) => draw_chat_editor(f, state, form, area),
    }
}

fn draw_chat_editor(f: &mut Frame, state: &RenderState, form: &ChatForm, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    let focus = form.focus;
    let is_editing = state.input_mode == InputMode::Editing;

    let account_label = match &form.account_id {
        Some(id) => state
            .accounts
            .iter()
            .find(|card| &card.account.id == id)
            .map(|card| card.account.name.clone())
            .unwrap_or_else(|| String::from("<unknown>")),
        None => String::from("Select an account"),
    };

    let times = form
        .times
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        field_line("Name", form.name.clone(), focus == ChatField::Name, is_editing),
        field_line("Chat ID", form.chat_id.clone(), focus == ChatField::ChatId, is_editing),
        field_line(
            "Message",
            form.message.replace('\n', "⏎"),
            focus == ChatField::Message,
            is_editing,
        ),
        field_line(
            "Send photo",
            String::from(if form.send_photo { "[x]" } else { "[ ]" }),
            focus == ChatField::SendPhoto,
            false,
        ),
        field_line("Photo URL", form.photo_url.clone(), focus == ChatField::PhotoUrl, is_editing),
        field_line("Account", account_label, focus == ChatField::Account, false),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Times"), Style::default().fg(Color::Gray)),
            Span::styled(times, Style::default().fg(Color::Green)),
        ]),
        field_line("Add time", form.time_input.clone(), focus == ChatField::TimeInput, is_editing),
        field_line(
            "Test every (s)",
            form.test_interval.clone(),
            focus == ChatField::TestInterval,
            is_editing,
        ),
    ];

    if state.test_active || !state.test_status.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            state.test_status.clone(),
            if state.test_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        )));
    }

    let title = if form.edit_id.is_some() { " Edit Chat " } else { " New Chat " };
    render_form(f, popup_area, title, lines);

    let row = match focus {
        ChatField::Name => 0,
        ChatField::ChatId => 1,
        ChatField::Message => 2,
        ChatField::SendPhoto => 3,
        ChatField::PhotoUrl => 4,
        ChatField::Account => 5,
        ChatField::TimeInput => 7,
        ChatField::TestInterval => 8,
    };
    set_form_cursor(f, state, popup_area, row, focus.is_text());
}

fn render_form(f: &mut Frame, popup_area: Rect, title: &str, lines: Vec<Line>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_bottom(Line::from(" s:save Esc:cancel ").right_aligned())
        .style(Style::default().bg(Color::Black));

    let form = Paragraph::new(lines).block(block);
    f.render_widget(Clear, popup_area);
    f.render_widget(form, popup_area);
}

/// Place the terminal cursor inside the focused text field.
/// `cursor_position` is a byte offset; columns count chars.
fn set_form_cursor(f: &mut Frame, state: &RenderState, popup_area: Rect, row: usize, is_text: bool) {
    if !is_text || state.input_mode != InputMode::Editing {
        return;
    }
    let column = state
        .editor
        .as_ref()
        .map(|editor| cursor_column(editor.focused_text(), state.cursor_position))
        .unwrap_or(0);
    const LABEL_WIDTH: u16 = 14;
    let max_x = popup_area.x + popup_area.width.saturating_sub(2);
    let cursor_x = (popup_area.x + 1 + LABEL_WIDTH + column as u16).min(max_x);
    let cursor_y = popup_area.y + 1 + row as u16;
    f.set_cursor_position(Position::new(cursor_x, cursor_y));
}

// ============================================================================
// Status bar and popups
// ============================================================================

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    // A fresh notification takes the whole line
    if let Some(notification) = &state.notification {
        if notification.is_fresh() {
            let bar = Paragraph::new(format!(" {} ", notification.message))
                .style(Style::default().fg(notification_color(notification.kind)).bold());
            f.render_widget(bar, area);
            return;
        }
    }

    let status = match (&state.editor, state.input_mode) {
        (Some(_), InputMode::Editing) => " Esc:done | Enter:commit | arrows:move cursor ",
        (Some(Editor::Chat(_)), InputMode::Normal) => {
            " Tab:field | e:edit | Space:toggle | d:del time | t:test | x:stop | s:save | Esc:cancel "
        }
        (Some(_), InputMode::Normal) => {
            " Tab:field | e:edit | Space:toggle | s:save | Esc:cancel "
        }
        (None, _) => {
            " 1/2/3:tabs | up/down:select | a:add | e:edit | d:delete | c:copy config | l:load config | ?:help | q:quit "
        }
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 TELEPOST TUI - Keyboard Shortcuts

 LISTS
   1 / 2 / 3          Accounts / Proxies / Chats
   Tab / Shift+Tab    Cycle tabs
   ↑ / ↓              Select entry
   a / n              Add new entry
   e / Enter          Edit selected entry
   d / Delete         Delete selected entry

 CONFIG
   c                  Copy config to clipboard
   l                  Load config from clipboard

 EDITOR
   Tab / ↑ / ↓        Move between fields
   e / Enter          Edit field (or toggle)
   Space              Toggle checkbox / cycle selector
   s                  Save
   Esc                Cancel

 CHAT EDITOR
   Enter (time field) Add posting time
   d                  Remove last posting time
   t                  Start test sending
   x                  Stop test sending

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
