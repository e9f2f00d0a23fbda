//! # Telepost TUI
//!
//! A terminal manager for Telegram channel posting: accounts, proxies
//! and chats with scheduled posting times, persisted to a local JSON
//! state file.
//!
//! ## Features
//! - Account, proxy and chat management
//! - Chat-ID normalization to the `-100` channel form
//! - Config export/import through the system clipboard
//! - Simulated test sending on a configurable interval
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Sender Layer (Tokio runtime)

pub mod models;
pub mod store;
pub mod ui;
pub mod chat_id;
pub mod clipboard;
pub mod messages;
pub mod app;
pub mod sender;
pub mod constants;

// Re-export commonly used types
pub use models::{Account, Chat, PostTime, Proxy, ProxyType};
pub use chat_id::normalize_chat_id;
pub use store::Store;
pub use messages::{RenderState, SenderCommand, SenderEvent, UiEvent};
pub use app::{AppActor, AppState};
pub use sender::SenderActor;
