//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between the UI, App, and Sender layers.

pub mod render;
pub mod sender;
pub mod ui_events;

pub use render::{AccountCard, ChatCard, RenderState};
pub use sender::{SenderCommand, SenderEvent};
pub use ui_events::UiEvent;
