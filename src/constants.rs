//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Directory under the home dir where state and logs live
pub const APP_DIR: &str = ".telepost";

/// File name of the persisted state snapshot
pub const STATE_FILE: &str = "state.json";

/// Default interval between simulated test sends, in seconds
pub const DEFAULT_TEST_INTERVAL_SECS: u64 = 5;

/// Default photo URL pre-filled on new chat forms
pub const DEFAULT_PHOTO_URL: &str = "https://i.imgur.com/xiLQhFF.png";

/// Length of generated entity ids
pub const ID_LEN: usize = 26;

/// Application name
#[allow(dead_code)]
pub const APP_NAME: &str = "Telepost TUI";

/// Application version
#[allow(dead_code)]
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
