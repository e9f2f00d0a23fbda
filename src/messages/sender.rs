//! Sender messages - communication between App and Sender layers

use std::time::Duration;

/// Commands sent from App layer to Sender layer
#[derive(Debug, Clone)]
pub enum SenderCommand {
    /// Begin a simulated delivery run. Only one run may be active at a
    /// time; starting while active is a no-op.
    StartTest {
        target: String,
        message: String,
        photo_url: Option<String>,
        account_id: String,
        interval: Duration,
    },
    /// Cancel the active run, if any. Idempotent.
    StopTest,
    /// Cancel any run and shut the actor down
    Shutdown,
}

/// Events sent from Sender layer back to App layer
#[derive(Debug, Clone, PartialEq)]
pub enum SenderEvent {
    /// One simulated send completed
    TestFired {
        count: u64,
        target: String,
        with_photo: bool,
    },
    /// The run was stopped; carries the final send counter
    TestStopped { count: u64 },
}
