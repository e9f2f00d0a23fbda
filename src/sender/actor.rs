//! Sender actor - runs simulated delivery loops in the Tokio async runtime

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::messages::{SenderCommand, SenderEvent};

/// Tracks the active test run for cancellation
struct ActiveTest {
    cancel_tx: oneshot::Sender<()>,
}

/// Sender actor that processes test-run commands.
/// At most one run is active at a time; a start while one is
/// running replaces it.
pub struct SenderActor {
    event_tx: mpsc::UnboundedSender<SenderEvent>,
    tasks: JoinSet<()>,
    active: Option<ActiveTest>,
}

impl SenderActor {
    pub fn new(event_tx: mpsc::UnboundedSender<SenderEvent>) -> Self {
        SenderActor {
            event_tx,
            tasks: JoinSet::new(),
            active: None,
        }
    }

    /// Run the sender actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<SenderCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(SenderCommand::StartTest { target, message, photo_url, account_id, interval }) => {
                            self.cancel_active().await;

                            let (cancel_tx, cancel_rx) = oneshot::channel();
                            self.active = Some(ActiveTest { cancel_tx });

                            let event_tx = self.event_tx.clone();
                            self.tasks.spawn(async move {
                                tracing::info!(%target, %account_id, interval_secs = interval.as_secs(), "Starting test run");
                                run_test_loop(target, message, photo_url, interval, event_tx, cancel_rx).await;
                            });
                        }

                        Some(SenderCommand::StopTest) => {
                            if self.active.is_some() {
                                tracing::info!("Stopping test run");
                                self.cancel_active().await;
                            }
                        }

                        Some(SenderCommand::Shutdown) => {
                            self.cancel_active().await;
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.tasks.join_next() => {}
            }
        }
    }

    /// Cancel the active run and wait for its final `TestStopped`
    /// to be emitted, so events stay ordered across runs
    async fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            let _ = active.cancel_tx.send(());
            while self.tasks.join_next().await.is_some() {}
        }
    }
}

/// Tick loop for a single test run. The first send fires immediately,
/// then one per interval until cancelled. Cancellation emits a final
/// `TestStopped` carrying the total count.
async fn run_test_loop(
    target: String,
    message: String,
    photo_url: Option<String>,
    interval: Duration,
    event_tx: mpsc::UnboundedSender<SenderEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    let with_photo = photo_url.is_some();
    let mut count: u64 = 0;

    loop {
        tokio::select! {
            _ = &mut cancel_rx => {
                break;
            }
            _ = ticker.tick() => {
                count += 1;
                tracing::debug!(%target, count, with_photo, preview = %message.chars().take(32).collect::<String>(), "Test message sent");
                let _ = event_tx.send(SenderEvent::TestFired {
                    count,
                    target: target.clone(),
                    with_photo,
                });
            }
        }
    }

    let _ = event_tx.send(SenderEvent::TestStopped { count });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_command(interval: Duration) -> SenderCommand {
        SenderCommand::StartTest {
            target: "-100123456".into(),
            message: "hello".into(),
            photo_url: None,
            account_id: "acc1".into(),
            interval,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fires_immediately_then_stops_with_count() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let actor = SenderActor::new(event_tx);
        let handle = tokio::spawn(actor.run(cmd_rx));

        cmd_tx.send(start_command(Duration::from_secs(5))).unwrap();

        // The first tick fires without waiting for the interval
        let first = event_rx.recv().await.unwrap();
        assert_eq!(
            first,
            SenderEvent::TestFired {
                count: 1,
                target: "-100123456".into(),
                with_photo: false,
            }
        );

        cmd_tx.send(SenderCommand::StopTest).unwrap();
        cmd_tx.send(SenderCommand::Shutdown).unwrap();
        handle.await.unwrap();

        // Everything after the first fire is more fires with increasing
        // counts, then exactly one TestStopped carrying the total.
        let mut last_count = 1;
        let mut stopped = None;
        while let Some(event) = event_rx.recv().await {
            match event {
                SenderEvent::TestFired { count, .. } => {
                    assert!(stopped.is_none(), "no fires after stop");
                    assert_eq!(count, last_count + 1);
                    last_count = count;
                }
                SenderEvent::TestStopped { count } => {
                    assert_eq!(count, last_count);
                    stopped = Some(count);
                }
            }
        }
        assert!(stopped.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_run_replaces_active_run() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let actor = SenderActor::new(event_tx);
        let handle = tokio::spawn(actor.run(cmd_rx));

        cmd_tx.send(start_command(Duration::from_secs(5))).unwrap();
        let first = event_rx.recv().await.unwrap();
        assert!(matches!(first, SenderEvent::TestFired { count: 1, .. }));

        // Starting again cancels the first loop
        cmd_tx.send(start_command(Duration::from_secs(5))).unwrap();

        let mut saw_stop = false;
        loop {
            match event_rx.recv().await.unwrap() {
                SenderEvent::TestStopped { .. } => {
                    saw_stop = true;
                }
                SenderEvent::TestFired { count: 1, .. } if saw_stop => {
                    // The replacement run restarted the count
                    break;
                }
                SenderEvent::TestFired { .. } => {}
            }
        }

        cmd_tx.send(SenderCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_active_run() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let actor = SenderActor::new(event_tx);
        let handle = tokio::spawn(actor.run(cmd_rx));

        cmd_tx.send(start_command(Duration::from_secs(5))).unwrap();
        let first = event_rx.recv().await.unwrap();
        assert!(matches!(first, SenderEvent::TestFired { .. }));

        cmd_tx.send(SenderCommand::Shutdown).unwrap();
        handle.await.unwrap();

        let mut saw_stop = false;
        while let Some(event) = event_rx.recv().await {
            if matches!(event, SenderEvent::TestStopped { .. }) {
                saw_stop = true;
            }
        }
        assert!(saw_stop);
    }
}
