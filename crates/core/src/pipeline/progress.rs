//! Progress reporting for batch runs.

use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::types::{ProgressEvent, ProgressStatus};

/// Receives per-file progress notifications.
///
/// Notifications are fire-and-forget: implementations must not block and
/// cannot fail the job that emitted them.
pub trait ProgressObserver: Send + Sync {
    fn notify(&self, path: &Path, status: ProgressStatus);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn notify(&self, _path: &Path, _status: ProgressStatus) {}
}

/// Logs every notification through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn notify(&self, path: &Path, status: ProgressStatus) {
        match status {
            ProgressStatus::Started => debug!(path = %path.display(), "Started"),
            ProgressStatus::Completed => info!(path = %path.display(), "Completed"),
            ProgressStatus::Skipped => info!(path = %path.display(), "Skipped"),
            ProgressStatus::Failed => warn!(path = %path.display(), "Failed"),
        }
    }
}

/// Bounded channel. Events are dropped when the channel is full or closed.
impl ProgressObserver for mpsc::Sender<ProgressEvent> {
    fn notify(&self, path: &Path, status: ProgressStatus) {
        let event = ProgressEvent {
            path: path.to_path_buf(),
            status,
        };
        if let Err(e) = self.try_send(event) {
            debug!(error = %e, "Dropped progress event");
        }
    }
}

impl ProgressObserver for mpsc::UnboundedSender<ProgressEvent> {
    fn notify(&self, path: &Path, status: ProgressStatus) {
        let _ = self.send(ProgressEvent {
            path: path.to_path_buf(),
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_unbounded_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.notify(Path::new("/a.mp3"), ProgressStatus::Started);
        tx.notify(Path::new("/a.mp3"), ProgressStatus::Completed);
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                ProgressEvent {
                    path: PathBuf::from("/a.mp3"),
                    status: ProgressStatus::Started
                },
                ProgressEvent {
                    path: PathBuf::from("/a.mp3"),
                    status: ProgressStatus::Completed
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_bounded_channel_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.notify(Path::new("/a.mp3"), ProgressStatus::Started);
        tx.notify(Path::new("/a.mp3"), ProgressStatus::Failed);

        assert_eq!(rx.recv().await.unwrap().status, ProgressStatus::Started);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
        drop(rx);
        tx.notify(Path::new("/a.mp3"), ProgressStatus::Skipped);
        NoopObserver.notify(Path::new("/a.mp3"), ProgressStatus::Skipped);
        TracingObserver.notify(Path::new("/a.mp3"), ProgressStatus::Failed);
    }
}
