use tokio::sync::mpsc;

/// Progress task ids for the export steps that report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressIds {
    pub prefab: i32,
    pub path: i32,
    pub terrain: i32,
    pub circuit: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub id: i32,
    pub progress: f32,
    pub message: String,
}

/// Fire-and-forget progress reporting. Implementations must not block and
/// must not fail the operation they report on.
pub trait ProgressSink: Send + Sync {
    fn report(&self, id: i32, progress: f32, message: &str);
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _id: i32, _progress: f32, _message: &str) {}
}

/// Forwards updates into a bounded channel; updates are dropped when the
/// channel is full or the receiver is gone.
pub struct ChannelProgress {
    tx: mpsc::Sender<ProgressUpdate>,
}

impl ChannelProgress {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, id: i32, progress: f32, message: &str) {
        let update = ProgressUpdate {
            id,
            progress,
            message: message.to_string(),
        };
        if let Err(e) = self.tx.try_send(update) {
            log::debug!("Dropped progress update: {}", e);
        }
    }
}
