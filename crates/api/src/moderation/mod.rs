//! The asynchronous moderation pipeline.
//!
//! Submission handlers and the publication service enqueue post ids onto
//! a bounded channel; a single worker task consumes them, evaluates each
//! post against the runtime moderation flags (and, when enabled, the
//! external classifier), writes the resulting status, and fires
//! notifications. Moderation is never triggered implicitly by a
//! persistence write.

pub mod classifier;
pub mod worker;

pub use classifier::ModerationClassifier;
pub use worker::ModerationWorker;

use gigboard_core::types::DbId;
use tokio::sync::mpsc;

/// Default capacity of the moderation channel.
const QUEUE_CAPACITY: usize = 256;

/// Cloneable producer half of the moderation channel.
#[derive(Clone)]
pub struct ModerationQueue {
    tx: mpsc::Sender<DbId>,
}

impl ModerationQueue {
    /// Create the channel; the receiver goes to [`ModerationWorker::run`].
    pub fn new() -> (Self, mpsc::Receiver<DbId>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        (Self { tx }, rx)
    }

    /// Enqueue one evaluation for a post.
    ///
    /// Returns `false` when the worker is gone (shutdown); the stalled
    /// draft requeue picks the post up on the next cycle, so callers only
    /// log the miss.
    pub async fn enqueue(&self, post_id: DbId) -> bool {
        match self.tx.send(post_id).await {
            Ok(()) => true,
            Err(_) => {
                tracing::error!(post_id, "Moderation queue closed, evaluation not enqueued");
                false
            }
        }
    }
}
