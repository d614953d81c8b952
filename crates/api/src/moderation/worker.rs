//! Moderation orchestrator worker.
//!
//! A single long-lived Tokio task that consumes post ids from the
//! moderation channel and evaluates each one: read the runtime flags,
//! optionally call the classifier, write the resulting status through
//! the guarded transition, then fire notifications and the rejection
//! compensation path. A periodic scan re-evaluates drafts whose
//! enqueued evaluation was lost, so no post stays in Draft
//! indefinitely.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gigboard_core::error::CoreError;
use gigboard_core::moderation::{self, ClassifierVerdict};
use gigboard_core::status::PostStatus;
use gigboard_core::types::DbId;
use gigboard_db::models::post::Post;
use gigboard_db::models::site_config::SiteConfig;
use gigboard_db::repositories::{PostRepo, TransitionError, UserRepo};
use gigboard_db::DbPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config_cache::ConfigCache;
use crate::moderation::ModerationClassifier;
use crate::notifier::Notifier;
use crate::publication;

/// How often the worker scans for drafts with a lost evaluation.
const REQUEUE_INTERVAL: Duration = Duration::from_secs(300);

/// Drafts younger than this are assumed to still be in the channel.
const REQUEUE_GRACE_MINUTES: i64 = 10;

pub struct ModerationWorker {
    pool: DbPool,
    site_config: ConfigCache,
    classifier: Arc<ModerationClassifier>,
    notifier: Arc<Notifier>,
}

impl ModerationWorker {
    pub fn new(
        pool: DbPool,
        site_config: ConfigCache,
        classifier: Arc<ModerationClassifier>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            pool,
            site_config,
            classifier,
            notifier,
        }
    }

    /// Run the consumer loop until the channel closes or the token fires.
    pub async fn run(self, mut rx: mpsc::Receiver<DbId>, cancel: CancellationToken) {
        let mut requeue_tick = tokio::time::interval(REQUEUE_INTERVAL);
        // The first tick completes immediately; skip it so startup does
        // not race the initial migrations.
        requeue_tick.tick().await;

        tracing::info!("Moderation worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Moderation worker shutting down");
                    break;
                }
                message = rx.recv() => {
                    match message {
                        Some(post_id) => {
                            if let Err(e) = self.evaluate(post_id).await {
                                tracing::error!(error = %e, post_id, "Moderation evaluation failed");
                            }
                        }
                        None => {
                            tracing::info!("Moderation queue closed, worker stopping");
                            break;
                        }
                    }
                }
                _ = requeue_tick.tick() => {
                    if let Err(e) = self.requeue_stalled().await {
                        tracing::error!(error = %e, "Stalled-draft scan failed");
                    }
                }
            }
        }
    }

    /// Evaluate one post per the decision table.
    ///
    /// Skips silently when the post is gone, deleted, or no longer in
    /// Draft (a duplicate enqueue or a lost race is not an error).
    pub async fn evaluate(
        &self,
        post_id: DbId,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(post) = PostRepo::find_by_id(&self.pool, post_id).await? else {
            tracing::warn!(post_id, "Post vanished before evaluation");
            return Ok(());
        };
        if post.current_status() != Some(PostStatus::Draft) {
            tracing::debug!(post_id, status = post.status, "Post left Draft, skipping evaluation");
            return Ok(());
        }

        let config = self.site_config.get().await?;
        let flags = config.moderation_flags();

        let verdict = if flags.auto_moderation_enabled {
            let input = moderation::classifier_input(&post.title, &post.description);
            match self
                .classifier
                .moderate(&config.classifier_api_key, &input)
                .await
            {
                Ok(verdict) => Some(verdict),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        post_id,
                        "Classifier unavailable, routing to manual review"
                    );
                    None
                }
            }
        } else {
            Some(ClassifierVerdict::Pass)
        };

        let next = match verdict {
            Some(verdict) => moderation::next_status(flags, verdict),
            None => moderation::fail_safe_status(),
        };

        let post = match PostRepo::transition(&self.pool, post.id, PostStatus::Draft, next).await {
            Ok(post) => post,
            Err(TransitionError::Core(CoreError::Conflict(msg))) => {
                tracing::warn!(post_id, %msg, "Post moved concurrently, evaluation dropped");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            post_id,
            status = %next,
            auto = flags.auto_moderation_enabled,
            manual = flags.manual_approval_required,
            "Moderation evaluation complete"
        );

        match next {
            PostStatus::Published => {
                self.notify_owner(&config, &post, "Your post has been published.")
                    .await;
            }
            PostStatus::PendingManualReview => {
                self.notifier.send_review_prompt(&config, &post).await;
            }
            PostStatus::Rejected => {
                publication::handle_moderation_rejection(&self.pool, &post).await?;
                self.notify_owner(&config, &post, "Your post was rejected by moderation.")
                    .await;
            }
            _ => {}
        }

        Ok(())
    }

    /// Re-evaluate drafts whose enqueued evaluation never arrived.
    async fn requeue_stalled(&self) -> Result<(), sqlx::Error> {
        let older_than = Utc::now() - chrono::Duration::minutes(REQUEUE_GRACE_MINUTES);
        let stalled = PostRepo::stalled_drafts(&self.pool, older_than).await?;
        if stalled.is_empty() {
            return Ok(());
        }

        tracing::warn!(count = stalled.len(), "Re-evaluating stalled drafts");
        for post_id in stalled {
            if let Err(e) = self.evaluate(post_id).await {
                tracing::error!(error = %e, post_id, "Stalled draft evaluation failed");
            }
        }
        Ok(())
    }

    async fn notify_owner(&self, config: &SiteConfig, post: &Post, text: &str) {
        match UserRepo::find_by_id(&self.pool, post.user_id).await {
            Ok(Some(owner)) => {
                self.notifier
                    .send_user_message(config, owner.external_id, text)
                    .await;
            }
            Ok(None) => {
                tracing::warn!(post_id = post.id, user_id = post.user_id, "Post owner not found");
            }
            Err(e) => {
                tracing::warn!(error = %e, post_id = post.id, "Owner lookup failed");
            }
        }
    }
}
