//! Best-effort delivery of training-complete notifications.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{LogEntry, Notification, NotificationChannel, TrainingSummary};
use crate::config::EngineConfig;
use crate::{Error, Result};

/// Outcome of both sub-deliveries of one notification.
#[derive(Debug)]
pub struct DeliveryReport {
    /// Push message id, or why the push failed.
    pub push: Result<String>,
    /// Log entry id, or why the append failed.
    pub log: Result<String>,
}

impl DeliveryReport {
    /// Whether both sub-deliveries succeeded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.push.is_ok() && self.log.is_ok()
    }
}

/// Sends notifications through an injected [`NotificationChannel`].
///
/// Cheap to clone; clones share the channel.
#[derive(Clone)]
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
    topic_prefix: String,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("topic_prefix", &self.topic_prefix)
            .finish_non_exhaustive()
    }
}

impl NotificationDispatcher {
    /// Dispatcher with the default `user_` topic prefix.
    #[must_use]
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self::from_config(channel, &EngineConfig::default())
    }

    /// Dispatcher using the configured topic prefix.
    #[must_use]
    pub fn from_config(channel: Arc<dyn NotificationChannel>, config: &EngineConfig) -> Self {
        Self {
            channel,
            topic_prefix: config.topic_prefix.clone(),
        }
    }

    /// Push topic of `user_id`.
    #[must_use]
    pub fn topic(&self, user_id: u64) -> String {
        format!("{}{user_id}", self.topic_prefix)
    }

    /// Deliver to both sides and report each outcome.
    ///
    /// The push and the log append run as separate tasks, so a failure or
    /// panic in one never prevents the other.
    pub async fn deliver(&self, user_id: u64, summary: &TrainingSummary) -> DeliveryReport {
        let notification = Notification::training_complete(summary);
        let entry = LogEntry::for_user(user_id, &notification);
        let topic = self.topic(user_id);

        let channel = Arc::clone(&self.channel);
        let push = tokio::spawn(async move { channel.publish(&topic, &notification).await });

        let channel = Arc::clone(&self.channel);
        let log = tokio::spawn(async move { channel.append_log(user_id, &entry).await });

        let (push, log) = tokio::join!(push, log);
        DeliveryReport {
            push: push.unwrap_or_else(|e| Err(Error::Notification(format!("push task: {e}")))),
            log: log.unwrap_or_else(|e| Err(Error::Notification(format!("log task: {e}")))),
        }
    }

    /// Deliver and log the outcome. Never fails.
    pub async fn notify(&self, user_id: u64, summary: &TrainingSummary) {
        let report = self.deliver(user_id, summary).await;

        match &report.push {
            Ok(id) => debug!(user_id, message_id = %id, "push notification sent"),
            Err(e) => error!(user_id, error = %e, "push notification failed"),
        }
        match &report.log {
            Ok(id) => debug!(user_id, entry_id = %id, "notification logged"),
            Err(e) => error!(user_id, error = %e, "notification log append failed"),
        }

        if report.is_complete() {
            info!(user_id, model = %summary.model_name, "user notified");
        }
    }

    /// Run [`notify`](Self::notify) on its own task.
    pub fn spawn_notify(&self, user_id: u64, summary: TrainingSummary) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.notify(user_id, &summary).await })
    }

    /// Tear the channel down.
    pub async fn shutdown(&self) {
        self.channel.shutdown().await;
    }
}
