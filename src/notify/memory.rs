//! In-process notification channel.
//!
//! Keeps every publish and log append in `DashMap`s. Each side can be made
//! to fail independently, which is how dispatcher fault handling is tested.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{LogEntry, Notification, NotificationChannel};
use crate::{Error, Result};

/// Notification channel that records deliveries in memory.
#[derive(Debug, Default)]
pub struct MemoryNotificationChannel {
    published: DashMap<String, Vec<Notification>>,
    logs: DashMap<u64, Vec<(String, LogEntry)>>,
    fail_push: AtomicBool,
    fail_log: AtomicBool,
    closed: AtomicBool,
}

impl MemoryNotificationChannel {
    /// Create an empty, healthy channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make push delivery fail (or recover).
    pub fn set_fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// Make log appends fail (or recover).
    pub fn set_fail_log(&self, fail: bool) {
        self.fail_log.store(fail, Ordering::SeqCst);
    }

    /// Messages published to `topic`, oldest first.
    #[must_use]
    pub fn published(&self, topic: &str) -> Vec<Notification> {
        self.published
            .get(topic)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }

    /// Log entries of `user_id` with their ids, oldest first.
    #[must_use]
    pub fn log_entries(&self, user_id: u64) -> Vec<(String, LogEntry)> {
        self.logs
            .get(&user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }

    /// Total number of publishes across all topics.
    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.published.iter().map(|e| e.value().len()).sum()
    }

    /// Total number of log entries across all users.
    #[must_use]
    pub fn log_count(&self) -> usize {
        self.logs.iter().map(|e| e.value().len()).sum()
    }

    /// Whether [`shutdown`](NotificationChannel::shutdown) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Notification("channel is shut down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for MemoryNotificationChannel {
    async fn publish(&self, topic: &str, notification: &Notification) -> Result<String> {
        self.check_open()?;
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(Error::Notification(format!("push to {topic} rejected")));
        }

        self.published
            .entry(topic.to_string())
            .or_default()
            .push(notification.clone());
        Ok(Uuid::new_v4().to_string())
    }

    async fn append_log(&self, user_id: u64, entry: &LogEntry) -> Result<String> {
        self.check_open()?;
        if self.fail_log.load(Ordering::SeqCst) {
            return Err(Error::Notification(format!(
                "log append for user {user_id} rejected"
            )));
        }

        let id = Uuid::new_v4().to_string();
        self.logs
            .entry(user_id)
            .or_default()
            .push((id.clone(), entry.clone()));
        Ok(id)
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
