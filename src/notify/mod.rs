//! Training-complete notifications
//!
//! Two independent deliveries per notification: a push message to the
//! user's topic and an append to the user's durable notification log.
//! Delivery is at-least-once; nothing here deduplicates repeated calls.

mod dispatcher;
mod memory;

pub use dispatcher::{DeliveryReport, NotificationDispatcher};
pub use memory::MemoryNotificationChannel;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metrics::{MetricSet, TaskType};
use crate::Result;

/// Title of every training-complete notification.
pub const TRAINING_COMPLETE_TITLE: &str = "Training Complete!";

/// Payload `type` value for client-side routing.
pub const TRAINING_COMPLETE_TYPE: &str = "TRAINING_COMPLETE";

/// What a finished run reports to its user.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Winning algorithm name.
    pub model_name: String,
    /// Accuracy (classification) or r² (regression) of the winner.
    pub score: Option<f64>,
    /// Task type of the run.
    pub task_type: TaskType,
    /// Dataset name.
    pub dataset: String,
}

impl TrainingSummary {
    /// Summary of a run won by `winner`.
    #[must_use]
    pub fn from_winner(winner: &MetricSet, dataset: impl Into<String>) -> Self {
        Self {
            model_name: winner.algorithm_name().to_string(),
            score: winner.headline_score(),
            task_type: winner.task_type(),
            dataset: dataset.into(),
        }
    }
}

/// Push message content: human-readable text plus a routing payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Short title.
    pub title: String,
    /// One-sentence summary.
    pub body: String,
    /// Machine-readable fields (`type`, `modelName`, `score`, `dataset`, `timestamp`).
    pub payload: Map<String, Value>,
}

impl Notification {
    /// Content announcing a finished run, stamped now.
    #[must_use]
    pub fn training_complete(summary: &TrainingSummary) -> Self {
        let body = match (summary.task_type, summary.score) {
            (TaskType::Classification, Some(accuracy)) => format!(
                "Your model '{}' achieved {:.2}% accuracy on {}",
                summary.model_name,
                accuracy * 100.0,
                summary.dataset
            ),
            (TaskType::Regression, Some(r2)) => format!(
                "Your model '{}' achieved R² {:.4} on {}",
                summary.model_name, r2, summary.dataset
            ),
            (_, None) => format!(
                "Your model '{}' finished training on {}",
                summary.model_name, summary.dataset
            ),
        };

        let mut payload = Map::new();
        payload.insert("type".into(), Value::from(TRAINING_COMPLETE_TYPE));
        payload.insert("modelName".into(), Value::from(summary.model_name.as_str()));
        payload.insert(
            "score".into(),
            summary
                .score
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Null, Value::Number),
        );
        payload.insert("dataset".into(), Value::from(summary.dataset.as_str()));
        payload.insert(
            "timestamp".into(),
            Value::from(Utc::now().timestamp_millis()),
        );

        Self {
            title: TRAINING_COMPLETE_TITLE.to_string(),
            body,
            payload,
        }
    }
}

/// Entry appended to a user's notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    /// Whether the user has read the entry. Always `false` when written.
    pub read: bool,
    /// Owning user.
    pub user_id: u64,
    /// Same payload as the push message.
    pub data: Map<String, Value>,
}

impl LogEntry {
    /// Unread log entry mirroring `notification`.
    #[must_use]
    pub fn for_user(user_id: u64, notification: &Notification) -> Self {
        let timestamp = notification
            .payload
            .get("timestamp")
            .and_then(Value::as_i64)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Self {
            title: notification.title.clone(),
            body: notification.body.clone(),
            timestamp,
            read: false,
            user_id,
            data: notification.payload.clone(),
        }
    }
}

/// Transport for push messages and the per-user notification log.
///
/// Implementations are shared across runs behind an `Arc` and torn down
/// once with [`shutdown`](NotificationChannel::shutdown).
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Send `notification` to `topic`, returning the message id.
    async fn publish(&self, topic: &str, notification: &Notification) -> Result<String>;

    /// Append `entry` to the user's log, returning the generated entry id.
    async fn append_log(&self, user_id: u64, entry: &LogEntry) -> Result<String>;

    /// Release transport resources. Deliveries after shutdown fail.
    async fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ClassificationMetrics, RegressionMetrics};

    #[test]
    fn test_classification_body_and_payload() {
        let winner = MetricSet::classification("rf", ClassificationMetrics::new().accuracy(0.9134));
        let n = Notification::training_complete(&TrainingSummary::from_winner(&winner, "iris"));

        assert_eq!(n.title, "Training Complete!");
        assert_eq!(n.body, "Your model 'rf' achieved 91.34% accuracy on iris");
        assert_eq!(n.payload["type"], Value::from("TRAINING_COMPLETE"));
        assert_eq!(n.payload["modelName"], Value::from("rf"));
        assert_eq!(n.payload["score"].as_f64(), Some(0.9134));
        assert_eq!(n.payload["dataset"], Value::from("iris"));
        assert!(n.payload["timestamp"].as_i64().is_some());
    }

    #[test]
    fn test_regression_body() {
        let winner = MetricSet::regression("lr", RegressionMetrics::new().r2(0.75));
        let n = Notification::training_complete(&TrainingSummary::from_winner(&winner, "houses"));
        assert_eq!(n.body, "Your model 'lr' achieved R² 0.7500 on houses");
    }

    #[test]
    fn test_missing_score() {
        let winner = MetricSet::regression("lr", RegressionMetrics::new().mse(1.0));
        let n = Notification::training_complete(&TrainingSummary::from_winner(&winner, "houses"));
        assert_eq!(n.body, "Your model 'lr' finished training on houses");
        assert!(n.payload["score"].is_null());
    }

    #[test]
    fn test_log_entry_mirrors_notification() {
        let winner = MetricSet::classification("rf", ClassificationMetrics::new().accuracy(0.5));
        let n = Notification::training_complete(&TrainingSummary::from_winner(&winner, "iris"));
        let entry = LogEntry::for_user(7, &n);

        assert!(!entry.read);
        assert_eq!(entry.user_id, 7);
        assert_eq!(entry.body, n.body);
        assert_eq!(entry.data, n.payload);
        assert_eq!(Some(entry.timestamp), n.payload["timestamp"].as_i64());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["read"], Value::Bool(false));
        assert_eq!(json["user_id"], Value::from(7));
    }
}
