use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ParticipantId;

/// Errors a notifier can report for a single message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Rejected by chat platform ({status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Outbound message channel to participants
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: ParticipantId, text: &str) -> Result<(), NotifyError>;
}

/// A message addressed to one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: ParticipantId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub recipient: ParticipantId,
    pub reason: String,
}

/// Outcome of a fan-out; partial delivery is a normal result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub total: usize,
    pub sent: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Send every notification, at most `concurrency` at a time
///
/// Each send is tracked on its own: a failure is logged and recorded in the
/// report and never stops the remaining sends.
pub async fn deliver_all(
    notifier: &dyn Notifier,
    notifications: Vec<Notification>,
    concurrency: usize,
) -> DeliveryReport {
    let total = notifications.len();

    let results: Vec<(ParticipantId, Result<(), NotifyError>)> = stream::iter(notifications)
        .map(|notification| async move {
            let result = notifier.send(notification.recipient, &notification.text).await;
            (notification.recipient, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = DeliveryReport {
        total,
        ..Default::default()
    };

    for (recipient, result) in results {
        match result {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::warn!("Failed to notify participant {}: {}", recipient, e);
                report.failures.push(DeliveryFailure {
                    recipient,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.failures.sort_by_key(|f| f.recipient);
    report
}

/// Message telling a giver who they are buying for
pub fn compose_assignment_message(receiver_name: &str, wishlist: Option<&str>) -> String {
    let mut text = String::from("🎅 Secret Santa!\n\nThe draw is done! 🎲\n\n");
    text.push_str(&format!("You are giving a gift to: {} 🎁\n\n", receiver_name));

    match wishlist {
        Some(list) if !list.trim().is_empty() => {
            text.push_str("📝 Their wishlist:\n");
            text.push_str(list);
        }
        _ => text.push_str("📝 They have not shared a wishlist yet."),
    }

    text
}
