//! Summary notification for newly persisted postings.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{NotifierConfig, Posting};
use crate::services::push::{PushMessage, PushService};

/// Sends one best-effort summary per run.
pub struct Notifier {
    service: Arc<dyn PushService>,
    topic: String,
    data: BTreeMap<String, String>,
}

impl Notifier {
    pub fn new(
        service: Arc<dyn PushService>,
        topic: impl Into<String>,
        data: BTreeMap<String, String>,
    ) -> Self {
        Self {
            service,
            topic: topic.into(),
            data,
        }
    }

    pub fn from_config(service: Arc<dyn PushService>, config: &NotifierConfig) -> Self {
        Self::new(service, config.topic.clone(), config.data.clone())
    }

    /// Title and body for `count` new postings, using `sample` for detail.
    pub fn summary_message(count: usize, sample: &Posting) -> (String, String) {
        if count == 1 {
            (
                "New Internship Alert!".to_string(),
                format!("{} is looking for a {}", sample.company, sample.title),
            )
        } else {
            (
                format!("{count} New Internships Found!"),
                format!("Check out roles at {} and others.", sample.company),
            )
        }
    }

    /// Publish the summary, returning the receipt.
    ///
    /// Does nothing when `count` is zero. Delivery failures are logged and
    /// swallowed.
    pub async fn notify(&self, count: usize, sample: &Posting) -> Option<String> {
        if count == 0 {
            return None;
        }

        let (title, body) = Self::summary_message(count, sample);
        let message = PushMessage {
            title,
            body,
            data: self.data.clone(),
        };

        match self.service.publish(&self.topic, &message).await {
            Ok(receipt) => {
                log::info!("Notification sent: {}", receipt);
                Some(receipt)
            }
            Err(e) => {
                log::error!("Notification failed: {}", e);
                None
            }
        }
    }
}
