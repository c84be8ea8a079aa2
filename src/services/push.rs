// src/services/push.rs

//! Push notification delivery.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};

/// A notification addressed to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Routing metadata read by the mobile client
    pub data: BTreeMap<String, String>,
}

/// Delivers push notifications to topic subscribers.
#[async_trait]
pub trait PushService: Send + Sync {
    /// Publish `message` to `topic`, returning the delivery receipt.
    async fn publish(&self, topic: &str, message: &PushMessage) -> Result<String>;
}

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/v1";

/// Firebase Cloud Messaging client (HTTP v1 API).
pub struct FcmClient {
    client: Client,
    endpoint: String,
    project_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: String,
}

impl FcmClient {
    pub fn new(client: Client, project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: FCM_ENDPOINT.to_string(),
            project_id: project_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at a different API root.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn send_url(&self) -> String {
        format!(
            "{}/projects/{}/messages:send",
            self.endpoint.trim_end_matches('/'),
            self.project_id
        )
    }
}

/// Request body for `messages:send`.
fn fcm_payload(topic: &str, message: &PushMessage) -> serde_json::Value {
    json!({
        "message": {
            "topic": topic,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
        }
    })
}

#[async_trait]
impl PushService for FcmClient {
    async fn publish(&self, topic: &str, message: &PushMessage) -> Result<String> {
        log::info!("Sending push notification to topic '{}'", topic);

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&self.access_token)
            .json(&fcm_payload(topic, message))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::push(format!("FCM returned {status}: {body}")));
        }

        let sent: FcmResponse = response.json().await?;
        Ok(sent.name)
    }
}

/// Push service that only writes the message to the log.
#[derive(Debug, Default)]
pub struct LogPush;

#[async_trait]
impl PushService for LogPush {
    async fn publish(&self, topic: &str, message: &PushMessage) -> Result<String> {
        log::info!(
            "Push [{}] {}: {} {:?}",
            topic,
            message.title,
            message.body,
            message.data
        );
        Ok(format!("log:{topic}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> PushMessage {
        PushMessage {
            title: "New Internship Alert!".into(),
            body: "Acme is looking for a Intern".into(),
            data: BTreeMap::from([("screen".to_string(), "Home".to_string())]),
        }
    }

    #[test]
    fn test_fcm_payload_shape() {
        let payload = fcm_payload("internships", &message());
        assert_eq!(payload["message"]["topic"], "internships");
        assert_eq!(
            payload["message"]["notification"]["title"],
            "New Internship Alert!"
        );
        assert_eq!(payload["message"]["data"]["screen"], "Home");
    }

    #[test]
    fn test_send_url() {
        let client = FcmClient::new(Client::new(), "intern-app", "token")
            .with_endpoint("http://localhost:9099/v1/");
        assert_eq!(
            client.send_url(),
            "http://localhost:9099/v1/projects/intern-app/messages:send"
        );
    }

    #[tokio::test]
    async fn test_log_push_receipt() {
        let receipt = LogPush.publish("internships", &message()).await.unwrap();
        assert_eq!(receipt, "log:internships");
    }
}
