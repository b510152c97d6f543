//! Redis Pub/Sub publication of moderation events.
//!
//! Downstream consumers (notification service, admin dashboards) subscribe
//! to the report channel and per-user channels. Publication is
//! fire-and-forget from the caller's point of view.

#![allow(missing_docs)]

use async_trait::async_trait;
use fred::clients::Client;
use fred::error::Error as RedisError;
use fred::interfaces::{ClientLike, PubsubInterface};
use fred::types::config::Config as RedisConfig;
use rentmate_common::{AppError, AppResult};
use rentmate_core::services::ReportEventPublisher;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Pub/Sub event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PubSubEvent {
    /// New report submitted.
    ReportCreated {
        id: String,
        reported_user_id: String,
        report_type: String,
    },
    /// Report resolved against the reported user.
    ReportResolved {
        id: String,
        reported_user_id: String,
    },
    /// Report dismissed.
    ReportDismissed {
        id: String,
        reported_user_id: String,
    },
    /// Overdue report escalated to thieving; the user was suspended.
    ReportEscalated {
        source_report_id: String,
        thieving_report_id: String,
        reported_user_id: String,
    },
}

/// Redis-backed moderation event publisher.
#[derive(Clone)]
pub struct RedisEventPublisher {
    client: Client,
    prefix: String,
}

impl RedisEventPublisher {
    /// Connect a publisher client to Redis.
    pub async fn new(redis_url: &str, prefix: &str) -> Result<Self, RedisError> {
        let config = RedisConfig::from_url(redis_url)?;

        let client = Client::new(config, None, None, None);
        client.init().await?;

        info!("Redis event publisher initialized");

        Ok(Self {
            client,
            prefix: prefix.to_string(),
        })
    }

    /// Channel carrying all report events.
    #[must_use]
    pub fn reports_channel(&self) -> String {
        format!("{}:reports", self.prefix)
    }

    /// Channel carrying events about a specific user.
    #[must_use]
    pub fn user_channel(&self, user_id: &str) -> String {
        format!("{}:user:{user_id}", self.prefix)
    }

    async fn publish(&self, channel: &str, event: &PubSubEvent) -> AppResult<()> {
        let payload =
            serde_json::to_string(event).map_err(|e| AppError::Internal(e.to_string()))?;

        let _: () = self
            .client
            .publish(channel, payload)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(channel, ?event, "Published Pub/Sub event");
        Ok(())
    }

    async fn publish_for_user(&self, user_id: &str, event: &PubSubEvent) -> AppResult<()> {
        self.publish(&self.reports_channel(), event).await?;
        self.publish(&self.user_channel(user_id), event).await
    }
}

#[async_trait]
impl ReportEventPublisher for RedisEventPublisher {
    async fn report_created(
        &self,
        report_id: &str,
        reported_user_id: &str,
        report_type: &str,
    ) -> AppResult<()> {
        let event = PubSubEvent::ReportCreated {
            id: report_id.to_string(),
            reported_user_id: reported_user_id.to_string(),
            report_type: report_type.to_string(),
        };
        self.publish_for_user(reported_user_id, &event).await
    }

    async fn report_resolved(&self, report_id: &str, reported_user_id: &str) -> AppResult<()> {
        let event = PubSubEvent::ReportResolved {
            id: report_id.to_string(),
            reported_user_id: reported_user_id.to_string(),
        };
        self.publish_for_user(reported_user_id, &event).await
    }

    async fn report_dismissed(&self, report_id: &str, reported_user_id: &str) -> AppResult<()> {
        let event = PubSubEvent::ReportDismissed {
            id: report_id.to_string(),
            reported_user_id: reported_user_id.to_string(),
        };
        self.publish_for_user(reported_user_id, &event).await
    }

    async fn report_escalated(
        &self,
        source_report_id: &str,
        thieving_report_id: &str,
        reported_user_id: &str,
    ) -> AppResult<()> {
        let event = PubSubEvent::ReportEscalated {
            source_report_id: source_report_id.to_string(),
            thieving_report_id: thieving_report_id.to_string(),
            reported_user_id: reported_user_id.to_string(),
        };
        self.publish_for_user(reported_user_id, &event).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = PubSubEvent::ReportEscalated {
            source_report_id: "report1".to_string(),
            thieving_report_id: "report2".to_string(),
            reported_user_id: "renter1".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"reportEscalated\""));
        assert!(json.contains("\"source_report_id\":\"report1\""));

        let parsed: PubSubEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, PubSubEvent::ReportEscalated { .. }));
    }
}
