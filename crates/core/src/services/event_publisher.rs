//! Report event publisher abstraction.
//!
//! Core services publish moderation events without depending on the
//! queue/pubsub implementation. Publication is fire-and-forget: callers log
//! failures and carry on with the triggering mutation.

use async_trait::async_trait;
use rentmate_common::AppResult;
use std::sync::Arc;

/// Trait for publishing moderation events.
#[async_trait]
pub trait ReportEventPublisher: Send + Sync {
    /// A new report was submitted.
    async fn report_created(
        &self,
        report_id: &str,
        reported_user_id: &str,
        report_type: &str,
    ) -> AppResult<()>;

    /// A report was resolved against the reported user.
    async fn report_resolved(&self, report_id: &str, reported_user_id: &str) -> AppResult<()>;

    /// A report was dismissed.
    async fn report_dismissed(&self, report_id: &str, reported_user_id: &str) -> AppResult<()>;

    /// An OVERDUE report was escalated to THIEVING.
    async fn report_escalated(
        &self,
        source_report_id: &str,
        thieving_report_id: &str,
        reported_user_id: &str,
    ) -> AppResult<()>;
}

/// A no-op implementation for tests or when event publication is disabled.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl ReportEventPublisher for NoOpEventPublisher {
    async fn report_created(
        &self,
        _report_id: &str,
        _reported_user_id: &str,
        _report_type: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn report_resolved(&self, _report_id: &str, _reported_user_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn report_dismissed(&self, _report_id: &str, _reported_user_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn report_escalated(
        &self,
        _source_report_id: &str,
        _thieving_report_id: &str,
        _reported_user_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `ReportEventPublisher` trait object.
pub type ReportEventPublisherService = Arc<dyn ReportEventPublisher>;
