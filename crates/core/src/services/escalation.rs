//! Escalation engine.
//!
//! OVERDUE reports that sit PENDING past the escalation window are treated
//! as theft: a THIEVING report is opened, the OVERDUE report is closed by
//! the system, and the reported user is suspended.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rentmate_common::{AppResult, IdGenerator};
use rentmate_db::{
    entities::report::{self, ReportStatus, ReportType},
    repositories::{ReportRepository, UserRepository},
};
use sea_orm::Set;

use super::event_publisher::ReportEventPublisher;

/// Author recorded on system-made resolutions.
const SYSTEM_RESOLVER: &str = "system";

/// Escalation service: converts stale OVERDUE reports into THIEVING cases.
#[derive(Clone)]
pub struct EscalationService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    events: Arc<dyn ReportEventPublisher>,
    escalation_window: Duration,
    id_gen: IdGenerator,
}

impl EscalationService {
    /// Create a new escalation service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        user_repo: UserRepository,
        events: Arc<dyn ReportEventPublisher>,
        escalation_window: Duration,
    ) -> Self {
        Self {
            report_repo,
            user_repo,
            events,
            escalation_window,
            id_gen: IdGenerator::new(),
        }
    }

    /// Run one escalation sweep. Returns how many reports were escalated.
    ///
    /// Each stale report is processed independently; a failure is logged
    /// and the sweep moves on. Because only PENDING reports are picked up
    /// and the system resolution is conditional on PENDING, re-runs never
    /// double-escalate.
    pub async fn escalate_overdue_reports(&self) -> AppResult<u64> {
        let now = Utc::now();
        let cutoff = now - self.escalation_window;

        let stale = self
            .report_repo
            .find_stale(ReportType::Overdue, ReportStatus::Pending, cutoff)
            .await?;

        if stale.is_empty() {
            return Ok(0);
        }

        tracing::info!(count = stale.len(), "Escalating stale overdue reports");

        let mut escalated = 0u64;
        for source in stale {
            match self.escalate_one(&source, now).await {
                Ok(true) => escalated += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(report_id = %source.id, error = %e, "Failed to escalate overdue report");
                }
            }
        }

        Ok(escalated)
    }

    async fn escalate_one(&self, source: &report::Model, now: DateTime<Utc>) -> AppResult<bool> {
        let thieving_id = self.id_gen.generate();

        let model = report::ActiveModel {
            id: Set(thieving_id.clone()),
            reporter_id: Set(source.reporter_id.clone()),
            reported_user_id: Set(source.reported_user_id.clone()),
            report_type: Set(ReportType::Thieving),
            details: Set(Self::build_thieving_details(source)),
            damage_percentage: Set(None),
            related_rental_id: Set(source.related_rental_id.clone()),
            related_delivery_id: Set(source.related_delivery_id.clone()),
            status: Set(ReportStatus::Pending),
            claimed_by: Set(None),
            claimed_at: Set(None),
            lock_expires_at: Set(None),
            resolved_by: Set(None),
            resolved_at: Set(None),
            resolution_notes: Set(None),
            escalated_from_id: Set(Some(source.id.clone())),
            submitted_at: Set(now.into()),
            updated_at: Set(None),
        };
        self.report_repo.create(model).await?;

        let note = format!(
            "Automatically escalated to THIEVING report {thieving_id} after \
             exceeding the overdue review window"
        );
        let rows = self
            .report_repo
            .resolve_system(&source.id, SYSTEM_RESOLVER, &note, now)
            .await?;

        if rows == 0 {
            // A moderator claimed or closed the report between the scan and
            // the resolution. Leave their work alone; the extra THIEVING
            // report stays for them to dismiss.
            tracing::warn!(report_id = %source.id, "Overdue report changed state during escalation; skipping suspension");
            return Ok(false);
        }

        self.user_repo.suspend(&source.reported_user_id, now).await?;

        if let Err(e) = self
            .events
            .report_escalated(&source.id, &thieving_id, &source.reported_user_id)
            .await
        {
            tracing::warn!(report_id = %source.id, error = %e, "Failed to publish escalation event");
        }

        tracing::info!(
            report_id = %source.id,
            thieving_report_id = %thieving_id,
            reported_user_id = %source.reported_user_id,
            "Overdue report escalated to thieving"
        );

        Ok(true)
    }

    fn build_thieving_details(source: &report::Model) -> String {
        let rental = source.related_rental_id.as_deref().unwrap_or("unknown");
        format!(
            "AUTO-ESCALATED THEFT REPORT\n\n\
             Escalated from overdue report {} for rental {}.\n\n\
             ORIGINAL OVERDUE REPORT:\n\
             Submitted: {}\n\
             Details: {}\n\n\
             ESCALATION REASON:\n\
             The rented item was not returned within the review window after \
             the overdue report. This is now treated as theft.\n\n\
             REQUIRED ACTIONS:\n\
             1. Contact local authorities\n\
             2. Provide a police report with full renter details\n\
             3. Initiate legal proceedings if necessary\n\
             4. Process an insurance claim if applicable",
            source.id,
            rental,
            source.submitted_at.to_rfc3339(),
            source.details
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::NoOpEventPublisher;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn overdue_report(id: &str) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: "owner1".to_string(),
            reported_user_id: "renter1".to_string(),
            report_type: ReportType::Overdue,
            details: "Item was not returned after the rental period".to_string(),
            damage_percentage: None,
            related_rental_id: Some("rental1".to_string()),
            related_delivery_id: None,
            status: ReportStatus::Pending,
            claimed_by: None,
            claimed_at: None,
            lock_expires_at: None,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
            escalated_from_id: None,
            submitted_at: (Utc::now() - Duration::hours(100)).into(),
            updated_at: None,
        }
    }

    fn thieving_report(id: &str, source_id: &str) -> report::Model {
        let mut r = overdue_report(id);
        r.report_type = ReportType::Thieving;
        r.escalated_from_id = Some(source_id.to_string());
        r
    }

    fn service(db: DatabaseConnection) -> EscalationService {
        let db = Arc::new(db);
        EscalationService::new(
            ReportRepository::new(db.clone()),
            UserRepository::new(db),
            Arc::new(NoOpEventPublisher),
            Duration::hours(72),
        )
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_stale() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<report::Model>::new()])
            .into_connection();

        let escalated = service(db).escalate_overdue_reports().await.unwrap();
        assert_eq!(escalated, 0);
    }

    #[tokio::test]
    async fn test_escalates_stale_overdue_report() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // stale scan
            .append_query_results([[overdue_report("report1")]])
            // insert of the thieving report (RETURNING)
            .append_query_results([[thieving_report("thieving1", "report1")]])
            .append_exec_results([
                // system resolution of the overdue report
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                // suspension of the reported user
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let escalated = service(db).escalate_overdue_reports().await.unwrap();
        assert_eq!(escalated, 1);
    }

    #[tokio::test]
    async fn test_skips_report_claimed_during_sweep() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[overdue_report("report1")]])
            .append_query_results([[thieving_report("thieving1", "report1")]])
            .append_exec_results([
                // lost the PENDING-only resolution: no suspension follows
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let escalated = service(db).escalate_overdue_reports().await.unwrap();
        assert_eq!(escalated, 0);
    }

    #[test]
    fn test_thieving_details_reference_the_source() {
        let source = overdue_report("report1");
        let details = EscalationService::build_thieving_details(&source);

        assert!(details.contains("report1"));
        assert!(details.contains("rental1"));
        assert!(details.contains(&source.details));
    }

    #[test]
    fn test_thieving_details_list_required_actions() {
        let source = overdue_report("report1");
        let details = EscalationService::build_thieving_details(&source);

        assert!(details.contains("REQUIRED ACTIONS"));
        assert!(details.contains("Contact local authorities"));
        assert!(details.contains("police report"));
    }
}
