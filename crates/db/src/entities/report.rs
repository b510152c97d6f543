//! User report entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "PENDING")]
    #[default]
    Pending,
    #[sea_orm(string_value = "UNDER_REVIEW")]
    UnderReview,
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
    #[sea_orm(string_value = "DISMISSED")]
    Dismissed,
}

/// Category of the misconduct being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    #[sea_orm(string_value = "FRAUD")]
    Fraud,
    #[sea_orm(string_value = "DAMAGE")]
    Damage,
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    #[sea_orm(string_value = "FAKE_USER")]
    FakeUser,
    /// Only ever created by the escalation sweep, never by clients.
    #[sea_orm(string_value = "THIEVING")]
    Thieving,
}

/// User report model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The user who submitted the report.
    pub reporter_id: String,
    /// The user being reported.
    pub reported_user_id: String,
    pub report_type: ReportType,
    /// Free-text description of the incident.
    #[sea_orm(column_type = "Text")]
    pub details: String,
    /// Only meaningful for DAMAGE reports (0-100).
    #[sea_orm(nullable)]
    pub damage_percentage: Option<f64>,
    #[sea_orm(nullable)]
    pub related_rental_id: Option<String>,
    #[sea_orm(nullable)]
    pub related_delivery_id: Option<String>,
    pub status: ReportStatus,
    /// Moderator currently holding the review lock.
    #[sea_orm(nullable)]
    pub claimed_by: Option<String>,
    #[sea_orm(nullable)]
    pub claimed_at: Option<DateTimeWithTimeZone>,
    /// The lock is live only while this is in the future.
    #[sea_orm(nullable)]
    pub lock_expires_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(nullable)]
    pub resolved_by: Option<String>,
    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution_notes: Option<String>,
    /// Set on THIEVING reports created by escalating an OVERDUE report.
    #[sea_orm(nullable)]
    pub escalated_from_id: Option<String>,
    pub submitted_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// A report is locked when someone claimed it and the lock has not yet
    /// expired. An expired-but-unreaped lock does not count as locked.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.claimed_by.is_some() && self.lock_expires_at.is_some_and(|t| t > now)
    }

    /// Whether `moderator_id` holds a live lock on this report.
    #[must_use]
    pub fn is_locked_by(&self, moderator_id: &str, now: DateTime<Utc>) -> bool {
        self.is_locked(now) && self.claimed_by.as_deref() == Some(moderator_id)
    }

    /// RESOLVED and DISMISSED are terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.status, ReportStatus::Resolved | ReportStatus::Dismissed)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report(claimed_by: Option<&str>, expires_in_secs: Option<i64>) -> Model {
        let now = Utc::now();
        Model {
            id: "report1".to_string(),
            reporter_id: "owner1".to_string(),
            reported_user_id: "renter1".to_string(),
            report_type: ReportType::Overdue,
            details: "Item was not returned after the rental period".to_string(),
            damage_percentage: None,
            related_rental_id: Some("rental1".to_string()),
            related_delivery_id: None,
            status: ReportStatus::UnderReview,
            claimed_by: claimed_by.map(ToString::to_string),
            claimed_at: claimed_by.map(|_| now.into()),
            lock_expires_at: expires_in_secs.map(|s| (now + Duration::seconds(s)).into()),
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
            escalated_from_id: None,
            submitted_at: now.into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_live_lock() {
        let now = Utc::now();
        let r = report(Some("mod1"), Some(600));

        assert!(r.is_locked(now));
        assert!(r.is_locked_by("mod1", now));
        assert!(!r.is_locked_by("mod2", now));
    }

    #[test]
    fn test_expired_lock_is_not_locked() {
        let now = Utc::now();
        let r = report(Some("mod1"), Some(-600));

        assert!(!r.is_locked(now));
        assert!(!r.is_locked_by("mod1", now));
    }

    #[test]
    fn test_lock_boundary_around_expiry() {
        let now = Utc::now();

        // One minute before expiry the lock still holds; one minute after,
        // the report is free to claim and eligible for the reaper.
        assert!(report(Some("mod1"), Some(60)).is_locked(now));
        assert!(!report(Some("mod1"), Some(-60)).is_locked(now));
    }

    #[test]
    fn test_unclaimed_is_not_locked() {
        let r = report(None, None);
        assert!(!r.is_locked(Utc::now()));
    }

    #[test]
    fn test_terminal_states() {
        let mut r = report(None, None);
        assert!(!r.is_terminal());

        r.status = ReportStatus::Resolved;
        assert!(r.is_terminal());

        r.status = ReportStatus::Dismissed;
        assert!(r.is_terminal());
    }
}
