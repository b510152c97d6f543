//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation-facing account standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ActivityStatus {
    #[sea_orm(string_value = "ACTIVE")]
    #[default]
    Active,
    /// At least one open report names this user.
    #[sea_orm(string_value = "PENDING_REPORT_REVIEW")]
    PendingReportReview,
    #[sea_orm(string_value = "SUSPENDED_BY_ADMIN")]
    SuspendedByAdmin,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Bearer access token
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_moderator: bool,

    #[sea_orm(default_value = false)]
    pub is_delivery_agent: bool,

    pub activity_status: ActivityStatus,

    /// Disabled accounts cannot authenticate
    #[sea_orm(default_value = false)]
    pub is_disabled: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Full display name for listings.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
