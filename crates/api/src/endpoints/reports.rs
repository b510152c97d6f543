//! Report endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rentmate_common::{AppError, AppResult};
use rentmate_core::{CreateReportInput, ReportPage, ResolveOutcome};
use rentmate_db::entities::{
    report::{self, ReportStatus, ReportType},
    user,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::PaginatedResponse};

const MAX_PAGE_SIZE: u64 = 100;

// ==================== Requests ====================

/// Create report request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub report_type: ReportType,
    #[validate(length(min = 1, max = 4000))]
    pub details: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub damage_percentage: Option<f64>,
    pub rental_id: String,
    pub delivery_id: Option<String>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub status: Option<ReportStatus>,
    #[serde(default, rename = "type")]
    pub report_type: Option<ReportType>,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    20
}

impl ListQuery {
    /// Clamp to a valid 1-based page and a bounded page size, and return
    /// `(limit, offset)` for the repository.
    fn window(&self) -> (u64, u64, u64) {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        (page, limit, (page - 1) * limit)
    }
}

/// Resolve/dismiss request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

// ==================== Responses ====================

/// Report list item / creation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub reporter_id: String,
    pub reporter_name: Option<String>,
    pub reported_user_id: String,
    pub reported_user_name: Option<String>,
    pub report_type: ReportType,
    pub details: String,
    pub damage_percentage: Option<f64>,
    pub related_rental_id: Option<String>,
    pub related_delivery_id: Option<String>,
    pub status: ReportStatus,
    pub claimed_by: Option<String>,
    pub lock_expires_at: Option<String>,
    pub escalated_from_id: Option<String>,
    pub submitted_at: String,
}

impl ReportResponse {
    fn from_model(report: report::Model, users: &HashMap<String, user::Model>) -> Self {
        Self {
            reporter_name: users.get(&report.reporter_id).map(user::Model::display_name),
            reported_user_name: users
                .get(&report.reported_user_id)
                .map(user::Model::display_name),
            id: report.id,
            reporter_id: report.reporter_id,
            reported_user_id: report.reported_user_id,
            report_type: report.report_type,
            details: report.details,
            damage_percentage: report.damage_percentage,
            related_rental_id: report.related_rental_id,
            related_delivery_id: report.related_delivery_id,
            status: report.status,
            claimed_by: report.claimed_by,
            lock_expires_at: report.lock_expires_at.map(|t| t.to_rfc3339()),
            escalated_from_id: report.escalated_from_id,
            submitted_at: report.submitted_at.to_rfc3339(),
        }
    }
}

/// User profile embedded in the report detail.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub activity_status: user::ActivityStatus,
}

impl From<&user::Model> for UserSummary {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id.clone(),
            name: u.display_name(),
            email: u.email.clone(),
            activity_status: u.activity_status,
        }
    }
}

/// Full report detail for moderators.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetailResponse {
    #[serde(flatten)]
    pub report: ReportResponse,
    pub reporter: Option<UserSummary>,
    pub reported_user: Option<UserSummary>,
    pub claimed_at: Option<String>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<String>,
    pub resolution_notes: Option<String>,
}

/// Lock refresh response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub lock_expires_at: String,
}

// ==================== Role checks ====================

fn require_moderator(user: &user::Model) -> AppResult<()> {
    if user.is_moderator {
        Ok(())
    } else {
        Err(AppError::Forbidden("Moderator role required".to_string()))
    }
}

fn require_delivery_agent(user: &user::Model) -> AppResult<()> {
    if user.is_delivery_agent {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Delivery agent role required".to_string(),
        ))
    }
}

// ==================== Handlers ====================

fn to_paginated(page_data: ReportPage, page: u64, limit: u64) -> PaginatedResponse<ReportResponse> {
    let items = page_data
        .reports
        .into_iter()
        .map(|r| ReportResponse::from_model(r, &page_data.users))
        .collect();
    PaginatedResponse::new(items, page, limit, page_data.total)
}

async fn create_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<ReportResponse>)> {
    require_delivery_agent(&user)?;
    req.validate()?;

    let report = state
        .report_service
        .create_report(CreateReportInput {
            report_type: req.report_type,
            details: req.details,
            damage_percentage: req.damage_percentage,
            rental_id: req.rental_id,
            delivery_id: req.delivery_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReportResponse::from_model(report, &HashMap::new())),
    ))
}

async fn list_submitted(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<ReportResponse>>> {
    let (page, limit, offset) = query.window();
    let page_data = state.report_service.submitted_by(&user.id, limit, offset).await?;
    Ok(Json(to_paginated(page_data, page, limit)))
}

async fn list_received(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<ReportResponse>>> {
    let (page, limit, offset) = query.window();
    let page_data = state.report_service.received_by(&user.id, limit, offset).await?;
    Ok(Json(to_paginated(page_data, page, limit)))
}

async fn list_all(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<ReportResponse>>> {
    require_moderator(&user)?;

    let (page, limit, offset) = query.window();
    let page_data = state
        .report_service
        .list(query.status, query.report_type, limit, offset)
        .await?;
    Ok(Json(to_paginated(page_data, page, limit)))
}

async fn list_available(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<ReportResponse>>> {
    require_moderator(&user)?;

    let (page, limit, offset) = query.window();
    let page_data = state
        .report_service
        .available(query.report_type, limit, offset)
        .await?;
    Ok(Json(to_paginated(page_data, page, limit)))
}

async fn get_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReportDetailResponse>> {
    require_moderator(&user)?;

    let (report, users) = state.report_service.get_report_with_users(&id).await?;

    let reporter = users.get(&report.reporter_id).map(UserSummary::from);
    let reported_user = users.get(&report.reported_user_id).map(UserSummary::from);
    let claimed_at = report.claimed_at.map(|t| t.to_rfc3339());
    let resolved_by = report.resolved_by.clone();
    let resolved_at = report.resolved_at.map(|t| t.to_rfc3339());
    let resolution_notes = report.resolution_notes.clone();

    Ok(Json(ReportDetailResponse {
        report: ReportResponse::from_model(report, &users),
        reporter,
        reported_user,
        claimed_at,
        resolved_by,
        resolved_at,
        resolution_notes,
    }))
}

async fn claim_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    require_moderator(&user)?;

    state.report_service.claim(&id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn release_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    require_moderator(&user)?;

    state.report_service.release(&id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh_lock(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LockResponse>> {
    require_moderator(&user)?;

    let expires_at = state.report_service.refresh_lock(&id, &user.id).await?;
    Ok(Json(LockResponse {
        lock_expires_at: expires_at.to_rfc3339(),
    }))
}

async fn resolve_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<StatusCode> {
    require_moderator(&user)?;

    let notes = body.and_then(|Json(req)| req.notes);
    state
        .report_service
        .resolve(&id, &user.id, ResolveOutcome::Resolved, notes)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dismiss_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<StatusCode> {
    require_moderator(&user)?;

    let notes = body.and_then(|Json(req)| req.notes);
    state
        .report_service
        .resolve(&id, &user.id, ResolveOutcome::Dismissed, notes)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_report).get(list_all))
        .route("/submitted", get(list_submitted))
        .route("/received", get(list_received))
        .route("/available", get(list_available))
        .route("/{id}", get(get_report))
        .route("/{id}/claim", post(claim_report))
        .route("/{id}/release", post(release_report))
        .route("/{id}/refresh-lock", post(refresh_lock))
        .route("/{id}/resolve", post(resolve_report))
        .route("/{id}/dismiss", post(dismiss_report))
}
