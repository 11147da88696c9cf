use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{
    AddMemberRequest, AddedMember, MemberListResponse, RenewRequest, UpdatePlanRequest,
    WriteOutcome,
};
use super::services;
use crate::{auth::AuthUser, error::MemberError, reminders, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/members", get(list_members).post(add_member))
}

pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/members/:name", delete(delete_member))
        .route("/members/:name/plan", put(update_plan))
        .route("/members/:name/expiry", put(renew_member))
}

/// The member table. Rendering it runs one reminder pass over the same snapshot.
#[instrument(skip_all, fields(by = %caller.identity))]
pub async fn list_members(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<MemberListResponse>, MemberError> {
    let mut members = services::list_members(&state).await?;
    let report = reminders::services::run_pass(&state, &mut members).await?;
    Ok(Json(MemberListResponse {
        today: state.clock.today(),
        members,
        reminders: report,
    }))
}

#[instrument(skip_all, fields(by = %caller.identity))]
pub async fn add_member(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<AddedMember>), MemberError> {
    let added = services::add_member(&state, body, &caller).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

#[instrument(skip(state, caller))]
pub async fn delete_member(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(name): Path<String>,
) -> Result<Json<WriteOutcome>, MemberError> {
    services::delete_member(&state, &name, &caller).await.map(Json)
}

#[instrument(skip(state, caller, body))]
pub async fn update_plan(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(name): Path<String>,
    Json(body): Json<UpdatePlanRequest>,
) -> Result<Json<WriteOutcome>, MemberError> {
    services::update_plan(&state, &name, &body.plan, &caller)
        .await
        .map(Json)
}

#[instrument(skip(state, caller, body))]
pub async fn renew_member(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(name): Path<String>,
    Json(body): Json<RenewRequest>,
) -> Result<Json<WriteOutcome>, MemberError> {
    services::renew_member(&state, &name, body.expiry_date, &caller)
        .await
        .map(Json)
}
