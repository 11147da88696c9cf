use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::{services::run_reminders, ReminderReport};
use crate::{auth::AuthUser, error::MemberError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/reminders/run", post(run))
}

#[instrument(skip_all, fields(by = %caller.identity))]
pub async fn run(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<ReminderReport>, MemberError> {
    run_reminders(&state).await.map(Json)
}
