use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::reminders::{Reminder, ReminderBook, ReminderDraft};
use crate::server::error::{ApiError, ApiErrorResponse};
use crate::server::ServerState;

impl ServerState {
    /// Applies `change` to a copy of the book and keeps it only once it is
    /// saved.
    async fn change_reminders<T>(
        &self,
        change: impl FnOnce(&mut ReminderBook) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let mut book = self.reminders.lock().await;
        let mut next = book.clone();
        let outcome = change(&mut next)?;
        next.save(self.storage.as_ref()).await?;
        *book = next;
        Ok(outcome)
    }
}

#[utoipa::path(
    get,
    path = "/reminders",
    tag = "reminders",
    responses(
        (status = 200, description = "All reminders", body = [Reminder]),
    )
)]
pub(crate) async fn list_reminders(State(state): State<Arc<ServerState>>) -> Json<Vec<Reminder>> {
    Json(state.reminders.lock().await.reminders().to_vec())
}

#[utoipa::path(
    post,
    path = "/reminders",
    tag = "reminders",
    request_body = ReminderDraft,
    responses(
        (status = 200, description = "Reminder created", body = Reminder),
        (status = 400, body = ApiErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn create_reminder(
    State(state): State<Arc<ServerState>>,
    Json(draft): Json<ReminderDraft>,
) -> Result<Json<Reminder>, ApiError> {
    let today = Utc::now().date_naive();
    let reminder = state
        .change_reminders(|book| book.add(draft, today).cloned())
        .await?;
    tracing::info!(id = %reminder.id, next_date = %reminder.next_date, "reminder created");
    Ok(Json(reminder))
}

#[utoipa::path(
    put,
    path = "/reminders/{id}",
    tag = "reminders",
    params(("id" = Uuid, Path, description = "Reminder id")),
    request_body = ReminderDraft,
    responses(
        (status = 200, description = "Reminder replaced", body = Reminder),
        (status = 400, body = ApiErrorResponse),
        (status = 404, body = ApiErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn update_reminder(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(draft): Json<ReminderDraft>,
) -> Result<Json<Reminder>, ApiError> {
    let today = Utc::now().date_naive();
    let reminder = state
        .change_reminders(|book| book.update(id, draft, today).cloned())
        .await?;
    Ok(Json(reminder))
}

#[utoipa::path(
    delete,
    path = "/reminders/{id}",
    tag = "reminders",
    params(("id" = Uuid, Path, description = "Reminder id")),
    responses(
        (status = 204, description = "Reminder deleted"),
        (status = 404, body = ApiErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn delete_reminder(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.change_reminders(|book| book.remove(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
