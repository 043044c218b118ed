//! services/reminders/src/web/rest.rs
//!
//! Contains the Axum handlers for the reminder REST API and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{Local, NaiveDateTime};
use practice_reminders_core::domain::{
    DomainError, Frequency, NewReminder, Owner, Reminder, ReminderType, ReminderUpdate,
};
use practice_reminders_core::format::{format_schedule, format_time};
use practice_reminders_core::ports::PortError;
use practice_reminders_core::stats::ReminderStats;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_reminder_handler,
        list_reminders_handler,
        list_due_reminders_handler,
        reminder_stats_handler,
        get_reminder_handler,
        update_reminder_handler,
        delete_reminder_handler,
        complete_reminder_handler,
    ),
    components(
        schemas(CreateReminderRequest, UpdateReminderRequest, ReminderResponse, StatsResponse)
    ),
    tags(
        (name = "Practice Reminders API", description = "Recurring practice reminders and their schedules.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

fn default_reminder_type() -> String {
    ReminderType::Custom.as_str().to_string()
}

fn default_frequency() -> String {
    Frequency::Daily.as_str().to_string()
}

/// Payload for creating a reminder. Omitted recurrence fields take the
/// defaults for the chosen frequency.
#[derive(Deserialize, ToSchema)]
pub struct CreateReminderRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// One of `exercise`, `technique`, `journey_milestone`, `reflection`, `custom`.
    #[serde(default = "default_reminder_type")]
    pub reminder_type: String,
    /// One of `daily`, `every_other_day`, `twice_weekly`, `weekly`, `custom`.
    #[serde(default = "default_frequency")]
    pub frequency: String,
    /// Hours of the day, 0-23.
    #[serde(default)]
    pub time_preferences: Option<Vec<u8>>,
    /// Weekdays, 0 = Monday .. 6 = Sunday.
    #[serde(default)]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default)]
    pub linked_content_id: Option<String>,
}

/// Partial update payload. Only the fields present are changed.
#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateReminderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reminder_type: Option<String>,
    pub frequency: Option<String>,
    pub time_preferences: Option<Vec<u8>>,
    pub days_of_week: Option<Vec<u8>>,
    pub active: Option<bool>,
    pub linked_content_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ReminderResponse {
    id: Uuid,
    title: String,
    description: String,
    reminder_type: String,
    frequency: String,
    time_preferences: Vec<u8>,
    days_of_week: Vec<u8>,
    active: bool,
    linked_content_id: Option<String>,
    created_at: NaiveDateTime,
    last_notified: Option<NaiveDateTime>,
    next_notification: Option<NaiveDateTime>,
    notification_count: u32,
    streak: u32,
    /// e.g. "Weekdays at 9:00 AM and 5:00 PM"
    schedule_summary: String,
    /// 12-hour labels for `time_preferences`.
    times: Vec<String>,
}

impl From<Reminder> for ReminderResponse {
    fn from(reminder: Reminder) -> Self {
        let schedule_summary = format_schedule(&reminder);
        let times = reminder
            .time_preferences
            .iter()
            .map(|&h| format_time(h))
            .collect();
        Self {
            id: reminder.id,
            title: reminder.title,
            description: reminder.description,
            reminder_type: reminder.reminder_type.as_str().to_string(),
            frequency: reminder.frequency.as_str().to_string(),
            time_preferences: reminder.time_preferences.into_iter().collect(),
            days_of_week: reminder.days_of_week.into_iter().collect(),
            active: reminder.active,
            linked_content_id: reminder.linked_content_id,
            created_at: reminder.created_at,
            last_notified: reminder.last_notified,
            next_notification: reminder.next_notification,
            notification_count: reminder.notification_count,
            streak: reminder.streak,
            schedule_summary,
            times,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    total: usize,
    active: usize,
    due: usize,
    total_notifications: u32,
    longest_streak: u32,
    next_notification: Option<NaiveDateTime>,
}

impl From<ReminderStats> for StatsResponse {
    fn from(stats: ReminderStats) -> Self {
        Self {
            total: stats.total,
            active: stats.active,
            due: stats.due,
            total_notifications: stats.total_notifications,
            longest_streak: stats.longest_streak,
            next_notification: stats.next_notification,
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

type HandlerError = (StatusCode, String);

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn invalid(e: DomainError) -> HandlerError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Maps a port error to a status code. Unexpected errors are logged and their
/// details withheld from the client.
fn port_error_response(action: &str, err: PortError) -> HandlerError {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg),
        e @ PortError::Unexpected(_) => {
            error!("Failed to {}: {:?}", action, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", action),
            )
        }
    }
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, HandlerError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    value.map(|v| v.parse::<T>()).transpose().map_err(invalid)
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new practice reminder for the calling user or session.
#[utoipa::path(
    post,
    path = "/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder created", body = ReminderResponse),
        (status = 400, description = "Invalid reminder fields"),
        (status = 401, description = "Neither x-user-id nor x-session-id was provided"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Option<String>, Header, description = "Signed-in user id."),
        ("x-session-id" = Option<String>, Header, description = "Anonymous session id, used when no user id is sent.")
    )
)]
pub async fn create_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Json(req): Json<CreateReminderRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let new = NewReminder {
        owner,
        title: req.title,
        description: req.description,
        reminder_type: req.reminder_type.parse().map_err(invalid)?,
        frequency: req.frequency.parse().map_err(invalid)?,
        time_preferences: req.time_preferences,
        days_of_week: req.days_of_week,
        linked_content_id: req.linked_content_id,
    };

    let reminder = app_state
        .reminders
        .create(new, local_now())
        .await
        .map_err(|e| port_error_response("create reminder", e))?;

    Ok((StatusCode::CREATED, Json(ReminderResponse::from(reminder))))
}

/// List the caller's reminders, soonest first.
#[utoipa::path(
    get,
    path = "/reminders",
    responses(
        (status = 200, description = "The caller's reminders", body = Vec<ReminderResponse>),
        (status = 401, description = "Neither x-user-id nor x-session-id was provided")
    )
)]
pub async fn list_reminders_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<Vec<ReminderResponse>>, HandlerError> {
    let reminders = app_state
        .reminders
        .list(&owner)
        .await
        .map_err(|e| port_error_response("list reminders", e))?;
    Ok(Json(reminders.into_iter().map(ReminderResponse::from).collect()))
}

/// List the caller's reminders that are due right now.
#[utoipa::path(
    get,
    path = "/reminders/due",
    responses(
        (status = 200, description = "Active reminders scheduled at or before now", body = Vec<ReminderResponse>),
        (status = 401, description = "Neither x-user-id nor x-session-id was provided")
    )
)]
pub async fn list_due_reminders_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<Vec<ReminderResponse>>, HandlerError> {
    let reminders = app_state
        .reminders
        .due(&owner, local_now())
        .await
        .map_err(|e| port_error_response("list due reminders", e))?;
    Ok(Json(reminders.into_iter().map(ReminderResponse::from).collect()))
}

/// Summary counters over the caller's reminders.
#[utoipa::path(
    get,
    path = "/reminders/stats",
    responses(
        (status = 200, description = "Reminder statistics", body = StatsResponse),
        (status = 401, description = "Neither x-user-id nor x-session-id was provided")
    )
)]
pub async fn reminder_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<StatsResponse>, HandlerError> {
    let stats = app_state
        .reminders
        .stats(&owner, local_now())
        .await
        .map_err(|e| port_error_response("load reminder stats", e))?;
    Ok(Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/reminders/{id}",
    params(("id" = Uuid, Path, description = "Reminder id")),
    responses(
        (status = 200, description = "The reminder", body = ReminderResponse),
        (status = 404, description = "No such reminder for this caller")
    )
)]
pub async fn get_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(reminder_id): Path<Uuid>,
) -> Result<Json<ReminderResponse>, HandlerError> {
    let reminder = app_state
        .reminders
        .get(&owner, reminder_id)
        .await
        .map_err(|e| port_error_response("load reminder", e))?;
    Ok(Json(reminder.into()))
}

/// Update a reminder. The next notification is recomputed afterwards.
#[utoipa::path(
    put,
    path = "/reminders/{id}",
    params(("id" = Uuid, Path, description = "Reminder id")),
    request_body = UpdateReminderRequest,
    responses(
        (status = 200, description = "Updated reminder", body = ReminderResponse),
        (status = 400, description = "Invalid reminder fields"),
        (status = 404, description = "No such reminder for this caller")
    )
)]
pub async fn update_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(reminder_id): Path<Uuid>,
    Json(req): Json<UpdateReminderRequest>,
) -> Result<Json<ReminderResponse>, HandlerError> {
    let update = ReminderUpdate {
        title: req.title,
        description: req.description,
        reminder_type: parse_optional(req.reminder_type)?,
        frequency: parse_optional(req.frequency)?,
        time_preferences: req.time_preferences,
        days_of_week: req.days_of_week,
        active: req.active,
        linked_content_id: req.linked_content_id,
    };

    let reminder = app_state
        .reminders
        .update(&owner, reminder_id, update, local_now())
        .await
        .map_err(|e| port_error_response("update reminder", e))?;
    Ok(Json(reminder.into()))
}

#[utoipa::path(
    delete,
    path = "/reminders/{id}",
    params(("id" = Uuid, Path, description = "Reminder id")),
    responses(
        (status = 204, description = "Reminder deleted"),
        (status = 404, description = "No such reminder for this caller")
    )
)]
pub async fn delete_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(reminder_id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .reminders
        .delete(&owner, reminder_id)
        .await
        .map_err(|e| port_error_response("delete reminder", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a practice session as done: bumps the streak and schedules the next reminder.
#[utoipa::path(
    post,
    path = "/reminders/{id}/complete",
    params(("id" = Uuid, Path, description = "Reminder id")),
    responses(
        (status = 200, description = "Reminder after completion", body = ReminderResponse),
        (status = 404, description = "No such reminder for this caller")
    )
)]
pub async fn complete_reminder_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Path(reminder_id): Path<Uuid>,
) -> Result<Json<ReminderResponse>, HandlerError> {
    let reminder = app_state
        .reminders
        .complete(&owner, reminder_id, local_now())
        .await
        .map_err(|e| port_error_response("complete reminder", e))?;
    Ok(Json(reminder.into()))
}
