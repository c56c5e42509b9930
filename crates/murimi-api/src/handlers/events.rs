//! Calendar event HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use murimi_core::{
    CreateEventRequest, Event, EventFilter, EventRepository, EventType, UpdateEventRequest,
};

use crate::{ApiError, AppState};

/// Query parameters for the calendar listing. `from`/`to` bound the
/// `starts_at` range inclusively.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
    pub cluster: Option<String>,
}

impl ListEventsQuery {
    pub fn into_filter(self) -> EventFilter {
        EventFilter {
            from: self.from,
            to: self.to,
            event_type: self.event_type,
            cluster: self.cluster,
        }
    }
}

/// List events within the requested range, soonest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.db.events.list(&query.into_filter()).await?;
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = state.db.events.insert(req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .db
        .events
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event {} not found", id)))?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<StatusCode, ApiError> {
    state.db.events.update(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.db.events.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
