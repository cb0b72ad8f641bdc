use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, Result},
    models::{DateQuery, UpsertWorkingHoursRequest, WorkingHours},
    queries::working_hours_queries,
    services::availability,
    utils::extractors::AdminClaims,
    AppState,
};

/// Returns null for unrestricted days so the booking page can tell "no
/// limits" apart from "closed for part of the day".
pub async fn get_working_hours(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Option<WorkingHours>>> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date format, expected YYYY-MM-DD".to_string()))?;

    let hours = working_hours_queries::find_by_date(&state.db, date).await?;

    Ok(Json(hours))
}

pub async fn upsert_working_hours(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Json(payload): Json<UpsertWorkingHoursRequest>,
) -> Result<Json<WorkingHours>> {
    let start = availability::parse_hhmm(&payload.start_time)
        .ok_or_else(|| AppError::BadRequest("start_time must be HH:mm".to_string()))?;
    let end = availability::parse_hhmm(&payload.end_time)
        .ok_or_else(|| AppError::BadRequest("end_time must be HH:mm".to_string()))?;

    if start > end {
        return Err(AppError::BadRequest(
            "start_time must not be after end_time".to_string(),
        ));
    }

    if claims.is_demo {
        let now = Utc::now();
        return Ok(Json(WorkingHours {
            id: state.demo.allocate_id(),
            date: payload.date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            created_at: now,
            updated_at: now,
        }));
    }

    let hours = working_hours_queries::upsert(
        &state.db,
        payload.date,
        &payload.start_time,
        &payload.end_time,
    )
    .await?;

    Ok(Json(hours))
}
