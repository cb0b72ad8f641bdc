use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::{
    demo::{mask::mask_appointment, DEMO_USER_ID},
    error::{AppError, Result},
    models::{
        Appointment, AppointmentResponse, AppointmentStatus, CheckSlotQuery,
        CreateAppointmentRequest, DateQuery, DaySlot, DeleteAppointmentQuery, NewAppointment,
        UpdateAppointmentRequest,
    },
    queries::{appointment_queries, service_queries, working_hours_queries},
    services::{
        availability,
        email_service::{self, AppointmentEmail},
    },
    utils::{
        extractors::{extract_user_id, OptionalClaims},
        jwt::Claims,
    },
    AppState,
};

const RECENT_LIMIT: i64 = 10;

/// Role-scoped list: admins see everything not soft-deleted, clients see
/// their own bookings.
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AppointmentResponse>>> {
    if claims.is_demo {
        let real = appointment_queries::list_all_for_admin(&state.db).await?;
        let merged = state.demo.merge_appointments(real);
        return Ok(Json(merged.into_iter().map(mask_appointment).collect()));
    }

    if claims.is_admin {
        return Ok(Json(appointment_queries::list_all_for_admin(&state.db).await?));
    }

    let user_id = extract_user_id(&claims)?;
    Ok(Json(
        appointment_queries::list_for_user(&state.db, user_id).await?,
    ))
}

/// The owner's own history, including rows an admin has soft-deleted.
pub async fn list_user_appointments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AppointmentResponse>>> {
    if claims.is_demo {
        let merged = state.demo.merge_appointments(Vec::new());
        return Ok(Json(merged.into_iter().map(mask_appointment).collect()));
    }

    let user_id = extract_user_id(&claims)?;
    Ok(Json(
        appointment_queries::list_for_user(&state.db, user_id).await?,
    ))
}

pub async fn list_recent_appointments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AppointmentResponse>>> {
    let recent = appointment_queries::list_recent(&state.db, RECENT_LIMIT).await?;

    if claims.is_demo {
        let merged = state.demo.merge_appointments(recent);
        return Ok(Json(merged.into_iter().map(mask_appointment).collect()));
    }

    Ok(Json(recent))
}

/// Occupied slots for one day, for the booking page. Public and PII-free.
pub async fn list_by_date(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<DaySlot>>> {
    let date = parse_date(&query.date)?;
    let slots = appointment_queries::list_by_date(&state.db, date).await?;

    let slots = match &claims {
        Some(claims) if claims.is_demo => state.demo.merge_day_slots(slots, date),
        _ => slots,
    };

    Ok(Json(slots))
}

/// Dry-run bookability answer for the booking form. The same rule runs again
/// inside the create transaction, so a stale yes here cannot double-book.
pub async fn check_slot_availability(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Query(query): Query<CheckSlotQuery>,
) -> Result<Json<serde_json::Value>> {
    let service = service_queries::find_by_id(&state.db, query.service_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    let date = query.date_time.date_naive();
    let hours = working_hours_queries::find_by_date(&state.db, date).await?;
    let real = appointment_queries::busy_slots_for_date(&state.db, date).await?;

    let slots = match &claims {
        Some(claims) if claims.is_demo => state.demo.adjust_busy_slots(real, date),
        _ => real.into_iter().map(|(_, slot)| slot).collect(),
    };

    match availability::check_slot(
        Utc::now(),
        query.date_time,
        service.duration,
        hours.as_ref(),
        &slots,
    ) {
        Ok(()) => Ok(Json(json!({ "available": true }))),
        Err(reason) => Ok(Json(json!({ "available": false, "reason": reason.as_code() }))),
    }
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    if claims.is_demo {
        return create_demo_appointment(&state, &claims, payload).await;
    }

    let user_id = extract_user_id(&claims)?;
    let service = service_queries::find_by_id(&state.db, payload.service_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    if !service.is_active {
        return Err(AppError::BadRequest("Service is not available".to_string()));
    }

    // Admin entries with client details are walk-ins: no linked account,
    // trusted status. Everyone else books as themselves, pending.
    let is_walk_in = claims.is_admin && payload.client_name.is_some();
    let new = NewAppointment {
        user_id: if is_walk_in { None } else { Some(user_id) },
        service_id: service.id,
        appointment_date: payload.appointment_date,
        is_online: payload.is_online.unwrap_or(false),
        status: initial_status(is_walk_in, payload.status),
        notes: payload.notes,
        messenger_type: payload.messenger_type,
        messenger_contact: payload.messenger_contact,
        client_name: if is_walk_in { payload.client_name } else { None },
        client_phone: if is_walk_in { payload.client_phone } else { None },
        client_email: if is_walk_in { payload.client_email } else { None },
    };

    let appointment =
        appointment_queries::create_checked(&state.db, Utc::now(), service.duration, &new).await?;

    send_booking_notifications(&state, &claims, &new, &service.name, &appointment, is_walk_in)
        .await;

    let response = appointment_queries::find_response_by_id(&state.db, appointment.id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError("Appointment missing right after insert".to_string())
        })?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>> {
    if claims.is_demo {
        return update_demo_appointment(&state, id, payload).await;
    }

    let appointment = appointment_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    // Clients touch only their own rows and may change notes or cancel;
    // every other transition is the admin's call.
    if !claims.is_admin {
        let user_id = extract_user_id(&claims)?;
        if appointment.user_id != Some(user_id) {
            return Err(AppError::Forbidden(
                "You can only update your own appointments".to_string(),
            ));
        }
        if let Some(next) = payload.status {
            if next != AppointmentStatus::Cancelled {
                return Err(AppError::Forbidden(
                    "Only cancellation is allowed here".to_string(),
                ));
            }
        }
    }

    match payload.status {
        Some(next) => {
            if !appointment.status.can_transition_to(next) {
                return Err(AppError::InvalidTransition {
                    from: appointment.status,
                    to: next,
                });
            }
            // The write is guarded on the status the check ran against, so a
            // concurrent change cannot slip an unvalidated transition through.
            appointment_queries::transition(
                &state.db,
                id,
                appointment.status,
                next,
                payload.notes.as_deref(),
            )
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Appointment was updated concurrently".to_string())
            })?;
        }
        None => {
            appointment_queries::update_notes(&state.db, id, payload.notes.as_deref())
                .await?
                .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
        }
    }

    let response = appointment_queries::find_response_by_id(&state.db, id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError("Appointment missing right after update".to_string())
        })?;

    // Walk-ins have no linked account and get no confirmation email.
    if payload.status == Some(AppointmentStatus::Confirmed) {
        if let Some(recipient) = response.user_email.clone() {
            let client_name = response
                .user_first_name
                .clone()
                .unwrap_or_else(|| "Client".to_string());
            let service_label = email_service::display_name(response.service_name.as_ref());
            let mail = AppointmentEmail {
                client_name: &client_name,
                service_name: &service_label,
                appointment_date: response.appointment.appointment_date,
            };
            if let Err(e) = email_service::send_appointment_confirmed(
                &state.ses_client,
                &recipient,
                &mail,
                &state.sender_email,
            )
            .await
            {
                tracing::warn!("Failed to send confirmation email: {}", e);
            }
        }
    }

    Ok(Json(response))
}

/// Admin-only. Soft by default; `?hard=true` removes the row for good.
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteAppointmentQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode> {
    if !claims.is_admin && !claims.is_demo {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    if claims.is_demo {
        let known = state.demo.appointment(id).is_some()
            || appointment_queries::find_by_id(&state.db, id).await?.is_some();
        if !known || state.demo.is_appointment_deleted(id) {
            return Err(AppError::NotFound("Appointment not found".to_string()));
        }
        state.demo.delete_appointment(id);
        return Ok(StatusCode::NO_CONTENT);
    }

    let removed = if params.hard.unwrap_or(false) {
        appointment_queries::hard_delete(&state.db, id).await?
    } else {
        appointment_queries::soft_delete(&state.db, id).await?
    };

    if !removed {
        return Err(AppError::NotFound("Appointment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Booking emails are best effort: a failed send is logged and the booking
/// stands.
async fn send_booking_notifications(
    state: &AppState,
    claims: &Claims,
    new: &NewAppointment,
    service_name: &serde_json::Value,
    appointment: &Appointment,
    is_walk_in: bool,
) {
    let client_name = if is_walk_in {
        new.client_name.clone().unwrap_or_else(|| "Client".to_string())
    } else {
        claims.name.clone()
    };
    let recipient = if is_walk_in {
        new.client_email.clone()
    } else {
        Some(claims.email.clone())
    };
    let contact = if is_walk_in {
        new.client_phone
            .clone()
            .or_else(|| new.client_email.clone())
            .unwrap_or_else(|| "-".to_string())
    } else {
        claims.email.clone()
    };

    let service_label = email_service::display_name(Some(service_name));
    let mail = AppointmentEmail {
        client_name: &client_name,
        service_name: &service_label,
        appointment_date: appointment.appointment_date,
    };

    if let Some(recipient) = recipient {
        if let Err(e) = email_service::send_appointment_submitted(
            &state.ses_client,
            &recipient,
            &mail,
            &state.sender_email,
        )
        .await
        {
            tracing::warn!("Failed to send booking email to client: {}", e);
        }
    }

    if let Err(e) = email_service::send_admin_notice(
        &state.ses_client,
        &state.admin_email,
        &mail,
        &contact,
        &state.sender_email,
    )
    .await
    {
        tracing::warn!("Failed to send admin notification email: {}", e);
    }
}

/// Demo bookings go through the exact same availability rule, against the
/// demo-adjusted view of the day, then land in the in-memory store.
async fn create_demo_appointment(
    state: &AppState,
    claims: &Claims,
    payload: CreateAppointmentRequest,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    let service = service_queries::find_by_id(&state.db, payload.service_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    if !service.is_active {
        return Err(AppError::BadRequest("Service is not available".to_string()));
    }

    let date = payload.appointment_date.date_naive();
    let hours = working_hours_queries::find_by_date(&state.db, date).await?;
    let real = appointment_queries::busy_slots_for_date(&state.db, date).await?;
    let slots = state.demo.adjust_busy_slots(real, date);

    availability::check_slot(
        Utc::now(),
        payload.appointment_date,
        service.duration,
        hours.as_ref(),
        &slots,
    )
    .map_err(AppError::SlotUnavailable)?;

    // The demo token acts as admin, so client details mark a walk-in here
    // exactly as they do on the real path.
    let is_walk_in = payload.client_name.is_some();
    let id = state.demo.allocate_id();
    let response = AppointmentResponse {
        appointment: Appointment {
            id,
            user_id: if is_walk_in { None } else { Some(DEMO_USER_ID) },
            service_id: service.id,
            appointment_date: availability::truncate_to_minute(payload.appointment_date),
            is_online: payload.is_online.unwrap_or(false),
            status: initial_status(is_walk_in, payload.status),
            notes: payload.notes,
            messenger_type: payload.messenger_type,
            messenger_contact: payload.messenger_contact,
            is_deleted_from_admin: false,
            client_name: payload.client_name,
            client_phone: if is_walk_in { payload.client_phone } else { None },
            client_email: if is_walk_in { payload.client_email } else { None },
            created_at: Utc::now(),
        },
        service_name: Some(service.name),
        service_duration: Some(service.duration),
        user_first_name: if is_walk_in { None } else { Some("Demo".to_string()) },
        user_last_name: if is_walk_in { None } else { Some("Admin".to_string()) },
        user_email: if is_walk_in {
            None
        } else {
            Some(claims.email.clone())
        },
    };

    state.demo.insert_appointment(response.clone());

    Ok((StatusCode::CREATED, Json(mask_appointment(response))))
}

async fn update_demo_appointment(
    state: &AppState,
    id: i32,
    payload: UpdateAppointmentRequest,
) -> Result<Json<AppointmentResponse>> {
    let current = match state.demo.appointment(id) {
        Some(synthetic) => synthetic,
        None => {
            if state.demo.is_appointment_deleted(id) {
                return Err(AppError::NotFound("Appointment not found".to_string()));
            }
            let mut real = appointment_queries::find_response_by_id(&state.db, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
            if let Some(status) = state.demo.appointment_status_override(id) {
                real.appointment.status = status;
            }
            real
        }
    };

    if let Some(next) = payload.status {
        if !current.appointment.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: current.appointment.status,
                to: next,
            });
        }
        state.demo.override_appointment_status(id, next);
    }

    let mut updated = current;
    if let Some(status) = payload.status {
        updated.appointment.status = status;
    }
    if let Some(notes) = payload.notes {
        updated.appointment.notes = Some(notes);
    }

    Ok(Json(mask_appointment(updated)))
}

/// Walk-ins skip the pending stage unless the admin asks otherwise; client
/// bookings always start pending, whatever the payload carries.
fn initial_status(is_walk_in: bool, requested: Option<AppointmentStatus>) -> AppointmentStatus {
    if is_walk_in {
        requested.unwrap_or(AppointmentStatus::Confirmed)
    } else {
        AppointmentStatus::Pending
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date format, expected YYYY-MM-DD".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_in_status_defaults_to_confirmed() {
        assert_eq!(initial_status(true, None), AppointmentStatus::Confirmed);
        assert_eq!(
            initial_status(true, Some(AppointmentStatus::Completed)),
            AppointmentStatus::Completed
        );
    }

    #[test]
    fn test_client_bookings_always_start_pending() {
        assert_eq!(initial_status(false, None), AppointmentStatus::Pending);
        assert_eq!(
            initial_status(false, Some(AppointmentStatus::Confirmed)),
            AppointmentStatus::Pending
        );
    }
}
