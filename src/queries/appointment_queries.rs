use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{
        Appointment, AppointmentResponse, AppointmentStatus, DaySlot, NewAppointment,
    },
    queries::working_hours_queries,
    services::availability::{check_slot, day_bounds, truncate_to_minute, BusySlot},
};

// Namespaces booking locks away from any other advisory locks this database
// might carry.
const BOOKING_LOCK_CLASS: i32 = 1;

const RESPONSE_COLUMNS: &str = "a.*,
    s.name AS service_name,
    s.duration AS service_duration,
    u.first_name AS user_first_name,
    u.last_name AS user_last_name,
    u.email AS user_email";

#[derive(sqlx::FromRow)]
struct BusyRow {
    id: i32,
    appointment_date: DateTime<Utc>,
    service_duration: Option<i32>,
    status: AppointmentStatus,
    is_deleted_from_admin: bool,
}

/// Every appointment on one calendar date, in the shape the conflict checker
/// consumes, keyed by id so demo state can be layered on top. The day is the
/// UTC day, bound as a timestamptz range so the session timezone cannot
/// shift membership.
pub async fn busy_slots_for_date(
    executor: impl sqlx::PgExecutor<'_>,
    date: NaiveDate,
) -> Result<Vec<(i32, BusySlot)>> {
    let (day_start, day_end) = day_bounds(date);
    let rows = sqlx::query_as::<_, BusyRow>(
        "SELECT a.id, a.appointment_date, s.duration AS service_duration,
                a.status, a.is_deleted_from_admin
         FROM appointments a
         LEFT JOIN services s ON s.id = a.service_id
         WHERE a.appointment_date >= $1 AND a.appointment_date < $2",
    )
    .bind(day_start)
    .bind(day_end)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.id,
                BusySlot {
                    starts_at: row.appointment_date,
                    duration_minutes: row.service_duration.unwrap_or(0),
                    status: row.status,
                    is_deleted_from_admin: row.is_deleted_from_admin,
                },
            )
        })
        .collect())
}

/// Insert a booking if the slot is still free at write time.
///
/// Availability is re-checked inside a transaction holding a per-date
/// advisory lock, so two clients racing for the same slot serialize and the
/// loser gets SLOT_TAKEN instead of a double booking. The lock is released
/// with the transaction.
pub async fn create_checked(
    pool: &PgPool,
    now: DateTime<Utc>,
    duration_minutes: i32,
    new: &NewAppointment,
) -> Result<Appointment> {
    let date = new.appointment_date.date_naive();
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
        .bind(BOOKING_LOCK_CLASS)
        .bind(date.to_string())
        .execute(&mut *tx)
        .await?;

    let hours = working_hours_queries::find_by_date(&mut *tx, date).await?;
    let existing = busy_slots_for_date(&mut *tx, date).await?;
    let slots: Vec<BusySlot> = existing.into_iter().map(|(_, slot)| slot).collect();

    check_slot(
        now,
        new.appointment_date,
        duration_minutes,
        hours.as_ref(),
        &slots,
    )
    .map_err(AppError::SlotUnavailable)?;

    let appointment = sqlx::query_as::<_, Appointment>(
        "INSERT INTO appointments
             (user_id, service_id, appointment_date, is_online, status, notes,
              messenger_type, messenger_contact, client_name, client_phone, client_email)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING *",
    )
    .bind(new.user_id)
    .bind(new.service_id)
    .bind(truncate_to_minute(new.appointment_date))
    .bind(new.is_online)
    .bind(new.status)
    .bind(new.notes.as_deref())
    .bind(new.messenger_type.as_deref())
    .bind(new.messenger_contact.as_deref())
    .bind(new.client_name.as_deref())
    .bind(new.client_phone.as_deref())
    .bind(new.client_email.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(appointment)
}

/// Admin list view. Soft-deleted rows stay out of it.
pub async fn list_all_for_admin(pool: &PgPool) -> Result<Vec<AppointmentResponse>> {
    let appointments = sqlx::query_as::<_, AppointmentResponse>(&format!(
        "SELECT {RESPONSE_COLUMNS}
         FROM appointments a
         LEFT JOIN services s ON s.id = a.service_id
         LEFT JOIN users u ON u.id = a.user_id
         WHERE a.is_deleted_from_admin = FALSE
         ORDER BY a.appointment_date DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<AppointmentResponse>> {
    let appointments = sqlx::query_as::<_, AppointmentResponse>(&format!(
        "SELECT {RESPONSE_COLUMNS}
         FROM appointments a
         LEFT JOIN services s ON s.id = a.service_id
         LEFT JOIN users u ON u.id = a.user_id
         WHERE a.is_deleted_from_admin = FALSE
         ORDER BY a.created_at DESC
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// The owner's own list. Rows hidden from the admin view stay visible here.
pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<AppointmentResponse>> {
    let appointments = sqlx::query_as::<_, AppointmentResponse>(&format!(
        "SELECT {RESPONSE_COLUMNS}
         FROM appointments a
         LEFT JOIN services s ON s.id = a.service_id
         LEFT JOIN users u ON u.id = a.user_id
         WHERE a.user_id = $1
         ORDER BY a.appointment_date DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Occupied slots for the booking page. No client identity leaves this query.
pub async fn list_by_date(pool: &PgPool, date: NaiveDate) -> Result<Vec<DaySlot>> {
    let (day_start, day_end) = day_bounds(date);
    let slots = sqlx::query_as::<_, DaySlot>(
        "SELECT a.id, a.service_id, a.appointment_date,
                COALESCE(s.duration, 0) AS service_duration, a.status
         FROM appointments a
         LEFT JOIN services s ON s.id = a.service_id
         WHERE a.appointment_date >= $1 AND a.appointment_date < $2
           AND a.is_deleted_from_admin = FALSE
         ORDER BY a.appointment_date",
    )
    .bind(day_start)
    .bind(day_end)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Appointment>> {
    let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(appointment)
}

pub async fn find_response_by_id(
    pool: &PgPool,
    id: i32,
) -> Result<Option<AppointmentResponse>> {
    let appointment = sqlx::query_as::<_, AppointmentResponse>(&format!(
        "SELECT {RESPONSE_COLUMNS}
         FROM appointments a
         LEFT JOIN services s ON s.id = a.service_id
         LEFT JOIN users u ON u.id = a.user_id
         WHERE a.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn update_notes(pool: &PgPool, id: i32, notes: Option<&str>) -> Result<Option<Appointment>> {
    let appointment = sqlx::query_as::<_, Appointment>(
        "UPDATE appointments SET notes = COALESCE($2, notes) WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(notes)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Applies a validated status change only while the row still carries the
/// status it was validated against; a concurrent change makes this a no-op
/// and the caller answers with a conflict.
pub async fn transition(
    pool: &PgPool,
    id: i32,
    from: AppointmentStatus,
    to: AppointmentStatus,
    notes: Option<&str>,
) -> Result<Option<Appointment>> {
    let appointment = sqlx::query_as::<_, Appointment>(
        "UPDATE appointments
         SET status = $3, notes = COALESCE($4, notes)
         WHERE id = $1 AND status = $2
         RETURNING *",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(notes)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Hides the row from admin views; the owning client keeps seeing it.
pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE appointments SET is_deleted_from_admin = TRUE WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn hard_delete(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
