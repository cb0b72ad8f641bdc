use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{error::Result, models::WorkingHours};

/// No row for a date means the day is unrestricted.
pub async fn find_by_date(
    executor: impl sqlx::PgExecutor<'_>,
    date: NaiveDate,
) -> Result<Option<WorkingHours>> {
    let hours = sqlx::query_as::<_, WorkingHours>("SELECT * FROM working_hours WHERE date = $1")
        .bind(date)
        .fetch_optional(executor)
        .await?;

    Ok(hours)
}

/// One row per date, enforced by the unique constraint; repeating the call
/// with the same values is a no-op update.
pub async fn upsert(
    pool: &PgPool,
    date: NaiveDate,
    start_time: &str,
    end_time: &str,
) -> Result<WorkingHours> {
    let hours = sqlx::query_as::<_, WorkingHours>(
        "INSERT INTO working_hours (date, start_time, end_time)
         VALUES ($1, $2, $3)
         ON CONFLICT (date) DO UPDATE
         SET start_time = EXCLUDED.start_time,
             end_time = EXCLUDED.end_time,
             updated_at = NOW()
         RETURNING *",
    )
    .bind(date)
    .bind(start_time)
    .bind(end_time)
    .fetch_one(pool)
    .await?;

    Ok(hours)
}
