use sqlx::PgPool;

use crate::{error::Result, models::Payment};

pub async fn create_pending(
    pool: &PgPool,
    payment_intent_id: &str,
    course_id: i32,
    user_id: Option<i32>,
    email: &str,
    amount: i32,
    currency: &str,
) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (payment_intent_id, course_id, user_id, email, amount, currency)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(payment_intent_id)
    .bind(course_id)
    .bind(user_id)
    .bind(email)
    .bind(amount)
    .bind(currency)
    .fetch_one(pool)
    .await?;

    Ok(payment)
}

/// Webhook settlement. Only pending rows move, so replayed events are no-ops.
pub async fn resolve(
    pool: &PgPool,
    payment_intent_id: &str,
    status: &str,
) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        "UPDATE payments
         SET status = $2, updated_at = NOW()
         WHERE payment_intent_id = $1 AND status = 'pending'
         RETURNING *",
    )
    .bind(payment_intent_id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}
