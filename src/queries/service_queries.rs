use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Service, ServiceRequest},
};

pub async fn list_active(pool: &PgPool) -> Result<Vec<Service>> {
    let services = sqlx::query_as::<_, Service>(
        "SELECT * FROM services WHERE is_active = TRUE ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Service>> {
    let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(services)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Service>> {
    let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(service)
}

pub async fn create(
    pool: &PgPool,
    name: &serde_json::Value,
    description: &serde_json::Value,
    price: i32,
    duration: i32,
    category: Option<&str>,
) -> Result<Service> {
    let service = sqlx::query_as::<_, Service>(
        "INSERT INTO services (name, description, price, duration, category)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(duration)
    .bind(category)
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn update(pool: &PgPool, id: i32, req: &ServiceRequest) -> Result<Option<Service>> {
    let service = sqlx::query_as::<_, Service>(
        "UPDATE services
         SET name = COALESCE($2, name),
             description = COALESCE($3, description),
             price = COALESCE($4, price),
             duration = COALESCE($5, duration),
             category = COALESCE($6, category),
             is_active = COALESCE($7, is_active),
             updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(req.name.as_ref())
    .bind(req.description.as_ref())
    .bind(req.price)
    .bind(req.duration)
    .bind(req.category.as_deref())
    .bind(req.is_active)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

/// Delete is a soft deactivate; appointments keep their service reference.
pub async fn deactivate(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE services SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
