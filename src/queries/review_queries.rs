use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Review, ReviewStatus},
};

pub async fn list_approved(pool: &PgPool) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE status = 'approved' ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(reviews)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(review)
}

pub async fn create(
    pool: &PgPool,
    user_id: Option<i32>,
    service_id: Option<i32>,
    name: Option<&str>,
    rating: i32,
    comment: &str,
) -> Result<Review> {
    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (user_id, service_id, name, rating, comment)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(user_id)
    .bind(service_id)
    .bind(name)
    .bind(rating)
    .bind(comment)
    .fetch_one(pool)
    .await?;

    Ok(review)
}

pub async fn set_status(pool: &PgPool, id: i32, status: ReviewStatus) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(
        "UPDATE reviews SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(review)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
