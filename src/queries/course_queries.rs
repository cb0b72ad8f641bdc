use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Course, CourseRequest},
};

pub async fn list_active(pool: &PgPool) -> Result<Vec<Course>> {
    let courses =
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE is_active = TRUE ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(courses)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Course>> {
    let courses = sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(courses)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Course>> {
    let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(course)
}

pub async fn create(
    pool: &PgPool,
    name: &serde_json::Value,
    description: &serde_json::Value,
    price: i32,
    duration: i32,
    category: Option<&str>,
    image_url: Option<&str>,
    document_url: Option<&str>,
) -> Result<Course> {
    let course = sqlx::query_as::<_, Course>(
        "INSERT INTO courses (name, description, price, duration, category, image_url, document_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(duration)
    .bind(category)
    .bind(image_url)
    .bind(document_url)
    .fetch_one(pool)
    .await?;

    Ok(course)
}

pub async fn update(pool: &PgPool, id: i32, req: &CourseRequest) -> Result<Option<Course>> {
    let course = sqlx::query_as::<_, Course>(
        "UPDATE courses
         SET name = COALESCE($2, name),
             description = COALESCE($3, description),
             price = COALESCE($4, price),
             duration = COALESCE($5, duration),
             category = COALESCE($6, category),
             image_url = COALESCE($7, image_url),
             document_url = COALESCE($8, document_url),
             is_active = COALESCE($9, is_active),
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
    .bind(req.image_url.as_deref())
    .bind(req.document_url.as_deref())
    .bind(req.is_active)
    .fetch_optional(pool)
    .await?;

    Ok(course)
}

pub async fn deactivate(pool: &PgPool, id: i32) -> Result<bool> {
    let result =
        sqlx::query("UPDATE courses SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
