use sqlx::PgPool;

use crate::{
    error::Result,
    models::{AdminUserRequest, UpdateProfileRequest, User},
};

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: Option<&str>,
    phone: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password, first_name, last_name, phone)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(phone)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn create_google_user(
    pool: &PgPool,
    email: &str,
    google_id: &str,
    first_name: &str,
    last_name: Option<&str>,
    profile_image_url: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, google_id, first_name, last_name, profile_image_url)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(email)
    .bind(google_id)
    .bind(first_name)
    .bind(last_name)
    .bind(profile_image_url)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_google_id(pool: &PgPool, google_id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE google_id = $1")
        .bind(google_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// An account registered by email can later sign in with Google; the first
/// OAuth login attaches the Google identity to the existing row.
pub async fn attach_google_id(
    pool: &PgPool,
    id: i32,
    google_id: &str,
    profile_image_url: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET google_id = $2,
             profile_image_url = COALESCE($3, profile_image_url),
             updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(google_id)
    .bind(profile_image_url)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(users)
}

pub async fn update_profile(
    pool: &PgPool,
    id: i32,
    req: &UpdateProfileRequest,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET first_name = COALESCE($2, first_name),
             last_name = COALESCE($3, last_name),
             phone = COALESCE($4, phone),
             profile_image_url = COALESCE($5, profile_image_url),
             updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(req.first_name.as_deref())
    .bind(req.last_name.as_deref())
    .bind(req.phone.as_deref())
    .bind(req.profile_image_url.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn admin_update(
    pool: &PgPool,
    id: i32,
    req: &AdminUserRequest,
    password_hash: Option<&str>,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET email = COALESCE($2, email),
             password = COALESCE($3, password),
             first_name = COALESCE($4, first_name),
             last_name = COALESCE($5, last_name),
             phone = COALESCE($6, phone),
             is_admin = COALESCE($7, is_admin),
             updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(req.email.as_deref())
    .bind(password_hash)
    .bind(req.first_name.as_deref())
    .bind(req.last_name.as_deref())
    .bind(req.phone.as_deref())
    .bind(req.is_admin)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn admin_create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: Option<&str>,
    phone: Option<&str>,
    is_admin: bool,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password, first_name, last_name, phone, is_admin)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(phone)
    .bind(is_admin)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
