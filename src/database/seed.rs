use sqlx::PgPool;

use crate::{
    config::AuthConfig,
    error::{AppError, Result},
    queries::user_queries,
};

/// Make sure the configured admin account exists so a fresh deployment is
/// immediately manageable. Does nothing when the account is already there.
pub async fn seed_admin(pool: &PgPool, auth: &AuthConfig) -> Result<()> {
    if user_queries::find_by_email(pool, &auth.admin_email)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let Some(password) = auth.admin_password.as_deref() else {
        tracing::warn!("ADMIN_PASSWORD not set; skipping admin account seeding");
        return Ok(());
    };

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    user_queries::admin_create(
        pool,
        &auth.admin_email,
        &password_hash,
        "Admin",
        None,
        None,
        true,
    )
    .await?;

    tracing::info!("Seeded admin account {}", auth.admin_email);
    Ok(())
}
