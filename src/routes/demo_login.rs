use axum::Json;

use crate::{
    error::Result,
    models::AuthResponse,
    utils::jwt,
};

/// Login-free entry into the admin demo. The returned token acts as admin
/// everywhere, but every write it performs stays in memory.
pub async fn demo_login() -> Result<Json<AuthResponse>> {
    let token = jwt::generate_demo_token()?;

    Ok(Json(AuthResponse { token }))
}
