use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;

use crate::{
    demo::{DEMO_EMAIL, DEMO_USER_ID},
    error::{AppError, Result},
    models::UserResponse,
    queries::user_queries,
    utils::{extractors::extract_user_id, jwt::Claims},
    AppState,
};

pub async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>> {
    if claims.is_demo {
        return Ok(Json(demo_profile()));
    }

    let user_id = extract_user_id(&claims)?;
    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Stateless tokens cannot be revoked server-side; the SPA drops its copy.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// The demo identity has no users row; its profile is synthesized. It shows
/// is_admin so the SPA renders the admin dashboard.
pub(crate) fn demo_profile() -> UserResponse {
    UserResponse {
        id: DEMO_USER_ID,
        email: DEMO_EMAIL.to_string(),
        first_name: "Demo".to_string(),
        last_name: Some("Admin".to_string()),
        phone: None,
        profile_image_url: None,
        is_admin: true,
        created_at: Utc::now(),
    }
}
