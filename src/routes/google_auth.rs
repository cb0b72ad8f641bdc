use axum::{Json, extract::State};
use google_oauth::AsyncClient;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AuthResponse, GoogleAuthRequest},
    queries::user_queries,
    utils::jwt,
};

pub async fn google_auth(
    State(state): State<AppState>,
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<Json<AuthResponse>> {
    let google_client_id = std::env::var("GOOGLE_CLIENT_ID")
        .map_err(|_| AppError::ConfigError("GOOGLE_CLIENT_ID not set".to_string()))?;

    let client = AsyncClient::new(&google_client_id);

    let id_token = client
        .validate_id_token(&payload.id_token)
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid Google token: {}", e)))?;

    let google_id = &id_token.sub;
    let email = id_token
        .email
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Email not provided by Google".to_string()))?;
    let first_name = id_token
        .given_name
        .as_ref()
        .or(id_token.name.as_ref())
        .ok_or_else(|| AppError::BadRequest("Name not provided by Google".to_string()))?;
    let last_name = id_token.family_name.as_deref();
    let picture = id_token.picture.as_deref();

    let user = if let Some(existing) =
        user_queries::find_by_google_id(&state.db, google_id).await?
    {
        existing
    } else if let Some(existing) = user_queries::find_by_email(&state.db, email).await? {
        // First Google sign-in on an email-registered account links the two.
        user_queries::attach_google_id(&state.db, existing.id, google_id, picture).await?
    } else {
        user_queries::create_google_user(&state.db, email, google_id, first_name, last_name, picture)
            .await?
    };

    let token = jwt::generate_token(&user)?;

    Ok(Json(AuthResponse { token }))
}
