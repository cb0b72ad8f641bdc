use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    demo::mask::mask_user,
    error::{AppError, Result},
    models::{AdminUserRequest, UpdateProfileRequest, UserResponse},
    queries::user_queries,
    routes::profile::demo_profile,
    utils::{extractors::extract_user_id, jwt::Claims},
    AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>> {
    let users = user_queries::list_all(&state.db).await?;
    let mut users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    if claims.is_demo {
        users = users.into_iter().map(mask_user).collect();
    }

    Ok(Json(users))
}

pub async fn admin_create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AdminUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let email = payload
        .email
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;
    let password = payload
        .password
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("password is required".to_string()))?;
    let first_name = payload
        .first_name
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("first_name is required".to_string()))?;

    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if first_name.trim().is_empty() {
        return Err(AppError::BadRequest("first_name is required".to_string()));
    }

    if claims.is_demo {
        let mut user = demo_profile();
        user.id = state.demo.allocate_id();
        user.email = email.to_string();
        user.first_name = first_name.to_string();
        user.last_name = payload.last_name.clone();
        user.phone = payload.phone.clone();
        user.is_admin = payload.is_admin.unwrap_or(false);
        return Ok((StatusCode::CREATED, Json(user)));
    }

    if user_queries::find_by_email(&state.db, email).await?.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))?;

    let user = user_queries::admin_create(
        &state.db,
        email,
        &password_hash,
        first_name,
        payload.last_name.as_deref(),
        payload.phone.as_deref(),
        payload.is_admin.unwrap_or(false),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn admin_update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AdminUserRequest>,
) -> Result<Json<UserResponse>> {
    if let Some(email) = payload.email.as_deref() {
        if !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
    }
    if let Some(password) = payload.password.as_deref() {
        if password.len() < 8 {
            return Err(AppError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }
    }

    if claims.is_demo {
        let user = user_queries::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let mut response = apply_admin_request(user.into(), &payload);
        response = mask_user(response);
        return Ok(Json(response));
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(
            bcrypt::hash(password, bcrypt::DEFAULT_COST)
                .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))?,
        ),
        None => None,
    };

    let user = user_queries::admin_update(&state.db, id, &payload, password_hash.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    if claims.is_demo {
        let mut profile = demo_profile();
        if let Some(first_name) = payload.first_name {
            profile.first_name = first_name;
        }
        if let Some(last_name) = payload.last_name {
            profile.last_name = Some(last_name);
        }
        if let Some(phone) = payload.phone {
            profile.phone = Some(phone);
        }
        if let Some(profile_image_url) = payload.profile_image_url {
            profile.profile_image_url = Some(profile_image_url);
        }
        return Ok(Json(profile));
    }

    let user_id = extract_user_id(&claims)?;
    let user = user_queries::update_profile(&state.db, user_id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

fn apply_admin_request(mut user: UserResponse, payload: &AdminUserRequest) -> UserResponse {
    if let Some(email) = &payload.email {
        user.email = email.clone();
    }
    if let Some(first_name) = &payload.first_name {
        user.first_name = first_name.clone();
    }
    if let Some(last_name) = &payload.last_name {
        user.last_name = Some(last_name.clone());
    }
    if let Some(phone) = &payload.phone {
        user.phone = Some(phone.clone());
    }
    if let Some(is_admin) = payload.is_admin {
        user.is_admin = is_admin;
    }
    user
}
