use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::{AppError, Result},
    models::{Service, ServiceRequest},
    queries::service_queries,
    utils::extractors::{AdminClaims, OptionalClaims},
    AppState,
};

/// Public listing shows active services only. Admins also get deactivated
/// ones so they can restore them.
pub async fn list_services(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
) -> Result<Json<Vec<Service>>> {
    let admin_view = claims.map(|c| c.is_admin || c.is_demo).unwrap_or(false);

    let services = if admin_view {
        service_queries::list_all(&state.db).await?
    } else {
        service_queries::list_active(&state.db).await?
    };

    Ok(Json(services))
}

pub async fn get_service(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Path(id): Path<i32>,
) -> Result<Json<Service>> {
    let service = service_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    let admin_view = claims.map(|c| c.is_admin || c.is_demo).unwrap_or(false);
    if !service.is_active && !admin_view {
        return Err(AppError::NotFound("Service not found".to_string()));
    }

    Ok(Json(service))
}

pub async fn create_service(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Json(payload): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<Service>)> {
    let name = payload
        .name
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?;
    let description = payload
        .description
        .ok_or_else(|| AppError::BadRequest("description is required".to_string()))?;
    let price = payload
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
    let duration = payload
        .duration
        .ok_or_else(|| AppError::BadRequest("duration is required".to_string()))?;

    if price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".to_string()));
    }
    if duration <= 0 {
        return Err(AppError::BadRequest("duration must be positive".to_string()));
    }

    if claims.is_demo {
        let now = Utc::now();
        let service = Service {
            id: state.demo.allocate_id(),
            name,
            description,
            price,
            duration,
            category: payload.category,
            is_active: payload.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        return Ok((StatusCode::CREATED, Json(service)));
    }

    let service = service_queries::create(
        &state.db,
        &name,
        &description,
        price,
        duration,
        payload.category.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(id): Path<i32>,
    Json(payload): Json<ServiceRequest>,
) -> Result<Json<Service>> {
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price cannot be negative".to_string()));
        }
    }
    if let Some(duration) = payload.duration {
        if duration <= 0 {
            return Err(AppError::BadRequest("duration must be positive".to_string()));
        }
    }

    if claims.is_demo {
        let mut service = service_queries::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        apply_service_request(&mut service, payload);
        return Ok(Json(service));
    }

    let service = service_queries::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if claims.is_demo {
        service_queries::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        return Ok(StatusCode::NO_CONTENT);
    }

    if !service_queries::deactivate(&state.db, id).await? {
        return Err(AppError::NotFound("Service not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn apply_service_request(service: &mut Service, payload: ServiceRequest) {
    if let Some(name) = payload.name {
        service.name = name;
    }
    if let Some(description) = payload.description {
        service.description = description;
    }
    if let Some(price) = payload.price {
        service.price = price;
    }
    if let Some(duration) = payload.duration {
        service.duration = duration;
    }
    if let Some(category) = payload.category {
        service.category = Some(category);
    }
    if let Some(is_active) = payload.is_active {
        service.is_active = is_active;
    }
    service.updated_at = Utc::now();
}
