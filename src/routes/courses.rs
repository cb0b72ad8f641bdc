use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::{AppError, Result},
    models::{Course, CourseRequest},
    queries::course_queries,
    utils::extractors::{AdminClaims, OptionalClaims},
    AppState,
};

pub async fn list_courses(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
) -> Result<Json<Vec<Course>>> {
    let admin_view = claims.map(|c| c.is_admin || c.is_demo).unwrap_or(false);

    let courses = if admin_view {
        course_queries::list_all(&state.db).await?
    } else {
        course_queries::list_active(&state.db).await?
    };

    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Path(id): Path<i32>,
) -> Result<Json<Course>> {
    let course = course_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let admin_view = claims.map(|c| c.is_admin || c.is_demo).unwrap_or(false);
    if !course.is_active && !admin_view {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(Json(course))
}

pub async fn create_course(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Json(payload): Json<CourseRequest>,
) -> Result<(StatusCode, Json<Course>)> {
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
        let course = Course {
            id: state.demo.allocate_id(),
            name,
            description,
            price,
            duration,
            category: payload.category,
            image_url: payload.image_url,
            document_url: payload.document_url,
            is_active: payload.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        return Ok((StatusCode::CREATED, Json(course)));
    }

    let course = course_queries::create(
        &state.db,
        &name,
        &description,
        price,
        duration,
        payload.category.as_deref(),
        payload.image_url.as_deref(),
        payload.document_url.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(id): Path<i32>,
    Json(payload): Json<CourseRequest>,
) -> Result<Json<Course>> {
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
        let mut course = course_queries::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
        apply_course_request(&mut course, payload);
        return Ok(Json(course));
    }

    let course = course_queries::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if claims.is_demo {
        course_queries::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
        return Ok(StatusCode::NO_CONTENT);
    }

    if !course_queries::deactivate(&state.db, id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn apply_course_request(course: &mut Course, payload: CourseRequest) {
    if let Some(name) = payload.name {
        course.name = name;
    }
    if let Some(description) = payload.description {
        course.description = description;
    }
    if let Some(price) = payload.price {
        course.price = price;
    }
    if let Some(duration) = payload.duration {
        course.duration = duration;
    }
    if let Some(category) = payload.category {
        course.category = Some(category);
    }
    if let Some(image_url) = payload.image_url {
        course.image_url = Some(image_url);
    }
    if let Some(document_url) = payload.document_url {
        course.document_url = Some(document_url);
    }
    if let Some(is_active) = payload.is_active {
        course.is_active = is_active;
    }
    course.updated_at = Utc::now();
}
