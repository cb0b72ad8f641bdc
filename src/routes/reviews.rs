use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    demo::{mask::mask_review, DEMO_USER_ID},
    error::{AppError, Result},
    models::{CreateReviewRequest, ModerateReviewRequest, Review, ReviewStatus},
    queries::review_queries,
    utils::extractors::{extract_user_id, AdminClaims, OptionalClaims},
    AppState,
};

/// Visitors see approved reviews. Admins see every submission so they can
/// moderate from the same page.
pub async fn list_reviews(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
) -> Result<Json<Vec<Review>>> {
    if let Some(claims) = &claims {
        if claims.is_demo {
            let real = review_queries::list_all(&state.db).await?;
            let merged = state.demo.merge_reviews(real);
            return Ok(Json(merged.into_iter().map(mask_review).collect()));
        }
        if claims.is_admin {
            return Ok(Json(review_queries::list_all(&state.db).await?));
        }
    }

    Ok(Json(review_queries::list_approved(&state.db).await?))
}

pub async fn list_all_reviews(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
) -> Result<Json<Vec<Review>>> {
    let reviews = review_queries::list_all(&state.db).await?;

    if claims.is_demo {
        let merged = state.demo.merge_reviews(reviews);
        return Ok(Json(merged.into_iter().map(mask_review).collect()));
    }

    Ok(Json(reviews))
}

/// Anyone can submit; reviews start pending and appear publicly only after
/// approval.
pub async fn create_review(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    if payload.comment.trim().is_empty() {
        return Err(AppError::BadRequest("comment cannot be empty".to_string()));
    }

    if let Some(claims) = &claims {
        if claims.is_demo {
            let review = Review {
                id: state.demo.allocate_id(),
                user_id: Some(DEMO_USER_ID),
                service_id: payload.service_id,
                name: payload.name,
                rating: payload.rating,
                comment: payload.comment,
                status: ReviewStatus::Pending,
                created_at: Utc::now(),
            };
            state.demo.insert_review(review.clone());
            return Ok((StatusCode::CREATED, Json(mask_review(review))));
        }
    }

    let user_id = match &claims {
        Some(claims) => Some(extract_user_id(claims)?),
        None => None,
    };

    let review = review_queries::create(
        &state.db,
        user_id,
        payload.service_id,
        payload.name.as_deref(),
        payload.rating,
        &payload.comment,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn moderate_review(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(id): Path<i32>,
    Json(payload): Json<ModerateReviewRequest>,
) -> Result<Json<Review>> {
    if claims.is_demo {
        let mut review = match state.demo.review(id) {
            Some(synthetic) => synthetic,
            None => {
                if state.demo.is_review_deleted(id) {
                    return Err(AppError::NotFound("Review not found".to_string()));
                }
                let mut real = review_queries::find_by_id(&state.db, id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;
                if let Some(status) = state.demo.review_status_override(id) {
                    real.status = status;
                }
                real
            }
        };
        state.demo.override_review_status(id, payload.status);
        review.status = payload.status;
        return Ok(Json(mask_review(review)));
    }

    let review = review_queries::set_status(&state.db, id, payload.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if claims.is_demo {
        let known = state.demo.review(id).is_some()
            || review_queries::find_by_id(&state.db, id).await?.is_some();
        if !known || state.demo.is_review_deleted(id) {
            return Err(AppError::NotFound("Review not found".to_string()));
        }
        state.demo.delete_review(id);
        return Ok(StatusCode::NO_CONTENT);
    }

    if !review_queries::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Review not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
