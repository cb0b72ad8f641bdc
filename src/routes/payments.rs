use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CreatePaymentIntentRequest, PaymentIntentResponse},
    queries::{course_queries, payment_queries},
    services::stripe_service,
    utils::extractors::{extract_user_id, OptionalClaims},
    AppState,
};

// Amounts are minor units end to end; course prices go to Stripe unchanged.
const CURRENCY: &str = "usd";

pub async fn create_payment_intent(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>> {
    let course = course_queries::find_by_id(&state.db, payload.course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    if !course.is_active {
        return Err(AppError::BadRequest("Course is not available".to_string()));
    }

    let email = payload
        .email
        .clone()
        .or_else(|| claims.as_ref().map(|c| c.email.clone()))
        .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;

    // Demo checkouts stop before Stripe; the fake secret keeps the payment
    // form from reaching a real charge.
    if let Some(claims) = &claims {
        if claims.is_demo {
            return Ok(Json(PaymentIntentResponse {
                client_secret: format!("demo_secret_{}", Uuid::new_v4().simple()),
            }));
        }
    }

    let user_id = match &claims {
        Some(claims) => Some(extract_user_id(claims)?),
        None => None,
    };

    let intent = stripe_service::create_payment_intent(
        &state.stripe_secret_key,
        course.price,
        CURRENCY,
        course.id,
        Some(&email),
    )
    .await?;

    payment_queries::create_pending(
        &state.db,
        &intent.id,
        course.id,
        user_id,
        &email,
        course.price,
        CURRENCY,
    )
    .await?;

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = match headers.get("stripe-signature").and_then(|v| v.to_str().ok()) {
        Some(value) => value,
        None => {
            tracing::warn!("Stripe webhook missing signature header");
            return StatusCode::BAD_REQUEST;
        }
    };

    if let Err(e) = stripe_service::verify_webhook_signature(
        &state.stripe_webhook_secret,
        signature,
        &body,
        Utc::now().timestamp(),
    ) {
        tracing::warn!("Invalid Stripe webhook signature: {}", e);
        return StatusCode::BAD_REQUEST;
    }

    let event = match stripe_service::parse_event(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Malformed Stripe webhook payload: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let status = match event.event_type.as_str() {
        "payment_intent.succeeded" => "succeeded",
        "payment_intent.payment_failed" => "failed",
        _ => {
            tracing::info!("Ignoring Stripe event type {}", event.event_type);
            return StatusCode::OK;
        }
    };

    let payment_intent_id = match event.payment_intent_id.as_deref() {
        Some(id) => id,
        None => {
            tracing::warn!(
                "Stripe event {} carries no payment intent id",
                event.event_type
            );
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(
        "Stripe webhook: intent={}, type={}",
        payment_intent_id,
        event.event_type
    );

    match payment_queries::resolve(&state.db, payment_intent_id, status).await {
        Ok(Some(_)) => StatusCode::OK,
        Ok(None) => {
            tracing::warn!(
                "Stripe webhook: payment {} not found or already settled",
                payment_intent_id
            );
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!("Failed to record payment settlement: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
