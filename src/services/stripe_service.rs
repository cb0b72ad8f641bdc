use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, Result};

const STRIPE_PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

// Stripe signs webhooks with the event's creation time; reject anything
// older than this to stop replays.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

pub async fn create_payment_intent(
    secret_key: &str,
    amount: i32,
    currency: &str,
    course_id: i32,
    receipt_email: Option<&str>,
) -> Result<PaymentIntent> {
    let course_id = course_id.to_string();
    let amount = amount.to_string();
    let mut params: Vec<(&str, &str)> = vec![
        ("amount", &amount),
        ("currency", currency),
        ("metadata[course_id]", &course_id),
        ("automatic_payment_methods[enabled]", "true"),
    ];
    if let Some(email) = receipt_email {
        params.push(("receipt_email", email));
    }

    let client = reqwest::Client::new();
    let response = client
        .post(STRIPE_PAYMENT_INTENTS_URL)
        .bearer_auth(secret_key)
        .form(&params)
        .send()
        .await
        .map_err(|e| AppError::InternalError(format!("Stripe API request failed: {}", e)))?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to parse Stripe response: {}", e)))?;

    if let Some(error) = body.get("error") {
        tracing::error!("Stripe API error response: {}", error);
        let error_message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Stripe error");
        return Err(AppError::InternalError(format!(
            "Stripe payment intent creation failed: {}",
            error_message
        )));
    }

    let id = body
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::InternalError("Stripe response missing id".to_string()))?;

    let client_secret = body
        .get("client_secret")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            AppError::InternalError("Stripe response missing client_secret".to_string())
        })?;

    Ok(PaymentIntent {
        id: id.to_string(),
        client_secret: client_secret.to_string(),
    })
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex hmac>`) against the
/// raw request body. `now` is passed in so the freshness window is testable.
pub fn verify_webhook_signature(
    webhook_secret: &str,
    signature_header: &str,
    payload: &[u8],
    now: i64,
) -> Result<()> {
    let mut timestamp: Option<&str> = None;
    let mut sig_v1: Option<&str> = None;

    for part in signature_header.split(',') {
        if let Some((key, value)) = part.split_once('=') {
            match key {
                "t" => timestamp = Some(value),
                "v1" => sig_v1 = Some(value),
                _ => {}
            }
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| AppError::BadRequest("Missing timestamp in signature".to_string()))?;
    let sig_v1 =
        sig_v1.ok_or_else(|| AppError::BadRequest("Missing v1 signature".to_string()))?;

    let payload = std::str::from_utf8(payload)
        .map_err(|_| AppError::BadRequest("Invalid payload encoding".to_string()))?;
    let signed_payload = format!("{}.{}", timestamp, payload);

    let mut mac = Hmac::<Sha256>::new_from_slice(webhook_secret.as_bytes())
        .map_err(|_| AppError::InternalError("HMAC setup failed".to_string()))?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if !constant_time_eq(sig_v1.as_bytes(), expected.as_bytes()) {
        tracing::warn!("Webhook signature verification failed");
        return Err(AppError::BadRequest(
            "Signature verification failed".to_string(),
        ));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid timestamp format".to_string()))?;
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        tracing::warn!(timestamp = ts, now = now, "Webhook timestamp outside tolerance");
        return Err(AppError::BadRequest("Timestamp too old".to_string()));
    }

    Ok(())
}

/// The slice of a Stripe event this service cares about.
#[derive(Debug)]
pub struct StripeEvent {
    pub event_type: String,
    pub payment_intent_id: Option<String>,
}

pub fn parse_event(payload: &[u8]) -> Result<StripeEvent> {
    let body: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    let event_type = body
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::BadRequest("Webhook payload missing type".to_string()))?
        .to_string();

    let payment_intent_id = body
        .get("data")
        .and_then(|d| d.get("object"))
        .and_then(|o| o.get("id"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(StripeEvent {
        event_type,
        payment_intent_id,
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret_key";

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let signed_payload = format!("{}.{}", timestamp, std::str::from_utf8(payload).unwrap());
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    fn event_payload(event_type: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "id": "evt_test_123",
            "type": event_type,
            "created": 1_700_000_000,
            "data": { "object": { "id": "pi_test_123", "status": "succeeded" } }
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = event_payload("payment_intent.succeeded");
        let now = 1_700_000_000;
        let header = sign(&payload, SECRET, now);
        assert!(verify_webhook_signature(SECRET, &header, &payload, now).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = event_payload("payment_intent.succeeded");
        let now = 1_700_000_000;
        let header = sign(&payload, SECRET, now);
        let tampered = event_payload("payment_intent.payment_failed");
        assert!(verify_webhook_signature(SECRET, &header, &tampered, now).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = event_payload("payment_intent.succeeded");
        let now = 1_700_000_000;
        let header = sign(&payload, "whsec_other_secret", now);
        assert!(verify_webhook_signature(SECRET, &header, &payload, now).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = event_payload("payment_intent.succeeded");
        let signed_at = 1_700_000_000;
        let header = sign(&payload, SECRET, signed_at);
        let now = signed_at + SIGNATURE_TOLERANCE_SECS + 1;
        assert!(verify_webhook_signature(SECRET, &header, &payload, now).is_err());
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let payload = event_payload("payment_intent.succeeded");
        let signed_at = 1_700_000_000;
        let header = sign(&payload, SECRET, signed_at);
        let now = signed_at - SIGNATURE_TOLERANCE_SECS - 1;
        assert!(verify_webhook_signature(SECRET, &header, &payload, now).is_err());
    }

    #[test]
    fn test_edge_of_tolerance_accepted() {
        let payload = event_payload("payment_intent.succeeded");
        let signed_at = 1_700_000_000;
        let header = sign(&payload, SECRET, signed_at);
        let now = signed_at + SIGNATURE_TOLERANCE_SECS;
        assert!(verify_webhook_signature(SECRET, &header, &payload, now).is_ok());
    }

    #[test]
    fn test_malformed_header_rejected() {
        let payload = event_payload("payment_intent.succeeded");
        let now = 1_700_000_000;
        assert!(verify_webhook_signature(SECRET, "", &payload, now).is_err());
        assert!(verify_webhook_signature(SECRET, "t=123", &payload, now).is_err());
        assert!(verify_webhook_signature(SECRET, "v1=abc", &payload, now).is_err());
        assert!(verify_webhook_signature(SECRET, "garbage", &payload, now).is_err());
    }

    #[test]
    fn test_parse_event_extracts_intent_id() {
        let payload = event_payload("payment_intent.succeeded");
        let event = parse_event(&payload).unwrap();
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.payment_intent_id.as_deref(), Some("pi_test_123"));
    }

    #[test]
    fn test_parse_event_without_object_id() {
        let payload = serde_json::to_vec(&serde_json::json!({
            "type": "charge.refunded",
            "data": { "object": {} }
        }))
        .unwrap();
        let event = parse_event(&payload).unwrap();
        assert_eq!(event.event_type, "charge.refunded");
        assert!(event.payment_intent_id.is_none());
    }

    #[test]
    fn test_parse_event_rejects_garbage() {
        assert!(parse_event(b"not json").is_err());
        assert!(parse_event(b"{}").is_err());
    }
}
