use aws_sdk_sesv2::Client as SesClient;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

/// Appointment details shared by every booking email.
pub struct AppointmentEmail<'a> {
    pub client_name: &'a str,
    pub service_name: &'a str,
    pub appointment_date: DateTime<Utc>,
}

impl AppointmentEmail<'_> {
    fn formatted_date(&self) -> String {
        self.appointment_date.format("%d.%m.%Y %H:%M").to_string()
    }
}

/// Pick a human-readable name out of a multilingual JSONB map. English wins,
/// otherwise the first entry.
pub fn display_name(name: Option<&serde_json::Value>) -> String {
    let Some(name) = name else {
        return "Appointment".to_string();
    };
    if let Some(s) = name.as_str() {
        return s.to_string();
    }
    if let Some(s) = name.get("en").and_then(|v| v.as_str()) {
        return s.to_string();
    }
    name.as_object()
        .and_then(|map| map.values().find_map(|v| v.as_str()))
        .unwrap_or("Appointment")
        .to_string()
}

pub async fn send_appointment_submitted(
    ses_client: &SesClient,
    recipient: &str,
    email: &AppointmentEmail<'_>,
    sender_email: &str,
) -> Result<()> {
    let html = include_str!("../utils/appointment_submitted.html")
        .replace("{{client_name}}", email.client_name)
        .replace("{{service_name}}", email.service_name)
        .replace("{{appointment_date}}", &email.formatted_date());

    send_html(ses_client, recipient, "We received your appointment request", html, sender_email)
        .await
}

pub async fn send_appointment_confirmed(
    ses_client: &SesClient,
    recipient: &str,
    email: &AppointmentEmail<'_>,
    sender_email: &str,
) -> Result<()> {
    let html = include_str!("../utils/appointment_confirmed.html")
        .replace("{{client_name}}", email.client_name)
        .replace("{{service_name}}", email.service_name)
        .replace("{{appointment_date}}", &email.formatted_date());

    send_html(ses_client, recipient, "Your appointment is confirmed", html, sender_email).await
}

pub async fn send_admin_notice(
    ses_client: &SesClient,
    admin_email: &str,
    email: &AppointmentEmail<'_>,
    client_contact: &str,
    sender_email: &str,
) -> Result<()> {
    let html = include_str!("../utils/appointment_notice.html")
        .replace("{{client_name}}", email.client_name)
        .replace("{{client_contact}}", client_contact)
        .replace("{{service_name}}", email.service_name)
        .replace("{{appointment_date}}", &email.formatted_date());

    send_html(ses_client, admin_email, "New appointment request", html, sender_email).await
}

async fn send_html(
    ses_client: &SesClient,
    recipient: &str,
    subject: &str,
    html: String,
    sender_email: &str,
) -> Result<()> {
    let destination = aws_sdk_sesv2::types::Destination::builder()
        .to_addresses(recipient)
        .build();

    let subject = aws_sdk_sesv2::types::Content::builder()
        .data(subject)
        .charset("UTF-8")
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to build email subject: {}", e)))?;

    let html_body = aws_sdk_sesv2::types::Content::builder()
        .data(html)
        .charset("UTF-8")
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to build email body: {}", e)))?;

    let body = aws_sdk_sesv2::types::Body::builder()
        .html(html_body)
        .build();

    let message = aws_sdk_sesv2::types::Message::builder()
        .subject(subject)
        .body(body)
        .build();

    let content = aws_sdk_sesv2::types::EmailContent::builder()
        .simple(message)
        .build();

    ses_client
        .send_email()
        .from_email_address(sender_email)
        .destination(destination)
        .content(content)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Failed to send email to {}: {:?}", recipient, e);
            AppError::InternalError("Failed to send email".to_string())
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_prefers_english() {
        let name = json!({"ka": "მასაჟი", "en": "Massage"});
        assert_eq!(display_name(Some(&name)), "Massage");
    }

    #[test]
    fn test_display_name_falls_back_to_any_language() {
        let name = json!({"ka": "მასაჟი"});
        assert_eq!(display_name(Some(&name)), "მასაჟი");
    }

    #[test]
    fn test_display_name_accepts_plain_string() {
        let name = json!("Massage");
        assert_eq!(display_name(Some(&name)), "Massage");
    }

    #[test]
    fn test_display_name_handles_missing() {
        assert_eq!(display_name(None), "Appointment");
        assert_eq!(display_name(Some(&json!({}))), "Appointment");
    }
}
