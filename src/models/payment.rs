use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i32,
    pub payment_intent_id: String,
    pub course_id: i32,
    pub user_id: Option<i32>,
    pub email: String,
    pub amount: i32,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Guests buy with an explicit email; logged-in buyers fall back to the email
// in their token.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub course_id: i32,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}
