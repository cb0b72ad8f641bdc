use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Same multi-language shape as Service, plus media links. Courses are sold
// through payment intents and never referenced by appointments.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: i32,
    pub name: serde_json::Value,
    pub description: serde_json::Value,
    pub price: i32,
    pub duration: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub document_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    pub name: Option<serde_json::Value>,
    pub description: Option<serde_json::Value>,
    pub price: Option<i32>,
    pub duration: Option<i32>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub document_url: Option<String>,
    pub is_active: Option<bool>,
}
