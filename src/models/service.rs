use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Service names and descriptions are JSON maps keyed by language code,
// e.g. {"en": "Relaxing massage", "uk": "Розслаблюючий масаж"}.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: i32,
    pub name: serde_json::Value,
    pub description: serde_json::Value,
    pub price: i32,
    pub duration: i32,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub name: Option<serde_json::Value>,
    pub description: Option<serde_json::Value>,
    pub price: Option<i32>,
    pub duration: Option<i32>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}
