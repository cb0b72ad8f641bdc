use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// One row per calendar date; a date without a row is unrestricted. Times stay
// "HH:mm" strings on the wire and in the column, validated on write.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkingHours {
    pub id: i32,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertWorkingHoursRequest {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}
