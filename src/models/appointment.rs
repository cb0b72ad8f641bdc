use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// The allowed lifecycle moves. Everything else, including leaving a
    /// terminal state or re-entering the current one, is rejected upstream with
    /// INVALID_TRANSITION.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }

    /// Whether an appointment in this status occupies its slot.
    pub fn blocks_slot(self) -> bool {
        !matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: i32,
    pub user_id: Option<i32>,
    pub service_id: i32,
    pub appointment_date: DateTime<Utc>,
    pub is_online: bool,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub messenger_type: Option<String>,
    pub messenger_contact: Option<String>,
    pub is_deleted_from_admin: bool,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// The client fields are only honored for admin walk-in entries; a client
// booking always gets user_id from its token and status pending.
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub service_id: i32,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub is_online: Option<bool>,
    pub messenger_type: Option<String>,
    pub messenger_contact: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
}

/// Write shape after the route has applied role rules: client bookings get
/// their user_id from the token and status pending, walk-ins carry the
/// free-text client fields instead.
#[derive(Debug)]
pub struct NewAppointment {
    pub user_id: Option<i32>,
    pub service_id: i32,
    pub appointment_date: DateTime<Utc>,
    pub is_online: bool,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub messenger_type: Option<String>,
    pub messenger_contact: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAppointmentQuery {
    pub hard: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CheckSlotQuery {
    pub service_id: i32,
    pub date_time: DateTime<Utc>,
}

// Admin and owner lists: the row plus what the dashboard renders next to it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AppointmentResponse {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub appointment: Appointment,
    pub service_name: Option<serde_json::Value>,
    pub service_duration: Option<i32>,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_email: Option<String>,
}

// Occupied-slot feed for the booking page; deliberately carries no client
// identity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DaySlot {
    pub id: i32,
    pub service_id: i32,
    pub appointment_date: DateTime<Utc>,
    pub service_duration: i32,
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_moves_forward() {
        assert!(AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Confirmed));
        assert!(AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Completed));
        assert!(AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Cancelled));
    }

    #[test]
    fn test_confirmed_moves_forward() {
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::Completed));
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::Pending));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert!(!AppointmentStatus::Completed.can_transition_to(next));
            assert!(!AppointmentStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_identity_transitions_rejected() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_only_live_statuses_block_slots() {
        assert!(AppointmentStatus::Pending.blocks_slot());
        assert!(AppointmentStatus::Confirmed.blocks_slot());
        assert!(!AppointmentStatus::Completed.blocks_slot());
        assert!(!AppointmentStatus::Cancelled.blocks_slot());
    }
}
