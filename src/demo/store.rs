use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::models::{AppointmentResponse, AppointmentStatus, DaySlot, Review, ReviewStatus};
use crate::services::availability::BusySlot;

/// Synthetic ids start far above anything the real serial columns will reach,
/// so a demo id can never shadow a persisted row.
pub const DEMO_ID_FLOOR: i32 = 1_000_000_000;

/// In-memory shadow of the database for demo sessions. Writes made under a
/// demo token land here; reads merge these rows over the persisted ones.
/// Process-wide and unpersisted, so a restart resets every demo.
pub struct DemoStore {
    inner: RwLock<DemoState>,
}

#[derive(Default)]
struct DemoState {
    next_id: i32,
    appointments: Vec<AppointmentResponse>,
    reviews: Vec<Review>,
    appointment_status: HashMap<i32, AppointmentStatus>,
    review_status: HashMap<i32, ReviewStatus>,
    deleted_appointments: HashSet<i32>,
    deleted_reviews: HashSet<i32>,
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(DemoState {
                next_id: DEMO_ID_FLOOR,
                ..DemoState::default()
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DemoState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DemoState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn allocate_id(&self) -> i32 {
        let mut state = self.write();
        let id = state.next_id;
        state.next_id += 1;
        id
    }

    pub fn insert_appointment(&self, appointment: AppointmentResponse) {
        self.write().appointments.push(appointment);
    }

    pub fn insert_review(&self, review: Review) {
        self.write().reviews.push(review);
    }

    /// Record a status change for a real or synthetic appointment.
    pub fn override_appointment_status(&self, id: i32, status: AppointmentStatus) {
        self.write().appointment_status.insert(id, status);
    }

    pub fn override_review_status(&self, id: i32, status: ReviewStatus) {
        self.write().review_status.insert(id, status);
    }

    pub fn delete_appointment(&self, id: i32) {
        self.write().deleted_appointments.insert(id);
    }

    pub fn delete_review(&self, id: i32) {
        self.write().deleted_reviews.insert(id);
    }

    pub fn appointment_status_override(&self, id: i32) -> Option<AppointmentStatus> {
        self.read().appointment_status.get(&id).copied()
    }

    pub fn review_status_override(&self, id: i32) -> Option<ReviewStatus> {
        self.read().review_status.get(&id).copied()
    }

    pub fn is_appointment_deleted(&self, id: i32) -> bool {
        self.read().deleted_appointments.contains(&id)
    }

    pub fn is_review_deleted(&self, id: i32) -> bool {
        self.read().deleted_reviews.contains(&id)
    }

    /// Look up a synthetic appointment, with any later status change applied.
    /// Real ids always return None here; the caller falls back to the database.
    pub fn appointment(&self, id: i32) -> Option<AppointmentResponse> {
        let state = self.read();
        if state.deleted_appointments.contains(&id) {
            return None;
        }
        state
            .appointments
            .iter()
            .find(|a| a.appointment.id == id)
            .cloned()
            .map(|mut found| {
                if let Some(status) = state.appointment_status.get(&id) {
                    found.appointment.status = *status;
                }
                found
            })
    }

    pub fn review(&self, id: i32) -> Option<Review> {
        let state = self.read();
        if state.deleted_reviews.contains(&id) {
            return None;
        }
        state
            .reviews
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .map(|mut found| {
                if let Some(status) = state.review_status.get(&id) {
                    found.status = *status;
                }
                found
            })
    }

    /// Overlay persisted appointments with demo state: drop rows deleted in
    /// the demo, swap in overridden statuses, and append synthetic rows.
    /// Newest first, matching the admin list ordering.
    pub fn merge_appointments(
        &self,
        real: Vec<AppointmentResponse>,
    ) -> Vec<AppointmentResponse> {
        let state = self.read();
        let mut merged: Vec<AppointmentResponse> = real
            .into_iter()
            .filter(|a| !state.deleted_appointments.contains(&a.appointment.id))
            .map(|mut a| {
                if let Some(status) = state.appointment_status.get(&a.appointment.id) {
                    a.appointment.status = *status;
                }
                a
            })
            .collect();

        for synthetic in &state.appointments {
            let id = synthetic.appointment.id;
            if state.deleted_appointments.contains(&id) {
                continue;
            }
            let mut row = synthetic.clone();
            if let Some(status) = state.appointment_status.get(&id) {
                row.appointment.status = *status;
            }
            merged.push(row);
        }

        merged.sort_by(|a, b| b.appointment.appointment_date.cmp(&a.appointment.appointment_date));
        merged
    }

    pub fn merge_reviews(&self, real: Vec<Review>) -> Vec<Review> {
        let state = self.read();
        let mut merged: Vec<Review> = real
            .into_iter()
            .filter(|r| !state.deleted_reviews.contains(&r.id))
            .map(|mut r| {
                if let Some(status) = state.review_status.get(&r.id) {
                    r.status = *status;
                }
                r
            })
            .collect();

        for synthetic in &state.reviews {
            if state.deleted_reviews.contains(&synthetic.id) {
                continue;
            }
            let mut row = synthetic.clone();
            if let Some(status) = state.review_status.get(&row.id) {
                row.status = *status;
            }
            merged.push(row);
        }

        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        merged
    }

    /// Overlay the public occupied-slot feed for one day.
    pub fn merge_day_slots(&self, real: Vec<DaySlot>, date: NaiveDate) -> Vec<DaySlot> {
        let state = self.read();
        let mut merged: Vec<DaySlot> = real
            .into_iter()
            .filter(|s| !state.deleted_appointments.contains(&s.id))
            .map(|mut s| {
                if let Some(status) = state.appointment_status.get(&s.id) {
                    s.status = *status;
                }
                s
            })
            .collect();

        for synthetic in &state.appointments {
            let id = synthetic.appointment.id;
            if state.deleted_appointments.contains(&id)
                || synthetic.appointment.appointment_date.date_naive() != date
            {
                continue;
            }
            let mut status = synthetic.appointment.status;
            if let Some(overridden) = state.appointment_status.get(&id) {
                status = *overridden;
            }
            merged.push(DaySlot {
                id,
                service_id: synthetic.appointment.service_id,
                appointment_date: synthetic.appointment.appointment_date,
                service_duration: synthetic.service_duration.unwrap_or(0),
                status,
            });
        }

        merged.sort_by_key(|s| s.appointment_date);
        merged
    }

    /// The conflict-check view of one day under demo state: persisted slots
    /// adjusted for demo deletions/status changes, plus synthetic bookings.
    pub fn adjust_busy_slots(
        &self,
        real: Vec<(i32, BusySlot)>,
        date: NaiveDate,
    ) -> Vec<BusySlot> {
        let state = self.read();
        let mut adjusted: Vec<BusySlot> = real
            .into_iter()
            .filter(|(id, _)| !state.deleted_appointments.contains(id))
            .map(|(id, mut slot)| {
                if let Some(status) = state.appointment_status.get(&id) {
                    slot.status = *status;
                }
                slot
            })
            .collect();

        for synthetic in &state.appointments {
            let id = synthetic.appointment.id;
            if state.deleted_appointments.contains(&id)
                || synthetic.appointment.appointment_date.date_naive() != date
            {
                continue;
            }
            let mut status = synthetic.appointment.status;
            if let Some(overridden) = state.appointment_status.get(&id) {
                status = *overridden;
            }
            adjusted.push(BusySlot {
                starts_at: synthetic.appointment.appointment_date,
                duration_minutes: synthetic.service_duration.unwrap_or(0),
                status,
                is_deleted_from_admin: false,
            });
        }

        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Appointment;
    use chrono::{TimeZone, Utc};

    fn response(id: i32, hour: u32, status: AppointmentStatus) -> AppointmentResponse {
        AppointmentResponse {
            appointment: Appointment {
                id,
                user_id: Some(7),
                service_id: 3,
                appointment_date: Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap(),
                is_online: false,
                status,
                notes: None,
                messenger_type: None,
                messenger_contact: None,
                is_deleted_from_admin: false,
                client_name: None,
                client_phone: None,
                client_email: None,
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            },
            service_name: None,
            service_duration: Some(30),
            user_first_name: Some("Nina".to_string()),
            user_last_name: None,
            user_email: Some("nina@example.com".to_string()),
        }
    }

    fn review(id: i32, status: ReviewStatus) -> Review {
        Review {
            id,
            user_id: None,
            service_id: None,
            name: Some("Guest".to_string()),
            rating: 5,
            comment: "Great".to_string(),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_ids_start_at_floor_and_increase() {
        let store = DemoStore::new();
        assert_eq!(store.allocate_id(), DEMO_ID_FLOOR);
        assert_eq!(store.allocate_id(), DEMO_ID_FLOOR + 1);
    }

    #[test]
    fn test_synthetic_appointment_round_trip() {
        let store = DemoStore::new();
        let id = store.allocate_id();
        store.insert_appointment(response(id, 10, AppointmentStatus::Pending));

        let found = store.appointment(id).unwrap();
        assert_eq!(found.appointment.id, id);
        assert!(store.appointment(1).is_none());
    }

    #[test]
    fn test_status_override_applies_to_lookup_and_merge() {
        let store = DemoStore::new();
        let id = store.allocate_id();
        store.insert_appointment(response(id, 10, AppointmentStatus::Pending));
        store.override_appointment_status(id, AppointmentStatus::Confirmed);

        assert_eq!(
            store.appointment(id).unwrap().appointment.status,
            AppointmentStatus::Confirmed
        );

        let merged = store.merge_appointments(vec![]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].appointment.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_override_rewrites_real_rows_in_merge() {
        let store = DemoStore::new();
        store.override_appointment_status(42, AppointmentStatus::Cancelled);

        let merged = store.merge_appointments(vec![response(42, 9, AppointmentStatus::Pending)]);
        assert_eq!(merged[0].appointment.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_deleted_rows_disappear_from_merge() {
        let store = DemoStore::new();
        let id = store.allocate_id();
        store.insert_appointment(response(id, 10, AppointmentStatus::Pending));
        store.delete_appointment(id);
        store.delete_appointment(42);

        let merged = store.merge_appointments(vec![response(42, 9, AppointmentStatus::Pending)]);
        assert!(merged.is_empty());
        assert!(store.appointment(id).is_none());
    }

    #[test]
    fn test_merge_orders_newest_first() {
        let store = DemoStore::new();
        let id = store.allocate_id();
        store.insert_appointment(response(id, 15, AppointmentStatus::Pending));

        let merged = store.merge_appointments(vec![
            response(1, 9, AppointmentStatus::Pending),
            response(2, 18, AppointmentStatus::Pending),
        ]);
        let hours: Vec<u32> = merged
            .iter()
            .map(|a| {
                use chrono::Timelike;
                a.appointment.appointment_date.hour()
            })
            .collect();
        assert_eq!(hours, vec![18, 15, 9]);
    }

    #[test]
    fn test_busy_slots_include_synthetic_bookings() {
        let store = DemoStore::new();
        let id = store.allocate_id();
        store.insert_appointment(response(id, 10, AppointmentStatus::Pending));

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let slots = store.adjust_busy_slots(vec![], date);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].duration_minutes, 30);

        let other_day = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        assert!(store.adjust_busy_slots(vec![], other_day).is_empty());
    }

    #[test]
    fn test_busy_slots_respect_demo_cancellation_of_real_rows() {
        let store = DemoStore::new();
        store.override_appointment_status(42, AppointmentStatus::Cancelled);

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let real = vec![(
            42,
            BusySlot {
                starts_at: Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap(),
                duration_minutes: 30,
                status: AppointmentStatus::Pending,
                is_deleted_from_admin: false,
            },
        )];
        let slots = store.adjust_busy_slots(real, date);
        assert_eq!(slots[0].status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_review_moderation_overlay() {
        let store = DemoStore::new();
        let id = store.allocate_id();
        store.insert_review(review(id, ReviewStatus::Pending));
        store.override_review_status(id, ReviewStatus::Approved);
        store.override_review_status(42, ReviewStatus::Rejected);

        let merged = store.merge_reviews(vec![review(42, ReviewStatus::Approved)]);
        assert_eq!(merged.len(), 2);
        let by_id = |want: i32| merged.iter().find(|r| r.id == want).unwrap();
        assert_eq!(by_id(id).status, ReviewStatus::Approved);
        assert_eq!(by_id(42).status, ReviewStatus::Rejected);
    }

    #[test]
    fn test_day_slot_merge_carries_duration() {
        let store = DemoStore::new();
        let id = store.allocate_id();
        store.insert_appointment(response(id, 13, AppointmentStatus::Pending));

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let merged = store.merge_day_slots(vec![], date);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].service_duration, 30);
        assert_eq!(merged[0].id, id);
    }
}
