use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::Serialize;

use crate::models::{AppointmentStatus, WorkingHours};

/// Why a candidate slot cannot be booked. Serialized verbatim so the SPA can
/// pick the matching localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotRejection {
    PastTime,
    OutsideWorkingHours,
    SlotTaken,
}

impl SlotRejection {
    pub fn as_code(&self) -> &'static str {
        match self {
            SlotRejection::PastTime => "PAST_TIME",
            SlotRejection::OutsideWorkingHours => "OUTSIDE_WORKING_HOURS",
            SlotRejection::SlotTaken => "SLOT_TAKEN",
        }
    }
}

/// An already-recorded appointment, reduced to what conflict detection needs.
#[derive(Debug, Clone)]
pub struct BusySlot {
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub is_deleted_from_admin: bool,
}

/// Strict "HH:mm" parser. Rejects unpadded and out-of-range values instead of
/// coercing them.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    if value.len() != 5 || value.as_bytes()[2] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// The whole system books at minute resolution; seconds are dropped on every
/// comparison and on write.
pub fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Half-open UTC window covering one calendar date, for range queries against
/// timestamptz columns. Binding instants instead of casting to a date keeps
/// day membership on the UTC day whatever timezone the database session runs
/// in. The end saturates at the last day of the calendar.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = date
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// The single bookability rule. Checks run in order and short-circuit:
/// the slot must be in the future, inside the day's working hours when the
/// day has any, and its window must not overlap a live appointment's window.
///
/// Working hours restrict the start instant only, so a booking may run past
/// closing time. Both bounds are inclusive. Windows are widened to at least
/// one minute so zero-duration services degrade to same-minute equality.
pub fn check_slot(
    now: DateTime<Utc>,
    starts_at: DateTime<Utc>,
    duration_minutes: i32,
    hours: Option<&WorkingHours>,
    existing: &[BusySlot],
) -> Result<(), SlotRejection> {
    let starts_at = truncate_to_minute(starts_at);

    if starts_at <= now {
        return Err(SlotRejection::PastTime);
    }

    if let Some(hours) = hours {
        if let (Some(open), Some(close)) =
            (parse_hhmm(&hours.start_time), parse_hhmm(&hours.end_time))
        {
            let time = starts_at.time();
            if time < open || time > close {
                return Err(SlotRejection::OutsideWorkingHours);
            }
        }
    }

    let candidate = window(starts_at, duration_minutes);
    for slot in existing {
        if slot.is_deleted_from_admin || !slot.status.blocks_slot() {
            continue;
        }
        let occupied = window(truncate_to_minute(slot.starts_at), slot.duration_minutes);
        if overlaps(candidate, occupied) {
            return Err(SlotRejection::SlotTaken);
        }
    }

    Ok(())
}

// Serde accepts expanded-year timestamps right up against chrono's range,
// so the window end saturates instead of overflowing.
fn window(starts_at: DateTime<Utc>, duration_minutes: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let minutes = i64::from(duration_minutes.max(1));
    let ends_at = starts_at
        .checked_add_signed(Duration::minutes(minutes))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (starts_at, ends_at)
}

// Half-open interval overlap: back-to-back bookings do not collide.
fn overlaps(a: (DateTime<Utc>, DateTime<Utc>), b: (DateTime<Utc>, DateTime<Utc>)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn dt(h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, min, 0).unwrap()
    }

    fn hours(start: &str, end: &str) -> WorkingHours {
        WorkingHours {
            id: 1,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn busy(starts_at: DateTime<Utc>, duration: i32, status: AppointmentStatus) -> BusySlot {
        BusySlot {
            starts_at,
            duration_minutes: duration,
            status,
            is_deleted_from_admin: false,
        }
    }

    fn now() -> DateTime<Utc> {
        dt(8, 0)
    }

    #[test]
    fn test_unrestricted_day_never_fails_working_hours() {
        // 03:30 next day, no hours row anywhere near it
        let candidate = Utc.with_ymd_and_hms(2025, 3, 11, 3, 30, 0).unwrap();
        assert_eq!(check_slot(now(), candidate, 30, None, &[]), Ok(()));
    }

    #[test]
    fn test_past_time_rejected_before_anything_else() {
        let yesterday = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        // A conflicting slot exists too; PAST_TIME still wins.
        let taken = busy(yesterday, 30, AppointmentStatus::Pending);
        assert_eq!(
            check_slot(now(), yesterday, 30, Some(&hours("09:00", "17:00")), &[taken]),
            Err(SlotRejection::PastTime)
        );
    }

    #[test]
    fn test_exactly_now_is_past() {
        assert_eq!(
            check_slot(now(), now(), 30, None, &[]),
            Err(SlotRejection::PastTime)
        );
    }

    #[test]
    fn test_working_hours_bounds_inclusive() {
        let h = hours("09:00", "17:00");
        assert_eq!(check_slot(now(), dt(9, 0), 30, Some(&h), &[]), Ok(()));
        assert_eq!(check_slot(now(), dt(17, 0), 30, Some(&h), &[]), Ok(()));
        assert_eq!(
            check_slot(now(), dt(8, 59), 30, Some(&h), &[]),
            Err(SlotRejection::OutsideWorkingHours)
        );
        assert_eq!(
            check_slot(now(), dt(17, 1), 30, Some(&h), &[]),
            Err(SlotRejection::OutsideWorkingHours)
        );
    }

    #[test]
    fn test_duration_may_run_past_closing_time() {
        let h = hours("09:00", "17:00");
        assert_eq!(check_slot(now(), dt(16, 45), 30, Some(&h), &[]), Ok(()));
    }

    #[test]
    fn test_exact_slot_collision() {
        let existing = busy(dt(16, 45), 30, AppointmentStatus::Pending);
        assert_eq!(
            check_slot(now(), dt(16, 45), 30, Some(&hours("09:00", "17:00")), &[existing]),
            Err(SlotRejection::SlotTaken)
        );
    }

    #[test]
    fn test_overlap_inside_existing_window() {
        let existing = busy(dt(10, 0), 60, AppointmentStatus::Confirmed);
        assert_eq!(
            check_slot(now(), dt(10, 30), 30, None, &[existing]),
            Err(SlotRejection::SlotTaken)
        );
    }

    #[test]
    fn test_back_to_back_is_free() {
        let existing = busy(dt(10, 0), 60, AppointmentStatus::Confirmed);
        assert_eq!(
            check_slot(now(), dt(11, 0), 30, None, &[existing.clone()]),
            Ok(())
        );
        assert_eq!(check_slot(now(), dt(9, 30), 30, None, &[existing]), Ok(()));
    }

    #[test]
    fn test_cancelled_and_completed_do_not_block() {
        let cancelled = busy(dt(14, 0), 30, AppointmentStatus::Cancelled);
        let completed = busy(dt(14, 0), 30, AppointmentStatus::Completed);
        assert_eq!(
            check_slot(now(), dt(14, 0), 30, None, &[cancelled, completed]),
            Ok(())
        );
    }

    #[test]
    fn test_admin_deleted_does_not_block() {
        let mut hidden = busy(dt(14, 0), 30, AppointmentStatus::Confirmed);
        hidden.is_deleted_from_admin = true;
        assert_eq!(check_slot(now(), dt(14, 0), 30, None, &[hidden]), Ok(()));
    }

    #[test]
    fn test_zero_duration_degrades_to_same_minute_equality() {
        let existing = busy(dt(12, 0), 0, AppointmentStatus::Pending);
        assert_eq!(
            check_slot(now(), dt(12, 0), 0, None, &[existing.clone()]),
            Err(SlotRejection::SlotTaken)
        );
        assert_eq!(check_slot(now(), dt(12, 1), 0, None, &[existing]), Ok(()));
    }

    #[test]
    fn test_zero_duration_inside_interval_still_blocked() {
        let existing = busy(dt(12, 0), 60, AppointmentStatus::Pending);
        assert_eq!(
            check_slot(now(), dt(12, 30), 0, None, &[existing]),
            Err(SlotRejection::SlotTaken)
        );
    }

    #[test]
    fn test_seconds_are_ignored() {
        let existing = busy(
            Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 42).unwrap(),
            30,
            AppointmentStatus::Pending,
        );
        let candidate = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 7).unwrap();
        assert_eq!(
            check_slot(now(), candidate, 30, None, &[existing]),
            Err(SlotRejection::SlotTaken)
        );
    }

    #[test]
    fn test_parse_hhmm_strictness() {
        assert!(parse_hhmm("09:00").is_some());
        assert!(parse_hhmm("23:59").is_some());
        assert!(parse_hhmm("9:00").is_none());
        assert!(parse_hhmm("09:0").is_none());
        assert!(parse_hhmm("24:00").is_none());
        assert!(parse_hhmm("09:60").is_none());
        assert!(parse_hhmm("0900").is_none());
        assert!(parse_hhmm("ab:cd").is_none());
    }

    #[test]
    fn test_far_future_candidate_never_overflows() {
        // Expanded-year RFC 3339 arrives through serde untouched.
        let candidate: DateTime<Utc> =
            serde_json::from_str("\"+262142-12-31T23:00:00Z\"").unwrap();
        assert_eq!(check_slot(now(), candidate, 90, None, &[]), Ok(()));

        let taken = busy(candidate, 30, AppointmentStatus::Confirmed);
        assert_eq!(
            check_slot(now(), candidate, 90, None, &[taken]),
            Err(SlotRejection::SlotTaken)
        );

        let edge = truncate_to_minute(DateTime::<Utc>::MAX_UTC);
        assert_eq!(check_slot(now(), edge, i32::MAX, None, &[]), Ok(()));
    }

    #[test]
    fn test_day_bounds_are_half_open() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(start, dt(0, 0));
        assert!(dt(23, 59) < end);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_bounds_saturate_at_calendar_end() {
        let (start, end) = day_bounds(NaiveDate::MAX);
        assert!(start < end);
        assert_eq!(end, DateTime::<Utc>::MAX_UTC);
    }
}
