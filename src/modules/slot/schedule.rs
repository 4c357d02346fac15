use crate::types::ScheduleContext;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Candidate pickup slots for one date: half-open window
/// `[open_hour, close_hour)` stepped by the configured interval, all UTC.
/// A misconfigured window (open at or past close, zero interval, hour out
/// of range) yields no slots rather than a panic.
pub fn generate_slots(date: NaiveDate, schedule: &ScheduleContext) -> Vec<DateTime<Utc>> {
    if schedule.slot_interval_minutes == 0 {
        return Vec::new();
    }

    let (open, close) = match (
        date.and_hms_opt(schedule.open_hour, 0, 0),
        date.and_hms_opt(schedule.close_hour, 0, 0),
    ) {
        (Some(open), Some(close)) => (Utc.from_utc_datetime(&open), Utc.from_utc_datetime(&close)),
        _ => return Vec::new(),
    };

    let step = Duration::minutes(schedule.slot_interval_minutes as i64);
    let mut slots = Vec::new();
    let mut current = open;

    while current < close {
        slots.push(current);
        current += step;
    }

    slots
}

/// Canonical wire/storage encoding of a slot instant. Occupancy counting
/// relies on exact string equality of `orders.slot_time`, so every write
/// must go through this one encoder.
pub fn slot_key(slot: &DateTime<Utc>) -> String {
    slot.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_slot_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|slot| slot.with_timezone(&Utc))
}

/// Whether the instant is one of the generated slots for its own date.
pub fn is_on_grid(slot: DateTime<Utc>, schedule: &ScheduleContext) -> bool {
    generate_slots(slot.date_naive(), schedule).contains(&slot)
}
