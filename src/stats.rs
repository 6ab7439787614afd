use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::models::{
    CateringEntry, CateringStats, MaintenanceStats, MaintenanceTicket, Room, RoomStats, RoomStatus,
    StatsSnapshot, TransportEntry, TransportStats,
};

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const SECONDS_PER_DAY: i64 = 86_400;

pub fn compute_stats(
    rooms: &[Room],
    maintenance: &[MaintenanceTicket],
    transport: &[TransportEntry],
    catering: &[CateringEntry],
) -> StatsSnapshot {
    compute_stats_at(rooms, maintenance, transport, catering, Local::now())
}

/// Same as [`compute_stats`] with the reference instant supplied by the caller.
/// Every date comparison in one call uses `now`.
pub fn compute_stats_at(
    rooms: &[Room],
    maintenance: &[MaintenanceTicket],
    transport: &[TransportEntry],
    catering: &[CateringEntry],
    now: DateTime<Local>,
) -> StatsSnapshot {
    StatsSnapshot {
        rooms: room_stats(rooms),
        maintenance: maintenance_stats(maintenance),
        transport: transport_stats(transport),
        catering: catering_stats(catering, now),
    }
}

pub fn room_stats(rooms: &[Room]) -> RoomStats {
    let occupied = rooms.iter().filter(|room| room.is_occupied()).count();

    RoomStats {
        total: rooms.len(),
        occupied,
        available: rooms.len() - occupied,
        maintenance: rooms
            .iter()
            .filter(|room| room.room_status() == Some(RoomStatus::Maintenance))
            .count(),
    }
}

pub fn maintenance_stats(tickets: &[MaintenanceTicket]) -> MaintenanceStats {
    MaintenanceStats {
        total: tickets.len(),
        high_priority: count_matching(tickets, |t| t.priority.as_deref(), "high"),
        in_progress: count_matching(tickets, |t| t.status.as_deref(), "in progress"),
        completed: count_matching(tickets, |t| t.status.as_deref(), "completed"),
    }
}

pub fn transport_stats(entries: &[TransportEntry]) -> TransportStats {
    TransportStats {
        total: entries.len(),
        active: count_matching(entries, |e| e.status.as_deref(), "active"),
        completed: count_matching(entries, |e| e.status.as_deref(), "completed"),
        pending: count_matching(entries, |e| e.status.as_deref(), "pending"),
    }
}

pub fn catering_stats(entries: &[CateringEntry], now: DateTime<Local>) -> CateringStats {
    let today = now.date_naive();
    let mut stats = CateringStats {
        total: entries.len(),
        completed: count_matching(entries, |e| e.status.as_deref(), "completed"),
        ..CateringStats::default()
    };

    for entry in entries {
        let Some(when) = entry.date_reported.as_deref().and_then(parse_record_date) else {
            continue;
        };
        if when.date_naive() == today {
            stats.today += 1;
        }
        if when > now {
            stats.upcoming += 1;
        }
    }

    stats
}

/// Case-insensitive, whitespace-trimmed label comparison. `None` never matches.
pub fn label_is(value: Option<&str>, expected: &str) -> bool {
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case(expected))
}

fn count_matching<T>(items: &[T], field: impl Fn(&T) -> Option<&str>, expected: &str) -> usize {
    items
        .iter()
        .filter(|item| label_is(field(*item), expected))
        .count()
}

/// Parses a stored date or timestamp into local time. Date-only values resolve
/// to local midnight. Unparseable text yields `None`.
pub fn parse_record_date(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local));
    }

    // Postgres timestamptz text form, e.g. "2025-03-12 10:00:00+00"
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%#z") {
        return Some(parsed.with_timezone(&Local));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Local
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .earliest()
}

/// Whole days a ticket has been open, rounded up. Future dates count as zero.
pub fn days_open(date_reported: Option<&str>, now: DateTime<Local>) -> Option<i64> {
    let reported = parse_record_date(date_reported?)?;
    let elapsed = (now - reported).num_seconds().max(0);
    Some((elapsed + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY)
}
