use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::dashboard::FacilityStore;
use crate::error::FetchError;
use crate::filters::SiteFilter;
use crate::models::{CateringEntry, Domain, MaintenanceTicket, Room, RoomStatus, TransportEntry};
use crate::stats;

const ROOM_COLUMNS: &str = "id, site, building_name, room_type, room_number, occupant, \
     check_in_date::text AS check_in_date, check_out_date::text AS check_out_date, \
     status, created_at, updated_at";

const MAINTENANCE_COLUMNS: &str = "id, site, building_name, room_number, reporter_name, \
     date_reported::text AS date_reported, date_resolved::text AS date_resolved, \
     reference, issue, priority, owner, notes, status, created_at";

const TRANSPORT_COLUMNS: &str = "id, registration_number, vehicle, site, driver_name, vehicle_type, \
     mileage, route, next_maintenance_date::text AS next_maintenance_date, notes, status, created_at";

const CATERING_COLUMNS: &str = "id, site, building_name, chef_name, shift, item, quantity, \
     date_reported::text AS date_reported, notes, status, created_at";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed [`FacilityStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(
        &self,
        domain: Domain,
        columns: &str,
        filter: &SiteFilter,
    ) -> Result<Vec<PgRow>, FetchError> {
        let mut query = format!("SELECT {columns} FROM {}", domain.table());
        if filter.as_site().is_some() {
            query.push_str(" WHERE site = $1");
        }
        query.push_str(" ORDER BY site, created_at");
        tracing::debug!(%domain, sql = %query, "fetching records");

        let mut rows = sqlx::query(&query);
        if let Some(site) = filter.as_site() {
            rows = rows.bind(site);
        }

        let records = rows
            .fetch_all(&self.pool)
            .await
            .map_err(|err| FetchError::store(domain, err))?;
        tracing::info!(%domain, count = records.len(), site = filter.label(), "fetched records");
        Ok(records)
    }
}

impl FacilityStore for PgStore {
    async fn fetch_rooms(&self, filter: &SiteFilter) -> Result<Vec<Room>, FetchError> {
        let rows = self.fetch_rows(Domain::Rooms, ROOM_COLUMNS, filter).await?;
        rows.iter()
            .map(room_from_row)
            .collect::<Result<_, _>>()
            .map_err(|err| FetchError::store(Domain::Rooms, err))
    }

    async fn fetch_maintenance(
        &self,
        filter: &SiteFilter,
    ) -> Result<Vec<MaintenanceTicket>, FetchError> {
        let rows = self
            .fetch_rows(Domain::Maintenance, MAINTENANCE_COLUMNS, filter)
            .await?;
        rows.iter()
            .map(ticket_from_row)
            .collect::<Result<_, _>>()
            .map_err(|err| FetchError::store(Domain::Maintenance, err))
    }

    async fn fetch_transport(
        &self,
        filter: &SiteFilter,
    ) -> Result<Vec<TransportEntry>, FetchError> {
        let rows = self
            .fetch_rows(Domain::Transport, TRANSPORT_COLUMNS, filter)
            .await?;
        rows.iter()
            .map(transport_from_row)
            .collect::<Result<_, _>>()
            .map_err(|err| FetchError::store(Domain::Transport, err))
    }

    async fn fetch_catering(&self, filter: &SiteFilter) -> Result<Vec<CateringEntry>, FetchError> {
        let rows = self
            .fetch_rows(Domain::Catering, CATERING_COLUMNS, filter)
            .await?;
        rows.iter()
            .map(catering_from_row)
            .collect::<Result<_, _>>()
            .map_err(|err| FetchError::store(Domain::Catering, err))
    }
}

fn room_from_row(row: &PgRow) -> Result<Room, sqlx::Error> {
    Ok(Room {
        id: row.try_get("id")?,
        site: row.try_get("site")?,
        building_name: row.try_get("building_name")?,
        room_type: row.try_get("room_type")?,
        room_number: row.try_get("room_number")?,
        occupant: row.try_get("occupant")?,
        check_in_date: row.try_get("check_in_date")?,
        check_out_date: row.try_get("check_out_date")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn ticket_from_row(row: &PgRow) -> Result<MaintenanceTicket, sqlx::Error> {
    Ok(MaintenanceTicket {
        id: row.try_get("id")?,
        site: row.try_get("site")?,
        building_name: row.try_get("building_name")?,
        room_number: row.try_get("room_number")?,
        reporter_name: row.try_get("reporter_name")?,
        date_reported: row.try_get("date_reported")?,
        date_resolved: row.try_get("date_resolved")?,
        reference: row.try_get("reference")?,
        issue: row.try_get("issue")?,
        priority: row.try_get("priority")?,
        owner: row.try_get("owner")?,
        notes: row.try_get("notes")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn transport_from_row(row: &PgRow) -> Result<TransportEntry, sqlx::Error> {
    Ok(TransportEntry {
        id: row.try_get("id")?,
        registration_number: row.try_get("registration_number")?,
        vehicle: row.try_get("vehicle")?,
        site: row.try_get("site")?,
        driver_name: row.try_get("driver_name")?,
        vehicle_type: row.try_get("vehicle_type")?,
        mileage: row.try_get("mileage")?,
        route: row.try_get("route")?,
        next_maintenance_date: row.try_get("next_maintenance_date")?,
        notes: row.try_get("notes")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn catering_from_row(row: &PgRow) -> Result<CateringEntry, sqlx::Error> {
    Ok(CateringEntry {
        id: row.try_get("id")?,
        site: row.try_get("site")?,
        building_name: row.try_get("building_name")?,
        chef_name: row.try_get("chef_name")?,
        shift: row.try_get("shift")?,
        item: row.try_get("item")?,
        quantity: row.try_get("quantity")?,
        date_reported: row.try_get("date_reported")?,
        notes: row.try_get("notes")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

#[derive(Debug, Deserialize)]
struct RoomRow {
    site: String,
    building_name: String,
    room_type: String,
    room_number: String,
    occupant: Option<String>,
    check_in_date: Option<String>,
    check_out_date: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MaintenanceRow {
    site: String,
    building_name: String,
    room_number: String,
    reporter_name: String,
    date_reported: Option<String>,
    date_resolved: Option<String>,
    reference: Option<String>,
    issue: Option<String>,
    priority: Option<String>,
    owner: Option<String>,
    notes: Option<String>,
    status: Option<String>,
    source_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransportRow {
    site: String,
    driver_name: String,
    vehicle: String,
    registration_number: String,
    #[serde(rename = "type")]
    vehicle_type: Option<String>,
    route: String,
    next_maintenance_date: Option<String>,
    mileage: Option<i32>,
    notes: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CateringRow {
    site: String,
    building_name: String,
    chef_name: String,
    shift: String,
    item: Option<String>,
    quantity: Option<i32>,
    date_reported: Option<String>,
    notes: Option<String>,
    status: Option<String>,
    source_key: Option<String>,
}

/// Resolves an optional date cell to a calendar day. Unparseable text is
/// stored as NULL rather than rejecting the row.
fn storage_date(field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let raw = value.map(str::trim).filter(|raw| !raw.is_empty())?;
    let parsed = stats::parse_record_date(raw).map(|when| when.date_naive());
    if parsed.is_none() {
        tracing::warn!(field, value = raw, "unparseable date, storing NULL");
    }
    parsed
}

/// Normalises a report timestamp for storage. Date-only cells stay a plain
/// date; anything with a time of day is kept as RFC 3339 with its offset.
fn storage_timestamp(field: &str, value: Option<&str>) -> Option<String> {
    let raw = value.map(str::trim).filter(|raw| !raw.is_empty())?;
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    let parsed = stats::parse_record_date(raw).map(|when| when.to_rfc3339());
    if parsed.is_none() {
        tracing::warn!(field, value = raw, "unparseable timestamp, storing NULL");
    }
    parsed
}

/// Rooms without a recognised status are derived from the occupant.
fn storage_room_status(row: &RoomRow) -> &'static str {
    match row.status.as_deref().and_then(RoomStatus::parse) {
        Some(status) => status.as_str(),
        None => {
            let occupied = row
                .occupant
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty());
            if occupied {
                RoomStatus::Occupied.as_str()
            } else {
                RoomStatus::Vacant.as_str()
            }
        }
    }
}

async fn insert_room(pool: &PgPool, row: &RoomRow) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO facility.rooms
        (id, site, building_name, room_type, room_number, occupant, check_in_date, check_out_date, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (site, room_number) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&row.site)
    .bind(&row.building_name)
    .bind(&row.room_type)
    .bind(&row.room_number)
    .bind(&row.occupant)
    .bind(storage_date("check_in_date", row.check_in_date.as_deref()))
    .bind(storage_date("check_out_date", row.check_out_date.as_deref()))
    .bind(storage_room_status(row))
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert room {} at {}", row.room_number, row.site))?;

    Ok(result.rows_affected() > 0)
}

async fn insert_ticket(pool: &PgPool, row: &MaintenanceRow) -> anyhow::Result<bool> {
    let source_key = row
        .source_key
        .clone()
        .or_else(|| row.reference.clone())
        .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

    let result = sqlx::query(
        r#"
        INSERT INTO facility.maintenance
        (id, site, building_name, room_number, reporter_name, date_reported, date_resolved,
         reference, issue, priority, owner, notes, status, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&row.site)
    .bind(&row.building_name)
    .bind(&row.room_number)
    .bind(&row.reporter_name)
    .bind(storage_timestamp("date_reported", row.date_reported.as_deref()))
    .bind(storage_timestamp("date_resolved", row.date_resolved.as_deref()))
    .bind(&row.reference)
    .bind(&row.issue)
    .bind(&row.priority)
    .bind(&row.owner)
    .bind(&row.notes)
    .bind(&row.status)
    .bind(&source_key)
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert maintenance ticket {source_key}"))?;

    Ok(result.rows_affected() > 0)
}

async fn insert_vehicle(pool: &PgPool, row: &TransportRow) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO facility.transport
        (id, registration_number, vehicle, site, driver_name, vehicle_type, mileage, route,
         next_maintenance_date, notes, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (registration_number) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&row.registration_number)
    .bind(&row.vehicle)
    .bind(&row.site)
    .bind(&row.driver_name)
    .bind(&row.vehicle_type)
    .bind(row.mileage.unwrap_or(0))
    .bind(&row.route)
    .bind(storage_date("next_maintenance_date", row.next_maintenance_date.as_deref()))
    .bind(&row.notes)
    .bind(&row.status)
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert vehicle {}", row.registration_number))?;

    Ok(result.rows_affected() > 0)
}

async fn insert_meal(pool: &PgPool, row: &CateringRow) -> anyhow::Result<bool> {
    let source_key = row
        .source_key
        .clone()
        .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

    let result = sqlx::query(
        r#"
        INSERT INTO facility.catering
        (id, site, building_name, chef_name, shift, item, quantity, date_reported, notes, status, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&row.site)
    .bind(&row.building_name)
    .bind(&row.chef_name)
    .bind(&row.shift)
    .bind(&row.item)
    .bind(row.quantity)
    .bind(storage_timestamp("date_reported", row.date_reported.as_deref()))
    .bind(&row.notes)
    .bind(&row.status)
    .bind(&source_key)
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert catering entry {source_key}"))?;

    Ok(result.rows_affected() > 0)
}

pub async fn import_csv(pool: &PgPool, domain: Domain, csv_path: &Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    match domain {
        Domain::Rooms => {
            for result in reader.deserialize::<RoomRow>() {
                if insert_room(pool, &result?).await? {
                    inserted += 1;
                }
            }
        }
        Domain::Maintenance => {
            for result in reader.deserialize::<MaintenanceRow>() {
                if insert_ticket(pool, &result?).await? {
                    inserted += 1;
                }
            }
        }
        Domain::Transport => {
            for result in reader.deserialize::<TransportRow>() {
                if insert_vehicle(pool, &result?).await? {
                    inserted += 1;
                }
            }
        }
        Domain::Catering => {
            for result in reader.deserialize::<CateringRow>() {
                if insert_meal(pool, &result?).await? {
                    inserted += 1;
                }
            }
        }
    }

    tracing::info!(%domain, inserted, path = %csv_path.display(), "csv import finished");
    Ok(inserted)
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let rooms = [
        ("Kempton Park | CJ", "The Diamond", "Bachelor S", "DM0101", Some("Mabel Mulaudzi"), "Occupied"),
        ("Kempton Park | CJ", "Onyx", "2 Bedroom M", "ON0120", Some("Dirk Steenkamp"), "Occupied"),
        ("Pretoria CBD", "Res Building", "2 Bedroom S", "RS443", Some("Henrie Schalk"), "Occupied"),
        ("Pretoria CBD", "Res Building", "Bachelor L", "RS421", None, "Maintenance"),
        ("Capital Park", "Students", "Bachelor S", "CS43", Some("Zingisa Mabe"), "Occupied"),
        ("Capital Park", "Res Building", "2 Bedroom", "CR34", None, "Vacant"),
        ("Olievenhoutbosch", "Main", "2 Bedroom M", "OM54", Some("Sipho Dlamini"), "Occupied"),
        ("Benoni | Tom Jones", "Tom Jones", "2 Bedroom", "BT85", None, "Reserved"),
    ];

    let tickets = [
        ("seed-DP2343", "Kempton Park | CJ", "Onyx", "ON0120", "Thandiwe Nxesi", Some("2025-02-12"), Some("2025-02-19"), Some("DP2343"), Some("Leaking Tap"), Some("High"), Some("Maintenance"), Some("Completed Quickly"), Some("Completed")),
        ("seed-res-cbd", "Pretoria CBD", "Res Building", "SS210", "Lwazi Cele", Some("2025-02-16"), None, None, Some("Res to CBD Campus"), None, None, None, Some("Pending")),
        ("seed-DP7653", "Capital Park", "Res Building", "RS421", "Nqobile Mabasa", Some("2025-02-19"), None, Some("DP7653"), Some("Window Stuck"), Some("Low"), Some("Handy Guy"), Some("Appointment with Service Provider set"), Some("Scheduled")),
        ("seed-res-olv", "Olievenhoutbosch", "Main", "OM54", "Mpho Makhanya", Some("2025-02-18"), None, None, Some("Res to Campus 2"), None, None, None, Some("Pending")),
        ("seed-DP7765", "Benoni | Tom Jones", "Tom Jones", "BT85", "Banele Shabalala", Some("2025-02-24"), None, Some("DP7765"), Some("Missing Bathroom Key"), Some("Medium"), Some("Locksmith"), Some("Awaiting Service Provider"), Some("In Progress")),
    ];

    let fleet = [
        ("Kempton Park | CJ", "Mbali Mthembu", "Iveco", "SD43THGP", "Mini Bus", "Res to Campus 1", "2025-03-17", 124_000, Some("New driver still learning")),
        ("Pretoria CBD", "Andile Mdletshe", "Siyaya", "LD98GHGP", "Mini Bus", "Res to CBD Campus", "2025-04-05", 236_000, Some("Car needs tracker")),
        ("Capital Park", "Nosipho Gumede", "Bus", "GY34FDGP", "Bus", "Res to Campus 3", "2025-08-12", 0, None),
        ("Olievenhoutbosch", "Tshepo Phiri", "Quantum", "GT67TDGP", "Mini Bus", "Res to Campus 2", "2025-06-29", 0, Some("Experienced Driver")),
        ("Benoni | Tom Jones", "Xolani Madikizela", "Bus", "DL56DGGP", "Bus", "Res to Campus Gate 3", "2025-05-16", 0, None),
    ];

    let meals = [
        ("seed-meal-onyx", "Kempton Park | CJ", "Onyx", "Gugu Hlophe", "06:00 - 14:00", Some("Juice"), Some(4), Some("2025-03-12"), Some("Experienced Chef"), Some("Open")),
        ("seed-meal-res-cbd", "Pretoria CBD", "Res Building", "Khanyisile Mlambo", "06:00 - 14:00", None, None, None, None, None),
        ("seed-meal-capital", "Capital Park", "Res Building", "Sibusiso Nxumalo", "07:00 - 15:00", None, None, None, None, None),
        ("seed-meal-tom-jones", "Benoni | Tom Jones", "Tom Jones", "Dumisani Sithole", "13:00 - 21:00", None, None, None, Some("Pastry Chef"), None),
    ];

    let mut inserted = 0usize;

    for (site, building, room_type, number, occupant, status) in rooms {
        let row = RoomRow {
            site: site.to_string(),
            building_name: building.to_string(),
            room_type: room_type.to_string(),
            room_number: number.to_string(),
            occupant: owned(occupant),
            check_in_date: None,
            check_out_date: None,
            status: Some(status.to_string()),
        };
        if insert_room(pool, &row).await? {
            inserted += 1;
        }
    }

    for (key, site, building, room, reporter, reported, resolved, reference, issue, priority, owner, notes, status) in tickets {
        let row = MaintenanceRow {
            site: site.to_string(),
            building_name: building.to_string(),
            room_number: room.to_string(),
            reporter_name: reporter.to_string(),
            date_reported: owned(reported),
            date_resolved: owned(resolved),
            reference: owned(reference),
            issue: owned(issue),
            priority: owned(priority),
            owner: owned(owner),
            notes: owned(notes),
            status: owned(status),
            source_key: Some(key.to_string()),
        };
        if insert_ticket(pool, &row).await? {
            inserted += 1;
        }
    }

    for (site, driver, vehicle, registration, vehicle_type, route, next_service, mileage, notes) in fleet {
        let row = TransportRow {
            site: site.to_string(),
            driver_name: driver.to_string(),
            vehicle: vehicle.to_string(),
            registration_number: registration.to_string(),
            vehicle_type: Some(vehicle_type.to_string()),
            route: route.to_string(),
            next_maintenance_date: Some(next_service.to_string()),
            mileage: Some(mileage),
            notes: owned(notes),
            status: Some("Active".to_string()),
        };
        if insert_vehicle(pool, &row).await? {
            inserted += 1;
        }
    }

    for (key, site, building, chef, shift, item, quantity, date, notes, status) in meals {
        let row = CateringRow {
            site: site.to_string(),
            building_name: building.to_string(),
            chef_name: chef.to_string(),
            shift: shift.to_string(),
            item: owned(item),
            quantity,
            date_reported: owned(date),
            notes: owned(notes),
            status: owned(status),
            source_key: Some(key.to_string()),
        };
        if insert_meal(pool, &row).await? {
            inserted += 1;
        }
    }

    tracing::info!(inserted, "seed data applied");
    Ok(inserted)
}
