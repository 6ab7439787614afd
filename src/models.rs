use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Which record collection a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Domain {
    Rooms,
    Maintenance,
    Transport,
    Catering,
}

impl Domain {
    pub fn table(self) -> &'static str {
        match self {
            Domain::Rooms => "facility.rooms",
            Domain::Maintenance => "facility.maintenance",
            Domain::Transport => "facility.transport",
            Domain::Catering => "facility.catering",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Domain::Rooms => "rooms",
            Domain::Maintenance => "maintenance",
            Domain::Transport => "transport",
            Domain::Catering => "catering",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Occupied,
    Vacant,
    Maintenance,
    Reserved,
}

impl RoomStatus {
    /// Case-insensitive parse; anything outside the closed set is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "occupied" => Some(RoomStatus::Occupied),
            "vacant" => Some(RoomStatus::Vacant),
            "maintenance" => Some(RoomStatus::Maintenance),
            "reserved" => Some(RoomStatus::Reserved),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Occupied => "Occupied",
            RoomStatus::Vacant => "Vacant",
            RoomStatus::Maintenance => "Maintenance",
            RoomStatus::Reserved => "Reserved",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: Uuid,
    pub site: String,
    pub building_name: String,
    pub room_type: String,
    pub room_number: String,
    pub occupant: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn is_occupied(&self) -> bool {
        self.occupant
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }

    pub fn room_status(&self) -> Option<RoomStatus> {
        RoomStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceTicket {
    pub id: Uuid,
    pub site: String,
    pub building_name: String,
    pub room_number: String,
    pub reporter_name: String,
    pub date_reported: Option<String>,
    pub date_resolved: Option<String>,
    pub reference: Option<String>,
    pub issue: Option<String>,
    pub priority: Option<String>,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransportEntry {
    pub id: Uuid,
    pub registration_number: String,
    pub vehicle: String,
    pub site: String,
    pub driver_name: String,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub mileage: i32,
    pub route: String,
    pub next_maintenance_date: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CateringEntry {
    pub id: Uuid,
    pub site: String,
    pub building_name: String,
    pub chef_name: String,
    pub shift: String,
    pub item: Option<String>,
    pub quantity: Option<i32>,
    pub date_reported: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Records that carry a site tag.
pub trait SiteScoped {
    fn site(&self) -> &str;
}

impl SiteScoped for Room {
    fn site(&self) -> &str {
        &self.site
    }
}

impl SiteScoped for MaintenanceTicket {
    fn site(&self) -> &str {
        &self.site
    }
}

impl SiteScoped for TransportEntry {
    fn site(&self) -> &str {
        &self.site
    }
}

impl SiteScoped for CateringEntry {
    fn site(&self) -> &str {
        &self.site
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
    pub maintenance: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStats {
    pub total: usize,
    pub high_priority: usize,
    pub in_progress: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CateringStats {
    pub total: usize,
    pub today: usize,
    pub upcoming: usize,
    pub completed: usize,
}

/// Counts behind the dashboard summary cards. Recomputed on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub rooms: RoomStats,
    pub maintenance: MaintenanceStats,
    pub transport: TransportStats,
    pub catering: CateringStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    pub site: String,
    pub rooms: usize,
    pub open_tickets: usize,
    pub vehicles: usize,
    pub catering_entries: usize,
}
