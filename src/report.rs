use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::dashboard::DashboardData;
use crate::filters::{self, SiteFilter};
use crate::models::{MaintenanceTicket, SiteSummary, StatsSnapshot};
use crate::severity::{priority_severity, status_severity};
use crate::stats;

fn site_entry<'m, 'a>(
    map: &'m mut BTreeMap<&'a str, SiteSummary>,
    site: &'a str,
) -> &'m mut SiteSummary {
    map.entry(site).or_insert_with(|| SiteSummary {
        site: site.to_string(),
        rooms: 0,
        open_tickets: 0,
        vehicles: 0,
        catering_entries: 0,
    })
}

pub fn summarize_by_site(data: &DashboardData) -> Vec<SiteSummary> {
    let mut map: BTreeMap<&str, SiteSummary> = BTreeMap::new();

    for room in &data.rooms {
        site_entry(&mut map, &room.site).rooms += 1;
    }
    for ticket in &data.maintenance {
        let entry = site_entry(&mut map, &ticket.site);
        if filters::is_open(ticket) {
            entry.open_tickets += 1;
        }
    }
    for vehicle in &data.transport {
        site_entry(&mut map, &vehicle.site).vehicles += 1;
    }
    for meal in &data.catering {
        site_entry(&mut map, &meal.site).catering_entries += 1;
    }

    map.into_values().collect()
}

/// Open tickets with their age, oldest first. Undated tickets sort last.
pub fn open_tickets_by_age(
    tickets: &[MaintenanceTicket],
    now: DateTime<Local>,
) -> Vec<(MaintenanceTicket, Option<i64>)> {
    let (open, _) = filters::split_tickets(tickets);
    let mut aged: Vec<(MaintenanceTicket, Option<i64>)> = open
        .into_iter()
        .map(|ticket| {
            let age = stats::days_open(ticket.date_reported.as_deref(), now);
            (ticket, age)
        })
        .collect();

    aged.sort_by(|a, b| b.1.cmp(&a.1));
    aged
}

pub fn write_summary_cards(output: &mut String, snapshot: &StatsSnapshot) {
    let rooms = &snapshot.rooms;
    let maintenance = &snapshot.maintenance;
    let transport = &snapshot.transport;
    let catering = &snapshot.catering;

    let _ = writeln!(
        output,
        "- Rooms: {} total, {} occupied, {} available, {} under maintenance",
        rooms.total, rooms.occupied, rooms.available, rooms.maintenance
    );
    let _ = writeln!(
        output,
        "- Maintenance: {} total, {} high priority, {} in progress, {} completed",
        maintenance.total, maintenance.high_priority, maintenance.in_progress, maintenance.completed
    );
    let _ = writeln!(
        output,
        "- Transport: {} total, {} active, {} pending, {} completed",
        transport.total, transport.active, transport.pending, transport.completed
    );
    let _ = writeln!(
        output,
        "- Catering: {} total, {} today, {} upcoming, {} completed",
        catering.total, catering.today, catering.upcoming, catering.completed
    );
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

pub fn build_report(filter: &SiteFilter, data: &DashboardData, now: DateTime<Local>) -> String {
    let snapshot = data.stats_at(now);
    let sites = summarize_by_site(data);
    let open_tickets = open_tickets_by_age(&data.maintenance, now);
    let (_, mut closed_tickets) = filters::split_tickets(&data.maintenance);
    closed_tickets.sort_by(|a, b| b.date_resolved.cmp(&a.date_resolved));

    let mut output = String::new();

    let _ = writeln!(output, "# Facility Dashboard Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        filter.label(),
        now.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    write_summary_cards(&mut output, &snapshot);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sites");

    if sites.is_empty() {
        let _ = writeln!(output, "No records for this selection.");
    } else {
        for site in &sites {
            let _ = writeln!(
                output,
                "- {}: {} rooms, {} open tickets, {} vehicles, {} catering entries",
                site.site, site.rooms, site.open_tickets, site.vehicles, site.catering_entries
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Open Maintenance Tickets");

    if open_tickets.is_empty() {
        let _ = writeln!(output, "No open tickets.");
    } else {
        for (ticket, age) in &open_tickets {
            let age = match age {
                Some(days) => format!("{days} days open"),
                None => "age unknown".to_string(),
            };
            let _ = writeln!(
                output,
                "- [{}] {} ({} {}, {}): {} priority [{}], status {} [{}], {}",
                or_dash(ticket.reference.as_deref()),
                or_dash(ticket.issue.as_deref()),
                ticket.building_name,
                ticket.room_number,
                ticket.site,
                or_dash(ticket.priority.as_deref()),
                priority_severity(ticket.priority.as_deref()),
                or_dash(ticket.status.as_deref()),
                status_severity(ticket.status.as_deref()),
                age
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recently Closed");

    if closed_tickets.is_empty() {
        let _ = writeln!(output, "No closed tickets.");
    } else {
        for ticket in closed_tickets.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) resolved {}",
                or_dash(ticket.issue.as_deref()),
                ticket.site,
                or_dash(ticket.date_resolved.as_deref())
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CateringEntry, Room, TransportEntry};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 2, 26, 9, 0, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn ticket(site: &str, reported: Option<&str>, status: Option<&str>) -> MaintenanceTicket {
        MaintenanceTicket {
            id: Uuid::new_v4(),
            site: site.to_string(),
            building_name: "Res Building".to_string(),
            room_number: "RS421".to_string(),
            reporter_name: "Nqobile Mabasa".to_string(),
            date_reported: reported.map(str::to_string),
            date_resolved: None,
            reference: Some("DP7653".to_string()),
            issue: Some("Window Stuck".to_string()),
            priority: Some("Low".to_string()),
            owner: None,
            notes: None,
            status: status.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn sample_data() -> DashboardData {
        DashboardData {
            rooms: vec![Room {
                id: Uuid::new_v4(),
                site: "Capital Park".to_string(),
                building_name: "Students".to_string(),
                room_type: "Bachelor S".to_string(),
                room_number: "CS43".to_string(),
                occupant: Some("Zingisa Mabe".to_string()),
                check_in_date: None,
                check_out_date: None,
                status: "Occupied".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }],
            maintenance: vec![
                ticket("Capital Park", Some("2025-02-19"), Some("Scheduled")),
                ticket("Pretoria CBD", Some("2025-02-24"), Some("Pending")),
                ticket("Pretoria CBD", Some("2025-02-12"), Some("Completed")),
            ],
            transport: vec![TransportEntry {
                id: Uuid::new_v4(),
                registration_number: "GY34FDGP".to_string(),
                vehicle: "Bus".to_string(),
                site: "Capital Park".to_string(),
                driver_name: "Nosipho Gumede".to_string(),
                vehicle_type: Some("Bus".to_string()),
                mileage: 0,
                route: "Res to Campus 3".to_string(),
                next_maintenance_date: None,
                notes: None,
                status: Some("Active".to_string()),
                created_at: Utc::now(),
            }],
            catering: vec![CateringEntry {
                id: Uuid::new_v4(),
                site: "Benoni | Tom Jones".to_string(),
                building_name: "Tom Jones".to_string(),
                chef_name: "Dumisani Sithole".to_string(),
                shift: "13:00 - 21:00".to_string(),
                item: None,
                quantity: None,
                date_reported: None,
                notes: Some("Pastry Chef".to_string()),
                status: None,
                created_at: Utc::now(),
            }],
        }
    }

    #[test]
    fn sites_are_sorted_and_counted() {
        let sites = summarize_by_site(&sample_data());
        let names: Vec<&str> = sites.iter().map(|s| s.site.as_str()).collect();
        assert_eq!(names, vec!["Benoni | Tom Jones", "Capital Park", "Pretoria CBD"]);

        let capital = &sites[1];
        assert_eq!(capital.rooms, 1);
        assert_eq!(capital.open_tickets, 1);
        assert_eq!(capital.vehicles, 1);

        // the completed ticket does not count as open
        assert_eq!(sites[2].open_tickets, 1);
    }

    #[test]
    fn open_tickets_are_oldest_first() {
        let data = sample_data();
        let aged = open_tickets_by_age(&data.maintenance, now());
        assert_eq!(aged.len(), 2);
        assert_eq!(aged[0].0.site, "Capital Park");
        assert_eq!(aged[0].1, Some(8));
        assert_eq!(aged[1].1, Some(3));
    }

    #[test]
    fn report_lists_sections_and_tags() {
        let report = build_report(&SiteFilter::All, &sample_data(), now());
        assert!(report.contains("# Facility Dashboard Report"));
        assert!(report.contains("Generated for All Sites"));
        assert!(report.contains("- Rooms: 1 total, 1 occupied, 0 available, 0 under maintenance"));
        assert!(report.contains("Low priority [info], status Scheduled [info], 8 days open"));
        assert!(report.contains("## Recently Closed"));
    }

    #[test]
    fn site_with_only_closed_tickets_is_listed() {
        let data = DashboardData {
            rooms: Vec::new(),
            maintenance: vec![ticket("Auckland Park", Some("2025-02-10"), Some("Completed"))],
            transport: Vec::new(),
            catering: Vec::new(),
        };

        let sites = summarize_by_site(&data);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].site, "Auckland Park");
        assert_eq!(sites[0].open_tickets, 0);

        let report = build_report(&SiteFilter::from_arg(Some("Auckland Park")), &data, now());
        assert!(report.contains("- Auckland Park: 0 rooms, 0 open tickets, 0 vehicles, 0 catering entries"));
        assert!(!report.contains("No records for this selection."));
        assert!(report.contains("No open tickets."));
    }

    #[test]
    fn empty_data_reports_placeholders() {
        let data = DashboardData {
            rooms: Vec::new(),
            maintenance: Vec::new(),
            transport: Vec::new(),
            catering: Vec::new(),
        };
        let report = build_report(&SiteFilter::from_arg(Some("Capital Park")), &data, now());
        assert!(report.contains("Generated for Capital Park"));
        assert!(report.contains("No records for this selection."));
        assert!(report.contains("No open tickets."));
    }
}
