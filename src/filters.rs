use crate::models::{MaintenanceTicket, SiteScoped};
use crate::stats::label_is;

pub const ALL_SITES_LABEL: &str = "All Sites";

pub const KNOWN_SITES: [&str; 5] = [
    "Pretoria CBD",
    "Capital Park",
    "Kempton Park | CJ",
    "Olievenhoutbosch",
    "Benoni | Tom Jones",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SiteFilter {
    #[default]
    All,
    Site(String),
}

impl SiteFilter {
    /// `None`, an empty string, and "All Sites" (any case) all select every site.
    pub fn from_arg(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => SiteFilter::All,
            Some(label) if label.eq_ignore_ascii_case(ALL_SITES_LABEL) => SiteFilter::All,
            Some(label) => SiteFilter::Site(label.to_string()),
        }
    }

    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteFilter::All => true,
            SiteFilter::Site(wanted) => wanted == site,
        }
    }

    pub fn as_site(&self) -> Option<&str> {
        match self {
            SiteFilter::All => None,
            SiteFilter::Site(site) => Some(site),
        }
    }

    pub fn label(&self) -> &str {
        self.as_site().unwrap_or(ALL_SITES_LABEL)
    }
}

pub fn by_site<T: SiteScoped + Clone>(records: &[T], filter: &SiteFilter) -> Vec<T> {
    records
        .iter()
        .filter(|record| filter.matches(record.site()))
        .cloned()
        .collect()
}

pub fn is_open(ticket: &MaintenanceTicket) -> bool {
    !label_is(ticket.status.as_deref(), "completed")
}

/// Splits tickets into (open, closed). Tickets without a status are open.
pub fn split_tickets(tickets: &[MaintenanceTicket]) -> (Vec<MaintenanceTicket>, Vec<MaintenanceTicket>) {
    tickets.iter().cloned().partition(is_open)
}
