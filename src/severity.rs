use serde::Serialize;

/// Presentation category used to color a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Primary,
    Info,
    Success,
    Warning,
    Error,
    Default,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Primary => "primary",
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Default => "default",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which mapping table to look a value up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTable {
    /// Workflow status of tickets and catering entries.
    TicketStatus,
    /// Ticket priority.
    Priority,
}

pub fn map_severity(table: SeverityTable, value: Option<&str>) -> Severity {
    let Some(value) = value else {
        return Severity::Default;
    };
    let key = value.trim().to_ascii_lowercase();

    match table {
        SeverityTable::TicketStatus => match key.as_str() {
            "in progress" => Severity::Primary,
            "pending" => Severity::Warning,
            "scheduled" => Severity::Info,
            "completed" | "sufficient" => Severity::Success,
            _ => Severity::Default,
        },
        SeverityTable::Priority => match key.as_str() {
            "high" => Severity::Error,
            "medium" => Severity::Warning,
            "low" => Severity::Info,
            _ => Severity::Default,
        },
    }
}

pub fn status_severity(status: Option<&str>) -> Severity {
    map_severity(SeverityTable::TicketStatus, status)
}

pub fn priority_severity(priority: Option<&str>) -> Severity {
    map_severity(SeverityTable::Priority, priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_statuses_map_case_insensitively() {
        assert_eq!(status_severity(Some("in progress")), Severity::Primary);
        assert_eq!(status_severity(Some("In Progress")), Severity::Primary);
        assert_eq!(status_severity(Some("PENDING")), Severity::Warning);
        assert_eq!(status_severity(Some("Scheduled")), Severity::Info);
        assert_eq!(status_severity(Some(" completed ")), Severity::Success);
        assert_eq!(status_severity(Some("Sufficient")), Severity::Success);
    }

    #[test]
    fn priorities_use_their_own_table() {
        assert_eq!(priority_severity(Some("HIGH")), Severity::Error);
        assert_eq!(priority_severity(Some("medium")), Severity::Warning);
        assert_eq!(priority_severity(Some("Low")), Severity::Info);
        // "low" is a priority word, not a workflow status
        assert_eq!(status_severity(Some("low")), Severity::Default);
    }

    #[test]
    fn absent_or_unknown_values_fall_back_to_default() {
        assert_eq!(status_severity(None), Severity::Default);
        assert_eq!(priority_severity(None), Severity::Default);
        assert_eq!(status_severity(Some("Open")), Severity::Default);
        assert_eq!(priority_severity(Some("")), Severity::Default);
    }

    #[test]
    fn tags_render_lowercase() {
        assert_eq!(Severity::Primary.to_string(), "primary");
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
    }
}
