use chrono::{DateTime, Utc};
use serde::Serialize;

/// Opaque identity of a notification, unique within a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NotificationId(pub(crate) u64);

impl NotificationId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Parse a severity name, falling back to `Info` for anything unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" | "ok" => Severity::Success,
            "warning" | "warn" => Severity::Warning,
            "error" | "danger" => Severity::Error,
            _ => Severity::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation phase; only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Entering,
    Active,
    Leaving,
    /// Reported for notifications no longer in the collection
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub body: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub ttl_ms: u64,
    pub phase: Phase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_is_lenient() {
        assert_eq!(Severity::parse("Error"), Severity::Error);
        assert_eq!(Severity::parse(" warn "), Severity::Warning);
        assert_eq!(Severity::parse("success"), Severity::Success);
        assert_eq!(Severity::parse("whatever"), Severity::Info);
    }

    #[test]
    fn test_phase_order() {
        assert!(Phase::Entering < Phase::Active);
        assert!(Phase::Active < Phase::Leaving);
        assert!(Phase::Leaving < Phase::Removed);
    }

    #[test]
    fn test_notification_serializes_lowercase_enums() {
        let n = Notification {
            id: NotificationId(4),
            body: "saved".to_string(),
            severity: Severity::Success,
            created_at: Utc::now(),
            ttl_ms: 3000,
            phase: Phase::Entering,
        };
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["severity"], "success");
        assert_eq!(value["phase"], "entering");
        assert_eq!(value["id"], 4);
    }
}
