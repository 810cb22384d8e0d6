//! Canonical field keys and event names for structured logging
//!
//! Shared by the logging macros and by tests asserting on captured events.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Navigation
pub const FIELD_PATH: &str = "path";
pub const FIELD_GENERATION: &str = "generation";
pub const FIELD_ROUTE: &str = "route";
pub const FIELD_DEPTH: &str = "depth";
pub const FIELD_REDIRECT_TO: &str = "redirect_to";
pub const FIELD_CHAIN_LEN: &str = "chain_len";

// Notifications
pub const FIELD_NOTIFICATION_ID: &str = "notification_id";
pub const FIELD_SEVERITY: &str = "severity";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_REDIRECT: &str = "redirect";
pub const EVENT_STALE: &str = "stale";
pub const EVENT_INSERT: &str = "insert";
pub const EVENT_EVICT: &str = "evict";
pub const EVENT_DISMISS: &str = "dismiss";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let names = [
            EVENT_START,
            EVENT_END,
            EVENT_END_ERROR,
            EVENT_REDIRECT,
            EVENT_STALE,
            EVENT_INSERT,
            EVENT_EVICT,
            EVENT_DISMISS,
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_error_fields_are_dotted() {
        assert!(FIELD_ERR_KIND.starts_with("err."));
        assert!(FIELD_ERR_CODE.starts_with("err."));
    }
}
