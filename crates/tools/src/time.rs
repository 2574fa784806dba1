//! Time tool.

use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with microseconds.
pub fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
