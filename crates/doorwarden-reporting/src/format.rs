//! Human-facing timestamp formats.
//!
//! Hours use the 12-hour clock without a leading zero (`12:30 AM` just after
//! midnight); minutes and seconds are zero-padded. Dates never pad month or
//! day.

use chrono::NaiveDateTime;

/// `9:05 AM`, as used in notifications.
pub fn clock_time(at: &NaiveDateTime) -> String {
    at.format("%-I:%M %p").to_string()
}

/// `9:05:03 AM`, as used in audit rows.
pub fn clock_time_seconds(at: &NaiveDateTime) -> String {
    at.format("%-I:%M:%S %p").to_string()
}

/// `2025/5/23`, as used in audit rows.
pub fn audit_date(at: &NaiveDateTime) -> String {
    at.format("%Y/%-m/%-d").to_string()
}

/// `5/23/2025`, as used in notifications.
pub fn alert_date(at: &NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y").to_string()
}
