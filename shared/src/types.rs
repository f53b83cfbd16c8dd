//! Common types for the shared crate
//!
//! Utility types used across the framework

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Weekday index convention used by the operating calendar: 0 = Sunday .. 6 = Saturday.
pub type WeekdayIndex = u32;
