//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (桌台)
///
/// Tables are configuration data for the booking subsystem: the reservation
/// core only consults capacity and operational state, it never edits tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub is_active: bool,
}

impl DiningTable {
    /// Whether the table can take a booking for the given party size
    pub fn fits(&self, party_size: i32) -> bool {
        self.is_active && self.capacity >= party_size
    }
}
