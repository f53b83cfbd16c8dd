//! Unified error codes for the Meeple booking platform
//!
//! This module defines all error codes used across the booking server and
//! frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Reservation errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 4001,
    /// Requested date falls on a closed day
    ClosedDay = 4002,
    /// Requested time is outside the operating window
    OutOfWindow = 4003,
    /// Requested date/time is in the past
    PastDateTime = 4004,
    /// Slot is already taken by another reservation
    SlotConflict = 4005,
    /// Status transition not allowed by the lifecycle
    InvalidTransition = 4006,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is not in service
    TableInactive = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Reservation storage error (transient, retry later)
    StorageError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ClosedDay => "Venue is closed on the requested day",
            ErrorCode::OutOfWindow => "Requested time is outside the operating window",
            ErrorCode::PastDateTime => "Requested date/time is in the past",
            ErrorCode::SlotConflict => "That slot was just taken",
            ErrorCode::InvalidTransition => "Status transition not allowed",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableInactive => "Table is not in service",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageError => "Reservation storage temporarily unavailable",
        }
    }
}

/// Error returned when converting an invalid u16 to an ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Reservation
            4001 => Ok(ErrorCode::ReservationNotFound),
            4002 => Ok(ErrorCode::ClosedDay),
            4003 => Ok(ErrorCode::OutOfWindow),
            4004 => Ok(ErrorCode::PastDateTime),
            4005 => Ok(ErrorCode::SlotConflict),
            4006 => Ok(ErrorCode::InvalidTransition),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableInactive),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
