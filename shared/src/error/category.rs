//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Reservation errors
/// - 7xxx: Table errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Reservation errors (4xxx)
    Reservation,
    /// Table errors (7xxx)
    Table,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Reservation,
            7000..8000 => Self::Table,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Reservation => "reservation",
            Self::Table => "table",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(2), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4005), ErrorCategory::Reservation);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Table);
        assert_eq!(ErrorCategory::from_code(9002), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::SlotConflict.category(),
            ErrorCategory::Reservation
        );
        assert_eq!(ErrorCode::TableNotFound.category(), ErrorCategory::Table);
        assert_eq!(ErrorCode::StorageError.category(), ErrorCategory::System);
        assert_eq!(
            ErrorCode::ValidationFailed.category(),
            ErrorCategory::General
        );
    }

    #[test]
    fn test_category_names() {
        assert_eq!(ErrorCategory::Reservation.name(), "reservation");
        assert_eq!(ErrorCategory::System.name(), "system");
    }
}
