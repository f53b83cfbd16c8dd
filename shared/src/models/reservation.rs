//! Reservation Model
//!
//! The reservation entity stores absolute Unix-millis timestamps; calendar
//! date and time-of-day are derived in the business timezone, never stored.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::types::Timestamp;

/// Reservation status lifecycle
///
/// ```text
/// PENDING ──► CONFIRMED ──► COMPLETED
///    │           │  └─────► NO_SHOW
///    └───────────┴────────► CANCELLED
/// ```
///
/// `CANCELLED`, `COMPLETED` and `NO_SHOW` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// Terminal states have no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::NoShow)
    }

    /// Whether a reservation in this status blocks its table/slot
    pub fn occupies_table(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who the reservation is for: a registered customer, or a walk-in style
/// manual contact. Exactly one of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Registered { customer_id: i64 },
    Manual { name: String, phone: String },
}

impl CustomerRef {
    /// Registered customer id, if any
    pub fn registered_id(&self) -> Option<i64> {
        match self {
            Self::Registered { customer_id } => Some(*customer_id),
            Self::Manual { .. } => None,
        }
    }
}

/// Reservation entity (预订)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub customer: CustomerRef,
    /// Assigned table, if any. A reservation may await staff allocation.
    pub table_id: Option<i64>,
    /// Booking start, Unix millis
    pub start_at: Timestamp,
    /// Optional booking end, Unix millis; when present, after `start_at`
    pub end_at: Option<Timestamp>,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    /// Creation timestamp, set once by the server
    pub requested_at: Timestamp,
}

impl Reservation {
    /// Calendar date of the booking start in the business timezone
    pub fn start_date(&self, tz: Tz) -> NaiveDate {
        to_local(self.start_at, tz).date_naive()
    }

    /// Time-of-day of the booking start in the business timezone
    pub fn start_time(&self, tz: Tz) -> NaiveTime {
        to_local(self.start_at, tz).time()
    }
}

fn to_local(ts: Timestamp, tz: Tz) -> chrono::DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .unwrap_or_default()
        .with_timezone(&tz)
}

/// Create reservation payload (booking boundary input)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationCreate {
    /// Registered customer id (mutually exclusive with name/phone)
    pub customer_id: Option<i64>,
    /// Walk-in contact name
    pub name: Option<String>,
    /// Walk-in contact phone
    pub phone: Option<String>,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Half-hour aligned local time, `HH:MM`
    pub time: String,
    #[validate(range(min = 1))]
    pub party_size: i32,
    pub table_id: Option<i64>,
    pub notes: Option<String>,
}

impl ReservationCreate {
    /// Resolve the customer reference, enforcing exactly-one semantics
    pub fn customer_ref(&self) -> AppResult<CustomerRef> {
        match (self.customer_id, &self.name, &self.phone) {
            (Some(customer_id), None, None) => Ok(CustomerRef::Registered { customer_id }),
            (None, Some(name), Some(phone)) if !name.is_empty() && !phone.is_empty() => {
                Ok(CustomerRef::Manual {
                    name: name.clone(),
                    phone: phone.clone(),
                })
            }
            _ => Err(AppError::validation(
                "Provide either customer_id, or name and phone (not both)",
            )),
        }
    }
}

/// Update reservation payload (partial; absent fields stay unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub table_id: Option<i64>,
    /// New calendar date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// New local time, `HH:MM`
    pub time: Option<String>,
    /// New end time-of-day, `HH:MM` (same date as the booking)
    pub end_time: Option<String>,
    pub party_size: Option<i32>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Madrid;

    fn create_test_reservation(start_at: i64) -> Reservation {
        Reservation {
            id: 1,
            customer: CustomerRef::Manual {
                name: "Ana".to_string(),
                phone: "600111222".to_string(),
            },
            table_id: Some(3),
            start_at,
            end_at: None,
            party_size: 4,
            status: ReservationStatus::Confirmed,
            notes: None,
            requested_at: start_at - 3_600_000,
        }
    }

    #[test]
    fn test_status_serde_strings() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::NoShow).unwrap(),
            "\"NO_SHOW\""
        );
        let status: ReservationStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(status, ReservationStatus::Pending);
    }

    #[test]
    fn test_status_terminality_and_occupancy() {
        assert!(ReservationStatus::Pending.occupies_table());
        assert!(ReservationStatus::Confirmed.occupies_table());
        assert!(!ReservationStatus::Cancelled.occupies_table());
        assert!(!ReservationStatus::Completed.occupies_table());
        assert!(!ReservationStatus::NoShow.occupies_table());

        assert!(!ReservationStatus::Pending.is_terminal());
        assert!(!ReservationStatus::Confirmed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(ReservationStatus::NoShow.is_terminal());
    }

    #[test]
    fn test_customer_ref_untagged_serde() {
        let registered = CustomerRef::Registered { customer_id: 7 };
        let json = serde_json::to_string(&registered).unwrap();
        assert_eq!(json, r#"{"customer_id":7}"#);
        let back: CustomerRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registered);

        let manual: CustomerRef =
            serde_json::from_str(r#"{"name":"Ana","phone":"600111222"}"#).unwrap();
        assert_eq!(manual.registered_id(), None);
    }

    #[test]
    fn test_create_customer_ref_exactly_one() {
        let mut req = ReservationCreate {
            customer_id: Some(7),
            name: None,
            phone: None,
            date: "2026-09-01".to_string(),
            time: "17:00".to_string(),
            party_size: 2,
            table_id: None,
            notes: None,
        };
        assert!(req.customer_ref().is_ok());

        // Both provided: rejected
        req.name = Some("Ana".to_string());
        req.phone = Some("600111222".to_string());
        assert!(req.customer_ref().is_err());

        // Only manual contact: ok
        req.customer_id = None;
        assert!(req.customer_ref().is_ok());

        // Neither: rejected
        req.name = None;
        req.phone = None;
        assert!(req.customer_ref().is_err());

        // Name without phone: rejected
        req.name = Some("Ana".to_string());
        assert!(req.customer_ref().is_err());
    }

    #[test]
    fn test_derived_date_time_accessors() {
        // 2026-09-01 17:00 Europe/Madrid (CEST, UTC+2) = 15:00 UTC
        let start_at = 1_788_274_800_000i64;
        let res = create_test_reservation(start_at);
        assert_eq!(
            res.start_date(Madrid),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
        assert_eq!(
            res.start_time(Madrid),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_party_size_validation() {
        use validator::Validate;
        let req = ReservationCreate {
            customer_id: Some(1),
            name: None,
            phone: None,
            date: "2026-09-01".to_string(),
            time: "17:00".to_string(),
            party_size: 0,
            table_id: None,
            notes: None,
        };
        assert!(req.validate().is_err());
    }
}
