//! Shared types for the Meeple booking platform
//!
//! Domain models and cross-cutting types used by the booking server and
//! its clients:
//!
//! - **Models** (`models`): reservation and dining table entities
//! - **Errors** (`error`): unified error codes, `AppError`, `ApiResponse`
//! - **Utilities** (`util`, `types`): timestamps, snowflake IDs

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-export 公共类型
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use types::Timestamp;
pub use util::{now_millis, snowflake_id};
