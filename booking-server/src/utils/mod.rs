//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`AppResult`] - 应用错误类型 (from shared::error)
//! - 日志、时间转换等工具

pub mod logger;
pub mod time;

pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
