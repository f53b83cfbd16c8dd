//! 排期模块 - 营业日历、时段生成、可用性与状态机
//!
//! 规则层不持有数据；预订集合归 [`crate::reservations`] 所有。

pub mod availability;
pub mod calendar;
pub mod lifecycle;
pub mod slots;

pub use availability::AvailabilityEngine;
pub use calendar::{OperatingCalendar, OperatingWindow};
pub use slots::{SLOT_MILLIS, SLOT_MINUTES, SlotGenerator};
