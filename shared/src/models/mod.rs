//! Domain models
//!
//! # 模块结构
//!
//! - [`reservation`] - 预订实体、状态与请求载荷
//! - [`dining_table`] - 桌台实体 (容量查询边界)

pub mod dining_table;
pub mod reservation;

pub use dining_table::DiningTable;
pub use reservation::{
    CustomerRef, Reservation, ReservationCreate, ReservationStatus, ReservationUpdate,
};
