//! 预订模块 - 权威预订集合与持久化
//!
//! [`ReservationStore`] 持有内存快照并通过 [`ReservationStorage`] (redb)
//! 落盘；所有校验与状态变更由它串行化执行。

pub mod storage;
pub mod store;

pub use storage::{ReservationStorage, StorageError, StorageResult};
pub use store::ReservationStore;
