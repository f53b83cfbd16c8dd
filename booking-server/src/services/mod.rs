//! 外部目录服务 - 餐桌与客户的只读查询接口

pub mod customers;
pub mod tables;

pub use customers::{CustomerDirectory, StaticCustomerDirectory};
pub use tables::{StaticTableDirectory, TableDirectory};
