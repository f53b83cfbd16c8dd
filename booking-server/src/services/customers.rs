//! 客户目录
//!
//! 预订视图需要把 `customer_id` 解析成展示名。客户 CRUD 不在本服务范围，
//! 这里只提供一个只读查询接口。

use std::collections::HashMap;

/// Read-only display-name lookup for registered customers
pub trait CustomerDirectory: Send + Sync {
    /// Display name for a registered customer, if known
    fn display_name(&self, customer_id: i64) -> Option<String>;
}

/// In-memory customer directory
#[derive(Default)]
pub struct StaticCustomerDirectory {
    names: HashMap<i64, String>,
}

impl StaticCustomerDirectory {
    pub fn new(names: HashMap<i64, String>) -> Self {
        Self { names }
    }
}

impl CustomerDirectory for StaticCustomerDirectory {
    fn display_name(&self, customer_id: i64) -> Option<String> {
        self.names.get(&customer_id).cloned()
    }
}
