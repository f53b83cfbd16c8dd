//! 餐桌目录
//!
//! 预订子系统只读取餐桌信息。目录来自配置 (`TABLES` 环境变量)，
//! 容量查询仅作参考，不做任何占位。

use shared::models::DiningTable;
use tracing::warn;

/// Read-only lookup for dining tables
pub trait TableDirectory: Send + Sync {
    /// Find a table by id
    fn find(&self, id: i64) -> Option<DiningTable>;

    /// All known tables
    fn all(&self) -> Vec<DiningTable>;
}

/// Config-backed static table directory
pub struct StaticTableDirectory {
    tables: Vec<DiningTable>,
}

impl StaticTableDirectory {
    pub fn new(tables: Vec<DiningTable>) -> Self {
        Self { tables }
    }

    /// Parse a `id:name:capacity` comma-separated spec, e.g. `1:B1:2,2:B2:2`.
    ///
    /// Invalid entries are logged and skipped.
    pub fn from_spec(spec: &str) -> Self {
        let mut tables = Vec::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let parts: Vec<&str> = entry.split(':').collect();
            let parsed = match parts.as_slice() {
                [id, name, capacity] => id
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .zip(capacity.trim().parse::<i32>().ok())
                    .map(|(id, capacity)| DiningTable {
                        id,
                        name: name.trim().to_string(),
                        capacity,
                        is_active: true,
                    }),
                _ => None,
            };
            match parsed {
                Some(table) if table.capacity > 0 => tables.push(table),
                _ => warn!("Ignoring invalid table entry: {}", entry),
            }
        }
        Self { tables }
    }
}

impl TableDirectory for StaticTableDirectory {
    fn find(&self, id: i64) -> Option<DiningTable> {
        self.tables.iter().find(|t| t.id == id).cloned()
    }

    fn all(&self) -> Vec<DiningTable> {
        self.tables.clone()
    }
}
