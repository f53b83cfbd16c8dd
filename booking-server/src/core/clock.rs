//! 时钟注入
//!
//! 过期检查和自动取消都依赖"当前时刻"。通过 [`Clock`] 注入而不是直接读
//! 系统时间，测试可以用 [`ManualClock`] 精确控制时间推进。

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current instant (Unix millis)
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        shared::util::now_millis()
    }
}

/// Manually advanced clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    /// Move the clock to an absolute instant
    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    /// Advance the clock by a duration in millis
    pub fn advance(&self, delta_millis: i64) {
        self.now.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
