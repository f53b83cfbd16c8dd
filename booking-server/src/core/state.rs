//! 服务器状态
//!
//! `ServerState` 持有所有服务的共享引用，使用 Arc 实现浅拷贝。
//!
//! # 服务组件
//!
//! | 字段 | 说明 |
//! |------|------|
//! | config | 配置项 (不可变) |
//! | calendar | 营业日历 |
//! | tables | 餐桌目录 (只读) |
//! | customers | 客户目录 (只读) |
//! | clock | 时钟 (测试中可注入 [`ManualClock`]) |
//! | store | 权威预订集合 |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::core::clock::{Clock, ManualClock, SystemClock};
use crate::core::config::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::reservations::{ReservationStorage, ReservationStore};
use crate::scheduling::{AvailabilityEngine, OperatingCalendar, SlotGenerator};
use crate::services::{
    CustomerDirectory, StaticCustomerDirectory, StaticTableDirectory, TableDirectory,
};

#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 营业日历
    pub calendar: Arc<OperatingCalendar>,
    /// 餐桌目录
    pub tables: Arc<dyn TableDirectory>,
    /// 客户目录
    pub customers: Arc<dyn CustomerDirectory>,
    /// 时钟
    pub clock: Arc<dyn Clock>,
    /// 预订存储
    pub store: Arc<ReservationStore>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (确保存在)
    /// 2. 数据库 (work_dir/reservations.redb)，恢复全部预订
    /// 3. 日历、目录、预订存储
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(&work_dir)
            .with_context(|| format!("Failed to create work directory {}", config.work_dir))?;

        let db_path = work_dir.join("reservations.redb");
        let storage = ReservationStorage::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        Self::with_storage(config, storage, Arc::new(SystemClock))
    }

    /// 使用给定的存储后端和时钟构造状态
    ///
    /// 测试通过 in-memory 存储 + [`ManualClock`] 走这条路径
    pub fn with_storage(
        config: &Config,
        storage: ReservationStorage,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let calendar = Arc::new(OperatingCalendar::from_spec(&config.weekly_hours));
        let tables: Arc<dyn TableDirectory> =
            Arc::new(StaticTableDirectory::from_spec(&config.tables));
        let customers: Arc<dyn CustomerDirectory> =
            Arc::new(StaticCustomerDirectory::default());

        let store = Arc::new(
            ReservationStore::new(
                storage,
                calendar.clone(),
                tables.clone(),
                clock.clone(),
                config.timezone,
                config.grace_millis(),
            )
            .context("Failed to initialize reservation store")?,
        );

        Ok(Self {
            config: config.clone(),
            calendar,
            tables,
            customers,
            clock,
            store,
        })
    }

    /// In-memory 状态，用于测试
    pub fn in_memory(config: &Config, clock: Arc<ManualClock>) -> anyhow::Result<Self> {
        let storage = ReservationStorage::open_in_memory()?;
        Self::with_storage(config, storage, clock)
    }

    /// 构造可用性计算器
    pub fn availability(&self) -> AvailabilityEngine {
        AvailabilityEngine::new(
            self.config.timezone,
            SlotGenerator::new(self.calendar.clone()),
            self.tables.clone(),
            self.clock.clone(),
            self.store.clone(),
        )
    }

    /// 启动后台任务
    ///
    /// 目前只有一个: 定时清扫过期未到店的 CONFIRMED 预订
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        let store = self.store.clone();
        let interval = Duration::from_secs(self.config.sweep_interval_secs.max(1));

        tasks.spawn("no_show_sweep", TaskKind::Periodic, async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一个 tick 立即返回，先消费掉
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        match store.sweep_expired() {
                            Ok(0) => {}
                            Ok(n) => tracing::info!("No-show sweep expired {} reservation(s)", n),
                            Err(e) => tracing::error!("No-show sweep failed: {}", e),
                        }
                    }
                }
            }
        });

        tasks
    }
}
