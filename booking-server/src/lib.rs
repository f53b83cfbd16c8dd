//! Meeple Booking Server - 桌游酒吧预订服务
//!
//! # 架构概述
//!
//! 本模块是预订服务的主入口，提供以下核心功能：
//!
//! - **排期核心** (`scheduling`): 营业日历、时段生成、可用性计算、状态机
//! - **预订存储** (`reservations`): redb 持久化 + 内存快照，串行化写入
//! - **HTTP API** (`api`): RESTful API 接口
//! - **后台任务** (`core/tasks`): 周期性 no-show 清扫
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、服务器、时钟、后台任务
//! ├── scheduling/    # 营业日历、时段、可用性、生命周期
//! ├── reservations/  # 预订存储 (redb) 与业务规则
//! ├── services/      # 桌台/顾客目录 (外部协作者边界)
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、时间工具
//! ```

pub mod api;
pub mod core;
pub mod reservations;
pub mod scheduling;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Clock, Config, ManualClock, Server, ServerState, SystemClock};
pub use reservations::{ReservationStorage, ReservationStore};
pub use scheduling::{AvailabilityEngine, OperatingCalendar, OperatingWindow, SlotGenerator};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
