//! 核心模块 - 服务器配置、状态与后台任务
//!
//! # 模块结构
//!
//! - [`Config`] - 服务器配置
//! - [`ServerState`] - 服务器状态
//! - [`Server`] - HTTP 服务器
//! - [`BackgroundTasks`] - 后台任务管理
//! - [`Clock`] - 可注入时钟

pub mod clock;
pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
