use std::str::FromStr;

use chrono_tz::Tz;

/// 服务器配置 - 预订服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/meeple | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | TIMEZONE | Europe/Madrid | 营业时区 |
/// | WEEKLY_HOURS | 见下 | 每周营业窗口 |
/// | GRACE_MINUTES | 60 | 未到店保留时间 (分钟) |
/// | SWEEP_INTERVAL_SECS | 60 | 后台清扫间隔 (秒) |
/// | TABLES | 见下 | 静态桌台目录 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// `WEEKLY_HOURS` 格式: `day=open-last` 逗号分隔，缺失的日子视为歇业。
/// 例如 `tue=17-22,fri=17-23` 指周二 17:00 至 22:30 可订，周五至 23:30。
///
/// `TABLES` 格式: `id:name:capacity` 逗号分隔。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/meeple HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 营业时区 (所有日期/时段均按此时区解释)
    pub timezone: Tz,
    /// 每周营业窗口
    pub weekly_hours: String,
    /// CONFIRMED 预订未到店的保留时间 (分钟)
    pub grace_minutes: i64,
    /// 后台 no-show 清扫间隔 (秒)
    pub sweep_interval_secs: u64,
    /// 静态桌台目录
    pub tables: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

/// 默认营业时间: 周一歇业，周日较早打烊
pub const DEFAULT_WEEKLY_HOURS: &str =
    "sun=16-21,tue=17-22,wed=17-22,thu=17-22,fri=17-23,sat=17-23";

/// 默认桌台目录 (小场地: 吧台两张两人桌 + 四张游戏桌)
pub const DEFAULT_TABLES: &str = "1:B1:2,2:B2:2,3:T3:4,4:T4:4,5:T5:6,6:T6:8";

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/meeple".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| {
                    Tz::from_str(&tz)
                        .map_err(|e| {
                            tracing::warn!("Invalid TIMEZONE '{}': {}, using default", tz, e);
                            e
                        })
                        .ok()
                })
                .unwrap_or(chrono_tz::Europe::Madrid),
            weekly_hours: std::env::var("WEEKLY_HOURS")
                .unwrap_or_else(|_| DEFAULT_WEEKLY_HOURS.into()),
            grace_minutes: std::env::var("GRACE_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            tables: std::env::var("TABLES").unwrap_or_else(|_| DEFAULT_TABLES.into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 保留时间，毫秒
    pub fn grace_millis(&self) -> i64 {
        self.grace_minutes * 60_000
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
