//! 时间工具函数 - 业务时区转换
//!
//! 所有日期→时间戳转换统一在此完成，存储层只接收 `i64` Unix millis。

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时间字符串 (HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// 日期 + 时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Unix millis → 业务时区的本地时刻
pub fn millis_to_local(millis: i64, tz: Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Madrid;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-09-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
        assert!(parse_date("01/09/2026").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("17:30").unwrap(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap()
        );
        assert!(parse_time("5pm").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_round_trip_through_business_timezone() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let time = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let millis = date_time_to_millis(date, time, Madrid);

        let local = millis_to_local(millis, Madrid);
        assert_eq!(local.date_naive(), date);
        assert_eq!(local.time(), time);
    }
}
