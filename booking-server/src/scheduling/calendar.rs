//! 营业日历
//!
//! 每个星期几映射到一个营业窗口 (或歇业)。日历在进程启动时由配置构建，
//! 之后是纯查表，无副作用。

use chrono::{Datelike, NaiveDate};

/// Per-weekday booking window, in whole hours
///
/// `opens_at_hour:00` is the first bookable slot; `last_bookable_hour:30`
/// is the final one. The venue keeps serving for a while after the last
/// bookable slot; that closing time is display-only and never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    pub opens_at_hour: u32,
    pub last_bookable_hour: u32,
}

impl OperatingWindow {
    /// Display-only closing hour (two hours past the last bookable slot)
    pub fn display_close_hour(&self) -> u32 {
        (self.last_bookable_hour + 2).min(24)
    }

    /// Hours must be valid clock hours with the open at or before the last
    /// bookable slot. Slot generation relies on this.
    pub fn is_valid(&self) -> bool {
        self.opens_at_hour <= self.last_bookable_hour && self.last_bookable_hour <= 23
    }
}

/// Weekly operating calendar, keyed by weekday index 0-6 (0 = Sunday)
///
/// An unmapped weekday is a closed day. A weekday outside 0-6 would be a
/// configuration defect; `window_for` treats it as closed rather than
/// panicking.
#[derive(Debug, Clone)]
pub struct OperatingCalendar {
    windows: [Option<OperatingWindow>; 7],
}

const DAY_TOKENS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

impl OperatingCalendar {
    /// Build from explicit windows. An invalid window (hour out of range,
    /// open after last) is dropped with a warning; that day becomes closed.
    pub fn new(windows: [Option<OperatingWindow>; 7]) -> Self {
        let mut windows = windows;
        for (weekday, slot) in windows.iter_mut().enumerate() {
            if let Some(window) = slot
                && !window.is_valid()
            {
                tracing::warn!(
                    "Dropping invalid operating window {}-{} for '{}'",
                    window.opens_at_hour,
                    window.last_bookable_hour,
                    DAY_TOKENS[weekday]
                );
                *slot = None;
            }
        }
        Self { windows }
    }

    /// 解析配置串，如 `sun=16-21,tue=17-22,fri=17-23`
    ///
    /// 无法解析的片段记 warn 并跳过 (该日视为歇业)，不会使启动失败。
    pub fn from_spec(spec: &str) -> Self {
        let mut windows: [Option<OperatingWindow>; 7] = [None; 7];

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((day, hours)) = entry.split_once('=') else {
                tracing::warn!("Ignoring malformed WEEKLY_HOURS entry '{}'", entry);
                continue;
            };

            let Some(weekday) = DAY_TOKENS.iter().position(|t| *t == day.trim()) else {
                tracing::warn!("Ignoring unknown weekday '{}' in WEEKLY_HOURS", day);
                continue;
            };

            if hours.trim() == "closed" {
                windows[weekday] = None;
                continue;
            }

            let parsed = hours
                .split_once('-')
                .and_then(|(open, last)| {
                    let opens_at_hour: u32 = open.trim().parse().ok()?;
                    let last_bookable_hour: u32 = last.trim().parse().ok()?;
                    Some(OperatingWindow {
                        opens_at_hour,
                        last_bookable_hour,
                    })
                })
                .filter(OperatingWindow::is_valid);

            match parsed {
                Some(window) => windows[weekday] = Some(window),
                None => {
                    tracing::warn!(
                        "Ignoring invalid WEEKLY_HOURS window '{}' for '{}'",
                        hours,
                        day
                    );
                }
            }
        }

        Self { windows }
    }

    /// Booking window for a weekday index (0 = Sunday), `None` when closed
    pub fn window_for(&self, weekday: u32) -> Option<OperatingWindow> {
        self.windows.get(weekday as usize).copied().flatten()
    }

    /// Booking window for a calendar date
    pub fn window_for_date(&self, date: NaiveDate) -> Option<OperatingWindow> {
        self.window_for(date.weekday().num_days_from_sunday())
    }

    /// Whether the venue takes no bookings on this date
    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.window_for_date(date).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuesday() -> NaiveDate {
        // 2026-09-01 is a Tuesday
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()
    }

    #[test]
    fn test_parse_default_spec() {
        let calendar = OperatingCalendar::from_spec(crate::core::config::DEFAULT_WEEKLY_HOURS);
        assert_eq!(
            calendar.window_for(0),
            Some(OperatingWindow {
                opens_at_hour: 16,
                last_bookable_hour: 21
            })
        );
        // Monday unmapped -> closed
        assert_eq!(calendar.window_for(1), None);
        assert_eq!(
            calendar.window_for(5),
            Some(OperatingWindow {
                opens_at_hour: 17,
                last_bookable_hour: 23
            })
        );
    }

    #[test]
    fn test_window_for_date_uses_sunday_based_weekday() {
        let calendar = OperatingCalendar::from_spec("tue=17-22");
        assert!(calendar.window_for_date(tuesday()).is_some());
        assert!(calendar.is_closed(monday()));
    }

    #[test]
    fn test_explicit_closed_token() {
        let calendar = OperatingCalendar::from_spec("tue=17-22,wed=closed");
        assert!(calendar.window_for(2).is_some());
        assert!(calendar.window_for(3).is_none());
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        // open > last, hour out of range, unknown day, garbage
        let calendar = OperatingCalendar::from_spec("tue=22-17,wed=17-25,xyz=1-2,oops");
        for weekday in 0..7 {
            assert_eq!(calendar.window_for(weekday), None);
        }
    }

    #[test]
    fn test_new_drops_invalid_windows() {
        let mut windows: [Option<OperatingWindow>; 7] = [None; 7];
        windows[2] = Some(OperatingWindow {
            opens_at_hour: 17,
            last_bookable_hour: 22,
        });
        windows[3] = Some(OperatingWindow {
            opens_at_hour: 22,
            last_bookable_hour: 17,
        });
        windows[4] = Some(OperatingWindow {
            opens_at_hour: 17,
            last_bookable_hour: 25,
        });

        let calendar = OperatingCalendar::new(windows);
        assert!(calendar.window_for(2).is_some());
        assert_eq!(calendar.window_for(3), None);
        assert_eq!(calendar.window_for(4), None);
    }

    #[test]
    fn test_out_of_range_weekday_is_closed() {
        let calendar = OperatingCalendar::from_spec("tue=17-22");
        assert_eq!(calendar.window_for(7), None);
        assert_eq!(calendar.window_for(99), None);
    }

    #[test]
    fn test_display_close_hour_capped() {
        let late = OperatingWindow {
            opens_at_hour: 17,
            last_bookable_hour: 23,
        };
        assert_eq!(late.display_close_hour(), 24);
        let early = OperatingWindow {
            opens_at_hour: 16,
            last_bookable_hour: 21,
        };
        assert_eq!(early.display_close_hour(), 23);
    }
}
