//! 时段生成
//!
//! 按营业日历为给定日期枚举所有可订起始时间。生成是确定性的：同一日期
//! (日历不变) 总是得到同一序列。

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::calendar::OperatingCalendar;

/// Slot granularity, minutes. Bookings start on the half hour.
pub const SLOT_MINUTES: u32 = 30;

/// Slot granularity in milliseconds. A reservation without an explicit end
/// occupies exactly one slot.
pub const SLOT_MILLIS: i64 = SLOT_MINUTES as i64 * 60_000;

/// Enumerates bookable start times for a date
#[derive(Clone)]
pub struct SlotGenerator {
    calendar: Arc<OperatingCalendar>,
}

impl SlotGenerator {
    pub fn new(calendar: Arc<OperatingCalendar>) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &OperatingCalendar {
        &self.calendar
    }

    /// All slots for a date, ascending: every half-hour boundary from
    /// `opens:00` through `last:30` inclusive. Empty when closed.
    pub fn slots_for(&self, date: NaiveDate) -> Vec<NaiveTime> {
        let Some(window) = self.calendar.window_for_date(date) else {
            return Vec::new();
        };

        let per_hour = (60 / SLOT_MINUTES) as usize;
        let hours = (window.last_bookable_hour - window.opens_at_hour + 1) as usize;
        let mut slots = Vec::with_capacity(per_hour * hours);
        for hour in window.opens_at_hour..=window.last_bookable_hour {
            for minute in (0..60).step_by(SLOT_MINUTES as usize) {
                // OperatingCalendar only holds windows with hours in 0..=23
                slots.push(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
            }
        }
        slots
    }

    /// Slots for a date, excluding those already started relative to `now`
    /// (a slot equal to the current minute counts as started). Past dates
    /// yield nothing; future dates are unaffected.
    pub fn slots_for_after(&self, date: NaiveDate, now: DateTime<Tz>) -> Vec<NaiveTime> {
        let today = now.date_naive();
        if date < today {
            return Vec::new();
        }
        let mut slots = self.slots_for(date);
        if date == today {
            let time_now = now.time();
            slots.retain(|slot| *slot > time_now);
        }
        slots
    }

    /// Whether `time` is a bookable slot on `date` (calendar check only;
    /// the past-datetime rule is the store's concern)
    pub fn is_bookable_slot(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.slots_for(date).contains(&time)
    }
}
