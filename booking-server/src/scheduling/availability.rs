//! 可用性计算
//!
//! 纯函数式地组合时段生成与预订占用: 某日某桌的可用槽位 = 生成器输出
//! 减去与 Pending/Confirmed 预订占用区间重叠的时段。不做任何占位。

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use shared::AppResult;

use crate::core::Clock;
use crate::reservations::ReservationStore;
use crate::services::TableDirectory;
use crate::utils::time::{date_time_to_millis, millis_to_local};

use super::slots::{SLOT_MILLIS, SlotGenerator};

pub struct AvailabilityEngine {
    tz: Tz,
    slots: SlotGenerator,
    tables: Arc<dyn TableDirectory>,
    clock: Arc<dyn Clock>,
    store: Arc<ReservationStore>,
}

impl AvailabilityEngine {
    pub fn new(
        tz: Tz,
        slots: SlotGenerator,
        tables: Arc<dyn TableDirectory>,
        clock: Arc<dyn Clock>,
        store: Arc<ReservationStore>,
    ) -> Self {
        Self {
            tz,
            slots,
            tables,
            clock,
            store,
        }
    }

    /// Open slots for a table on a date, ascending. Already-started slots
    /// (today only) and slots overlapping an occupying reservation's
    /// `[start, end)` window are removed; cancelled and completed
    /// reservations never block.
    pub fn available_slots(&self, date: NaiveDate, table_id: i64) -> AppResult<Vec<NaiveTime>> {
        let now = millis_to_local(self.clock.now_millis(), self.tz);
        let occupied = self.store.occupied_intervals(date, table_id)?;

        let mut slots = self.slots.slots_for_after(date, now);
        slots.retain(|slot| {
            let slot_start = date_time_to_millis(date, *slot, self.tz);
            let slot_end = slot_start + SLOT_MILLIS;
            !occupied
                .iter()
                .any(|(start, end)| slot_start < *end && *start < slot_end)
        });
        Ok(slots)
    }

    /// Advisory count of active tables seating at least `party_size`.
    /// Reserves nothing; the number may be stale by the time it is read.
    pub fn has_capacity(&self, party_size: i32) -> usize {
        self.tables
            .all()
            .iter()
            .filter(|t| t.fits(party_size))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::reservations::ReservationStorage;
    use crate::scheduling::OperatingCalendar;
    use crate::services::StaticTableDirectory;
    use chrono_tz::Europe::Madrid;
    use shared::models::{ReservationCreate, ReservationUpdate};

    // 2026-09-01 is a Tuesday (CEST)
    const TUE_17_00: i64 = 1_788_274_800_000;
    const TUE_12_00: i64 = TUE_17_00 - 5 * 3_600_000;

    fn create_test_engine(now_millis: i64) -> (AvailabilityEngine, Arc<ReservationStore>, Arc<ManualClock>) {
        let calendar = Arc::new(OperatingCalendar::from_spec("tue=17-22"));
        let tables = Arc::new(StaticTableDirectory::from_spec("1:B1:2,2:B2:2,3:T3:4,4:T4:6"));
        let clock = Arc::new(ManualClock::new(now_millis));
        let storage = ReservationStorage::open_in_memory().unwrap();
        let store = Arc::new(
            ReservationStore::new(
                storage,
                calendar.clone(),
                tables.clone(),
                clock.clone(),
                Madrid,
                3_600_000,
            )
            .unwrap(),
        );
        let engine = AvailabilityEngine::new(
            Madrid,
            SlotGenerator::new(calendar),
            tables,
            clock.clone(),
            store.clone(),
        );
        (engine, store, clock)
    }

    fn create_request(time: &str, table_id: Option<i64>) -> ReservationCreate {
        ReservationCreate {
            customer_id: None,
            name: Some("Ana".to_string()),
            phone: Some("600111222".to_string()),
            date: "2026-09-01".to_string(),
            time: time.to_string(),
            party_size: 2,
            table_id,
            notes: None,
        }
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
    }

    #[test]
    fn test_booked_slot_disappears_for_that_table_only() {
        let (engine, store, _) = create_test_engine(TUE_12_00);
        store.create(create_request("18:00", Some(1))).unwrap();

        let table1 = engine.available_slots(tuesday(), 1).unwrap();
        assert_eq!(table1.len(), 11);
        assert!(!table1.contains(&NaiveTime::from_hms_opt(18, 0, 0).unwrap()));

        let table2 = engine.available_slots(tuesday(), 2).unwrap();
        assert_eq!(table2.len(), 12);
    }

    #[test]
    fn test_extended_reservation_blocks_its_whole_window() {
        let (engine, store, _) = create_test_engine(TUE_12_00);
        let res = store.create(create_request("17:00", Some(1))).unwrap();
        store
            .update(
                res.id,
                ReservationUpdate {
                    end_time: Some("19:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        // 17:00 through 18:30 fall inside [17:00, 19:00); 19:00 is open
        let slots = engine.available_slots(tuesday(), 1).unwrap();
        assert_eq!(slots.len(), 8);
        assert_eq!(slots.first(), Some(&NaiveTime::from_hms_opt(19, 0, 0).unwrap()));
    }

    #[test]
    fn test_cancelled_reservation_does_not_block() {
        let (engine, store, _) = create_test_engine(TUE_12_00);
        let res = store.create(create_request("18:00", Some(1))).unwrap();
        store.cancel(res.id).unwrap();

        let slots = engine.available_slots(tuesday(), 1).unwrap();
        assert_eq!(slots.len(), 12);
    }

    #[test]
    fn test_auto_cancelled_slot_reopens() {
        let (engine, store, clock) = create_test_engine(TUE_12_00);
        store.create(create_request("17:00", Some(1))).unwrap();

        // Past the grace deadline; the sweep inside the read frees the slot,
        // but 17:00 itself has already started by then
        clock.set(TUE_17_00 + 2 * 3_600_000);
        let slots = engine.available_slots(tuesday(), 1).unwrap();
        assert_eq!(slots.first(), Some(&NaiveTime::from_hms_opt(19, 30, 0).unwrap()));
        assert_eq!(store.sweep_expired().unwrap(), 0);
    }

    #[test]
    fn test_closed_day_has_no_availability() {
        let (engine, _, _) = create_test_engine(TUE_12_00);
        let monday = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        assert!(engine.available_slots(monday, 1).unwrap().is_empty());
    }

    #[test]
    fn test_has_capacity_counts_fitting_tables() {
        let (engine, _, _) = create_test_engine(TUE_12_00);
        assert_eq!(engine.has_capacity(2), 4);
        assert_eq!(engine.has_capacity(4), 2);
        assert_eq!(engine.has_capacity(6), 1);
        assert_eq!(engine.has_capacity(10), 0);
    }
}
