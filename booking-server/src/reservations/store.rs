//! 预订存储 - 权威预订集合
//!
//! 内存快照 (`HashMap`) + redb 持久化，单把 `parking_lot::RwLock` 串行化全部
//! 写入。酒吧规模的桌数下全局锁足够，换来简单的一致性模型:
//! 进程内 read-after-write 一致，读请求看到一致快照。
//!
//! 每次提交先落盘再更新内存，内存中可见的状态必然已持久化。
//!
//! 过期自动取消 (no-show) 在两处执行: 列表读路径上的惰性清扫，以及
//! 后台定时清扫。两者都在同一把锁内完成。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use parking_lot::RwLock;
use tracing::info;
use validator::Validate;

use shared::models::{Reservation, ReservationCreate, ReservationStatus, ReservationUpdate};
use shared::{AppError, AppResult, ErrorCode, snowflake_id};

use crate::core::Clock;
use crate::scheduling::{OperatingCalendar, SLOT_MILLIS, SlotGenerator, lifecycle};
use crate::services::TableDirectory;
use crate::utils::time::{date_time_to_millis, parse_date, parse_time};

use super::storage::ReservationStorage;

pub struct ReservationStore {
    tz: Tz,
    grace_millis: i64,
    slots: SlotGenerator,
    tables: Arc<dyn TableDirectory>,
    clock: Arc<dyn Clock>,
    storage: ReservationStorage,
    cache: RwLock<HashMap<i64, Reservation>>,
}

impl ReservationStore {
    /// Build the store and recover all reservations from disk
    pub fn new(
        storage: ReservationStorage,
        calendar: Arc<OperatingCalendar>,
        tables: Arc<dyn TableDirectory>,
        clock: Arc<dyn Clock>,
        tz: Tz,
        grace_millis: i64,
    ) -> AppResult<Self> {
        let mut cache = HashMap::new();
        for reservation in storage.load_all()? {
            cache.insert(reservation.id, reservation);
        }
        info!("Loaded {} reservations from storage", cache.len());

        Ok(Self {
            tz,
            grace_millis,
            slots: SlotGenerator::new(calendar),
            tables,
            clock,
            storage,
            cache: RwLock::new(cache),
        })
    }

    // ========== Commands ==========

    /// Create a reservation
    ///
    /// Validation order: closed day, slot membership, past datetime,
    /// table lookup, slot conflict.
    pub fn create(&self, request: ReservationCreate) -> AppResult<Reservation> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        let customer = request.customer_ref()?;
        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;

        let mut cache = self.cache.write();
        self.sweep_locked(&mut cache)?;

        let start_at = self.validate_slot(date, time)?;
        self.validate_future(start_at)?;
        self.validate_table(request.table_id)?;
        self.validate_no_conflict(&cache, request.table_id, start_at, None, None)?;

        let now = self.clock.now_millis();
        let reservation = Reservation {
            id: snowflake_id(),
            customer,
            table_id: request.table_id,
            start_at,
            end_at: None,
            party_size: request.party_size,
            status: lifecycle::initial_status(request.table_id.is_some()),
            notes: request.notes,
            requested_at: now,
        };

        self.storage.upsert(&reservation)?;
        cache.insert(reservation.id, reservation.clone());
        info!(
            "Reservation {} created: {} {} table={:?} status={}",
            reservation.id, request.date, request.time, reservation.table_id, reservation.status
        );
        Ok(reservation)
    }

    /// Partially update a reservation, re-validating the proposed booking
    ///
    /// The reservation's own prior booking is excluded from the conflict
    /// check, so an update that keeps the same slot always passes it.
    pub fn update(&self, id: i64, changes: ReservationUpdate) -> AppResult<Reservation> {
        let mut cache = self.cache.write();
        self.sweep_locked(&mut cache)?;

        let existing = cache
            .get(&id)
            .ok_or_else(|| AppError::reservation_not_found(id))?
            .clone();
        if existing.status.is_terminal() {
            return Err(AppError::invalid_request(format!(
                "Reservation {} is {} and can no longer be modified",
                id, existing.status
            )));
        }

        let date = match &changes.date {
            Some(d) => parse_date(d)?,
            None => existing.start_date(self.tz),
        };
        let time = match &changes.time {
            Some(t) => parse_time(t)?,
            None => existing.start_time(self.tz),
        };
        let table_id = changes.table_id.or(existing.table_id);
        let party_size = changes.party_size.unwrap_or(existing.party_size);
        if party_size < 1 {
            return Err(AppError::validation("party_size must be at least 1"));
        }

        let start_at = self.validate_slot(date, time)?;
        if start_at != existing.start_at {
            self.validate_future(start_at)?;
        }
        self.validate_table(table_id)?;

        let end_at = match &changes.end_time {
            Some(t) => {
                let end = date_time_to_millis(date, parse_time(t)?, self.tz);
                if end <= start_at {
                    return Err(AppError::validation("end_time must be after the start"));
                }
                Some(end)
            }
            None if start_at != existing.start_at => None,
            None => existing.end_at,
        };
        self.validate_no_conflict(&cache, table_id, start_at, end_at, Some(id))?;

        let mut updated = existing;
        updated.table_id = table_id;
        updated.start_at = start_at;
        updated.end_at = end_at;
        updated.party_size = party_size;
        if let Some(notes) = changes.notes {
            updated.notes = Some(notes);
        }

        self.storage.upsert(&updated)?;
        cache.insert(id, updated.clone());
        info!("Reservation {} updated", id);
        Ok(updated)
    }

    /// Apply a status transition
    pub fn change_status(&self, id: i64, target: ReservationStatus) -> AppResult<Reservation> {
        let mut cache = self.cache.write();
        self.change_status_locked(&mut cache, id, target)
    }

    /// Cancel a reservation. Cancelling an already-cancelled reservation is
    /// a no-op, not an error. Check and transition happen under one write
    /// lock so concurrent cancels both observe the idempotent path.
    pub fn cancel(&self, id: i64) -> AppResult<Reservation> {
        let mut cache = self.cache.write();
        if let Some(existing) = cache.get(&id)
            && existing.status == ReservationStatus::Cancelled
        {
            return Ok(existing.clone());
        }
        self.change_status_locked(&mut cache, id, ReservationStatus::Cancelled)
    }

    fn change_status_locked(
        &self,
        cache: &mut HashMap<i64, Reservation>,
        id: i64,
        target: ReservationStatus,
    ) -> AppResult<Reservation> {
        let mut reservation = cache
            .get(&id)
            .ok_or_else(|| AppError::reservation_not_found(id))?
            .clone();

        lifecycle::transition(&mut reservation, target)?;
        self.storage.upsert(&reservation)?;
        cache.insert(id, reservation.clone());
        info!("Reservation {} -> {}", id, target);
        Ok(reservation)
    }

    // ========== Queries ==========

    /// Fetch a single reservation, expiring it first if overdue
    pub fn get(&self, id: i64) -> AppResult<Reservation> {
        let mut cache = self.cache.write();
        self.sweep_one_locked(&mut cache, id)?;
        cache
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::reservation_not_found(id))
    }

    /// All reservations starting on the given business date, ascending by start
    pub fn list_for_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        let mut cache = self.cache.write();
        self.sweep_locked(&mut cache)?;
        let mut out: Vec<Reservation> = cache
            .values()
            .filter(|r| r.start_date(self.tz) == date)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.start_at);
        Ok(out)
    }

    /// All reservations for a registered customer, ascending by start
    pub fn list_for_customer(&self, customer_id: i64) -> AppResult<Vec<Reservation>> {
        let mut cache = self.cache.write();
        self.sweep_locked(&mut cache)?;
        let mut out: Vec<Reservation> = cache
            .values()
            .filter(|r| r.customer.registered_id() == Some(customer_id))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.start_at);
        Ok(out)
    }

    /// Occupied `[start, end)` millis intervals for a table on a date, for
    /// slot-occupying reservations. A reservation with no explicit end
    /// occupies one slot. Feeds the availability computation.
    pub fn occupied_intervals(&self, date: NaiveDate, table_id: i64) -> AppResult<Vec<(i64, i64)>> {
        let mut cache = self.cache.write();
        self.sweep_locked(&mut cache)?;
        let mut intervals: Vec<(i64, i64)> = cache
            .values()
            .filter(|r| {
                r.status.occupies_table()
                    && r.table_id == Some(table_id)
                    && r.start_date(self.tz) == date
            })
            .map(|r| (r.start_at, r.end_at.unwrap_or(r.start_at + SLOT_MILLIS)))
            .collect();
        intervals.sort();
        Ok(intervals)
    }

    // ========== Expiry sweep ==========

    /// Auto-cancel every overdue reservation. Returns how many were expired.
    pub fn sweep_expired(&self) -> AppResult<usize> {
        let mut cache = self.cache.write();
        self.sweep_locked(&mut cache)
    }

    fn sweep_locked(&self, cache: &mut HashMap<i64, Reservation>) -> AppResult<usize> {
        let now = self.clock.now_millis();
        let overdue: Vec<i64> = cache
            .values()
            .filter(|r| lifecycle::should_auto_cancel(r, now, self.grace_millis))
            .map(|r| r.id)
            .collect();

        for id in &overdue {
            if let Some(reservation) = cache.get(id) {
                let mut expired = reservation.clone();
                expired.status = ReservationStatus::Cancelled;
                self.storage.upsert(&expired)?;
                cache.insert(*id, expired);
                info!("Reservation {} auto-cancelled (grace period elapsed)", id);
            }
        }
        Ok(overdue.len())
    }

    fn sweep_one_locked(&self, cache: &mut HashMap<i64, Reservation>, id: i64) -> AppResult<()> {
        let now = self.clock.now_millis();
        if let Some(reservation) = cache.get(&id)
            && lifecycle::should_auto_cancel(reservation, now, self.grace_millis)
        {
            let mut expired = reservation.clone();
            expired.status = ReservationStatus::Cancelled;
            self.storage.upsert(&expired)?;
            cache.insert(id, expired);
            info!("Reservation {} auto-cancelled (grace period elapsed)", id);
        }
        Ok(())
    }

    // ========== Validation ==========

    /// Closed day and slot membership; returns the booking start in millis
    fn validate_slot(&self, date: NaiveDate, time: NaiveTime) -> AppResult<i64> {
        if self.slots.calendar().is_closed(date) {
            return Err(AppError::closed_day(date.to_string()));
        }
        if !self.slots.is_bookable_slot(date, time) {
            return Err(AppError::out_of_window(time.format("%H:%M").to_string()));
        }
        Ok(date_time_to_millis(date, time, self.tz))
    }

    fn validate_future(&self, start_at: i64) -> AppResult<()> {
        // A booking at the exact current instant is still acceptable.
        if start_at < self.clock.now_millis() {
            return Err(AppError::past_datetime());
        }
        Ok(())
    }

    fn validate_table(&self, table_id: Option<i64>) -> AppResult<()> {
        let Some(id) = table_id else {
            return Ok(());
        };
        let table = self
            .tables
            .find(id)
            .ok_or_else(|| AppError::table_not_found(id))?;
        if !table.is_active {
            return Err(AppError::with_message(
                ErrorCode::TableInactive,
                format!("Table {} is inactive", id),
            ));
        }
        Ok(())
    }

    /// Interval overlap on `[start, end)`. A reservation without an explicit
    /// end occupies one slot, with an end it occupies the whole window.
    fn validate_no_conflict(
        &self,
        cache: &HashMap<i64, Reservation>,
        table_id: Option<i64>,
        start_at: i64,
        end_at: Option<i64>,
        exclude: Option<i64>,
    ) -> AppResult<()> {
        let Some(table_id) = table_id else {
            // 未分配桌位的预订不占用槽位
            return Ok(());
        };
        let proposed_end = end_at.unwrap_or(start_at + SLOT_MILLIS);
        let conflict = cache.values().find(|r| {
            Some(r.id) != exclude
                && r.status.occupies_table()
                && r.table_id == Some(table_id)
                && start_at < r.end_at.unwrap_or(r.start_at + SLOT_MILLIS)
                && r.start_at < proposed_end
        });
        match conflict {
            Some(_) => Err(AppError::slot_conflict(table_id)),
            None => Ok(()),
        }
    }
}
