//! Availability API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use shared::AppResult;

use crate::core::ServerState;
use crate::utils::time::parse_date;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    pub table_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub date: String,
    pub table_id: i64,
    /// 可订起始时段，HH:MM，升序
    pub slots: Vec<String>,
}

/// GET /api/availability?date=…&table_id=… - 某桌某日的空闲时段
pub async fn slots(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let date = parse_date(&query.date)?;
    let slots = state
        .availability()
        .available_slots(date, query.table_id)?
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect();

    Ok(Json(AvailabilityResponse {
        date: query.date,
        table_id: query.table_id,
        slots,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CapacityQuery {
    pub party_size: i32,
}

#[derive(Debug, Serialize)]
pub struct CapacityResponse {
    pub party_size: i32,
    /// 容得下该人数的活跃桌数 (仅供参考，不占位)
    pub tables_available: usize,
}

/// GET /api/availability/capacity?party_size=… - 参考容量
pub async fn capacity(
    State(state): State<ServerState>,
    Query(query): Query<CapacityQuery>,
) -> AppResult<Json<CapacityResponse>> {
    let tables_available = state.availability().has_capacity(query.party_size);
    Ok(Json(CapacityResponse {
        party_size: query.party_size,
        tables_available,
    }))
}
