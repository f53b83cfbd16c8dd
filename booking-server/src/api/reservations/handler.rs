//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::models::{
    CustomerRef, Reservation, ReservationCreate, ReservationStatus, ReservationUpdate,
};
use shared::{AppError, AppResult};

use crate::core::ServerState;
use crate::utils::time::{millis_to_local, parse_date};

/// 预订视图 - 对外展示用
///
/// 存储层只存绝对时间戳；日期、时段和客户展示名在这里按营业时区补全。
#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub party_size: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub requested_at: i64,
}

impl ReservationView {
    fn from_reservation(reservation: Reservation, state: &ServerState) -> Self {
        let tz = state.config.timezone;
        let (customer_id, customer_name, phone) = match &reservation.customer {
            CustomerRef::Registered { customer_id } => (
                Some(*customer_id),
                state.customers.display_name(*customer_id),
                None,
            ),
            CustomerRef::Manual { name, phone } => {
                (None, Some(name.clone()), Some(phone.clone()))
            }
        };

        Self {
            id: reservation.id,
            customer_id,
            customer_name,
            phone,
            date: reservation.start_date(tz).to_string(),
            time: reservation.start_time(tz).format("%H:%M").to_string(),
            end_time: reservation
                .end_at
                .map(|end| millis_to_local(end, tz).format("%H:%M").to_string()),
            party_size: reservation.party_size,
            table_id: reservation.table_id,
            status: reservation.status,
            notes: reservation.notes,
            requested_at: reservation.requested_at,
        }
    }
}

/// 列表查询参数 - 按日期或按客户
#[derive(Debug, Deserialize)]
pub struct ReservationListQuery {
    pub date: Option<String>,
    pub customer_id: Option<i64>,
}

/// 状态变更请求体
#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationStatusChange {
    pub status: ReservationStatus,
}

/// GET /api/reservations?date=… | ?customer_id=… - 预订列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ReservationListQuery>,
) -> AppResult<Json<Vec<ReservationView>>> {
    let reservations = match (&query.date, query.customer_id) {
        (Some(date), None) => state.store.list_for_date(parse_date(date)?)?,
        (None, Some(customer_id)) => state.store.list_for_customer(customer_id)?,
        _ => {
            return Err(AppError::invalid_request(
                "Provide exactly one of date or customer_id",
            ));
        }
    };
    Ok(Json(
        reservations
            .into_iter()
            .map(|r| ReservationView::from_reservation(r, &state))
            .collect(),
    ))
}

/// POST /api/reservations - 创建预订
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<Json<ReservationView>> {
    let reservation = state.store.create(payload)?;
    Ok(Json(ReservationView::from_reservation(reservation, &state)))
}

/// GET /api/reservations/:id - 获取单个预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationView>> {
    let reservation = state.store.get(id)?;
    Ok(Json(ReservationView::from_reservation(reservation, &state)))
}

/// PUT /api/reservations/:id - 更新预订
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationUpdate>,
) -> AppResult<Json<ReservationView>> {
    let reservation = state.store.update(id, payload)?;
    Ok(Json(ReservationView::from_reservation(reservation, &state)))
}

/// POST /api/reservations/:id/status - 状态变更
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationStatusChange>,
) -> AppResult<Json<ReservationView>> {
    let reservation = state.store.change_status(id, payload.status)?;
    Ok(Json(ReservationView::from_reservation(reservation, &state)))
}

/// POST /api/reservations/:id/cancel - 取消预订 (幂等)
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationView>> {
    let reservation = state.store.cancel(id)?;
    Ok(Json(ReservationView::from_reservation(reservation, &state)))
}
