//! Reservation API 模块

mod handler;

pub use handler::{ReservationStatusChange, ReservationView};

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/status", post(handler::change_status))
        .route("/{id}/cancel", post(handler::cancel))
}
