//! Availability API 模块

mod handler;

pub use handler::{AvailabilityResponse, CapacityResponse};

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/availability", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::slots))
        .route("/capacity", get(handler::capacity))
}
