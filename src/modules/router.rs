use super::payment;
use crate::types::Context;
use axum::routing::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().nest("/payments", payment::routes::get_router())
}

pub fn get_notification_router() -> Router<Arc<Context>> {
    Router::new().nest("/payments", payment::routes::get_notification_router())
}
