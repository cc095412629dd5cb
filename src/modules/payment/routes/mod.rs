mod create;
mod get;
mod notification;

#[cfg(test)]
pub mod testing;

use crate::types::Context;
use axum::routing::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .merge(create::get_router())
        .merge(get::get_router())
}

pub fn get_notification_router() -> Router<Arc<Context>> {
    notification::get_router()
}
