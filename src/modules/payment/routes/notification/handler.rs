use super::{
    service::service,
    types::request::{self, ClientId, RequestId, RequestTimestamp, Signature},
};
use crate::types::Context;
use axum::{extract::State, http::HeaderMap, response::IntoResponse};
use bytes::Bytes;
use headers::HeaderMapExt;
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let headers = match (
        headers.typed_get::<ClientId>(),
        headers.typed_get::<RequestId>(),
        headers.typed_get::<RequestTimestamp>(),
        headers.typed_get::<Signature>(),
    ) {
        (Some(client_id), Some(request_id), Some(request_timestamp), Some(signature)) => {
            Some(request::Headers {
                client_id,
                request_id,
                request_timestamp,
                signature,
            })
        }
        _ => None,
    };

    service(ctx, request::Payload { headers, body }).await
}
