use super::types::{request, response};
use crate::types::Context;
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    ctx.payments
        .find_by_id(payload.id)
        .await
        .map_err(|_| response::Error::FailedToFetchPayment)?
        .ok_or(response::Error::PaymentNotFound)
        .map(response::Success::Payment)
}

#[cfg(test)]
mod tests {
    use crate::modules::payment::{
        repository::{memory::MemoryPaymentStore, PaymentStore},
        routes::testing,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn get_request(id: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/payments/{}", id))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn returns_the_stored_payment() {
        let store = Arc::new(MemoryPaymentStore::default());
        let payment = store.create(testing::pending_payment("INV-1")).await.unwrap();
        let app = testing::app(testing::context("http://127.0.0.1:9", store, true));

        let response = app.oneshot(get_request(&payment.id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = testing::body_json(response).await;
        assert_eq!(body["id"], payment.id.as_str());
        assert_eq!(body["booking_id"], "INV-1");
        assert_eq!(body["transaction_status"], "PENDING");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = Arc::new(MemoryPaymentStore::default());
        let app = testing::app(testing::context("http://127.0.0.1:9", store, true));

        let response = app.oneshot(get_request("01J9Z3T2Q8W3K2X4V5B6N7M8P9")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
