use crate::{
    app,
    modules::payment::repository::{
        memory::MemoryPaymentStore, CreatePaymentPayload, PaymentStatus, TransactionStatus,
    },
    types::{AppContext, AppEnvironment, Context, PaymentConfig},
};
use axum::{body::Body, response::Response, Router};
use bigdecimal::BigDecimal;
use serde_json::Value;
use std::sync::Arc;

pub const CLIENT_ID: &str = "MCH-0001-10791114622547";
pub const SECRET_KEY: &str = "SK-tVUECiLmpqWD7uLnZnGL";

pub fn context(
    gateway_base_url: &str,
    store: Arc<MemoryPaymentStore>,
    verify_notifications: bool,
) -> Arc<Context> {
    let payment = PaymentConfig {
        base_url: gateway_base_url.to_string(),
        client_id: CLIENT_ID.to_string(),
        secret_key: SECRET_KEY.to_string(),
        callback_domain: "https://fields.example.com".to_string(),
        due_minutes: 60,
        timeout_secs: 5,
        verify_notifications,
    }
    .to_context()
    .unwrap();

    Arc::new(Context {
        app: AppContext {
            host: "127.0.0.1".to_string(),
            environment: AppEnvironment::Development,
            port: 8000,
            url: "http://127.0.0.1:8000".to_string(),
        },
        payment,
        payments: store,
    })
}

pub fn app(ctx: Arc<Context>) -> Router {
    app::router(ctx)
}

pub fn pending_payment(booking_id: &str) -> CreatePaymentPayload {
    CreatePaymentPayload {
        amount: BigDecimal::from(100000),
        name: "John Doe".to_string(),
        email: "john.doe@gmail.com".to_string(),
        phone: "081177777548".to_string(),
        user_id: Some("USER-1".to_string()),
        booking_id: booking_id.to_string(),
        field_id: "FIELD-1".to_string(),
        transaction_status: TransactionStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        request_id: "cc682442-6c22-493e-8121-b9ef6b3fa728".to_string(),
        checkout_url: Some("https://sandbox.example.com/checkout/INV-1".to_string()),
        gateway_reference: Some("TOKEN-1".to_string()),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
