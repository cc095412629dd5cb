//! In-process stand-in for the checkout gateway.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub headers: HeaderMap,
    pub body: String,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

struct MockState {
    status: StatusCode,
    response: Value,
    received: Mutex<Vec<ReceivedRequest>>,
}

pub struct MockGateway {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockGateway {
    pub async fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().await.clone()
    }
}

async fn checkout(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.received.lock().await.push(ReceivedRequest {
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    (state.status, Json(state.response.clone()))
}

pub async fn spawn_gateway(status: StatusCode, response: Value) -> MockGateway {
    let state = Arc::new(MockState {
        status,
        response,
        received: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route(super::CHECKOUT_TARGET, post(checkout))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockGateway {
        base_url: format!("http://{}", addr),
        state,
    }
}

pub fn checkout_success(invoice_number: &str) -> Value {
    json!({
        "message": ["SUCCESS"],
        "response": {
            "order": {
                "invoice_number": invoice_number,
                "session_id": "SESSION-1"
            },
            "payment": {
                "url": format!("https://sandbox.example.com/checkout/{}", invoice_number),
                "token_id": "TOKEN-1",
                "expired_date": "20261017090000"
            }
        }
    })
}
