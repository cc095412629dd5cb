pub mod request {
    pub struct Payload {
        pub id: String,
    }
}

pub mod response {
    use crate::modules::payment::repository::Payment;
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        Payment(Payment),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Payment(payment) => (StatusCode::OK, Json(json!(payment))).into_response(),
            }
        }
    }

    pub enum Error {
        FailedToFetchPayment,
        PaymentNotFound,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::FailedToFetchPayment => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch payment" })),
                )
                    .into_response(),
                Self::PaymentNotFound => (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Payment not found" })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
