pub mod request {
    use axum::http::header::{HeaderName, HeaderValue};
    use bigdecimal::BigDecimal;
    use bytes::Bytes;
    use headers::{Error, Header};
    use serde::Deserialize;
    use std::iter;

    pub const NOTIFICATION_TARGET: &str = "/notifications/payments";

    macro_rules! gateway_header {
        ($name:ident, $static_name:ident, $header:literal) => {
            pub static $static_name: HeaderName = HeaderName::from_static($header);

            #[derive(Clone, Debug)]
            pub struct $name(pub String);

            impl Header for $name {
                fn name() -> &'static HeaderName {
                    &$static_name
                }

                fn decode<'i, I>(values: &mut I) -> Result<Self, Error>
                where
                    Self: Sized,
                    I: Iterator<Item = &'i HeaderValue>,
                {
                    values
                        .next()
                        .and_then(|value| value.to_str().ok())
                        .map(|value| Self(value.to_string()))
                        .ok_or(Error::invalid())
                }

                fn encode<E>(&self, values: &mut E)
                where
                    E: Extend<HeaderValue>,
                {
                    if let Ok(value) = HeaderValue::from_str(&self.0) {
                        values.extend(iter::once(value))
                    }
                }
            }
        };
    }

    gateway_header!(ClientId, CLIENT_ID, "client-id");
    gateway_header!(RequestId, REQUEST_ID, "request-id");
    gateway_header!(RequestTimestamp, REQUEST_TIMESTAMP, "request-timestamp");
    gateway_header!(Signature, SIGNATURE, "signature");

    pub struct Headers {
        pub client_id: ClientId,
        pub request_id: RequestId,
        pub request_timestamp: RequestTimestamp,
        pub signature: Signature,
    }

    pub struct Payload {
        /// `None` when any of the signing headers is missing.
        pub headers: Option<Headers>,
        pub body: Bytes,
    }

    #[derive(Deserialize, Debug)]
    pub struct NotificationOrder {
        pub invoice_number: String,
        pub amount: Option<BigDecimal>,
    }

    #[derive(Deserialize, Debug)]
    pub struct NotificationTransaction {
        pub status: String,
        pub date: Option<String>,
        pub original_request_id: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Notification {
        pub order: NotificationOrder,
        pub transaction: NotificationTransaction,
    }
}

pub mod response {
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        Applied,
        Duplicate,
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Applied => (
                    StatusCode::OK,
                    Json(json!({ "message": "Notification processed" })),
                )
                    .into_response(),
                Self::Duplicate => (
                    StatusCode::OK,
                    Json(json!({ "message": "Notification already processed" })),
                )
                    .into_response(),
            }
        }
    }

    /// Everything except `Unauthorized` and `ServerError` is acknowledged
    /// with a 200 so the gateway does not redeliver it.
    pub enum Error {
        Unauthorized,
        InvalidPayload,
        PaymentNotFound,
        TransitionRejected,
        ServerError,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Invalid notification signature" })),
                )
                    .into_response(),
                Self::InvalidPayload | Self::PaymentNotFound | Self::TransitionRejected => (
                    StatusCode::OK,
                    Json(json!({ "message": "Notification received" })),
                )
                    .into_response(),
                Self::ServerError => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to process notification" })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
