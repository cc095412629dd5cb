pub mod request {
    use crate::utils::validation::validate_phone_number;
    use bigdecimal::{BigDecimal, ToPrimitive};
    use serde::Deserialize;
    use std::borrow::Cow;
    use validator::{Validate, ValidationError};

    fn validate_amount(amount: &BigDecimal) -> Result<(), ValidationError> {
        if amount <= &BigDecimal::from(0) || amount.with_scale(0) != *amount {
            return Err(ValidationError::new("INVALID_AMOUNT")
                .with_message(Cow::from("Amount must be a positive whole number")));
        }

        if amount.to_i64().is_none() {
            return Err(ValidationError::new("INVALID_AMOUNT")
                .with_message(Cow::from("Amount is too large")));
        }

        Ok(())
    }

    fn validate_identifier(id: &str) -> Result<(), ValidationError> {
        if id.is_empty() || id.trim() != id {
            return Err(ValidationError::new("INVALID_IDENTIFIER").with_message(Cow::from(
                "Identifier must not be empty or padded with whitespace",
            )));
        }

        Ok(())
    }

    #[derive(Deserialize, Validate)]
    pub struct Payload {
        #[validate(custom(code = "INVALID_AMOUNT", function = "validate_amount"))]
        pub amount: BigDecimal,
        #[validate(length(min = 1, code = "INVALID_NAME", message = "Name is required"))]
        pub name: String,
        #[validate(email(code = "INVALID_EMAIL", message = "Invalid email address"))]
        pub email: String,
        #[validate(custom(code = "INVALID_PHONE_NUMBER", function = "validate_phone_number"))]
        pub phone: String,
        #[validate(custom(code = "INVALID_BOOKING_ID", function = "validate_identifier"))]
        pub booking_id: String,
        #[validate(custom(code = "INVALID_FIELD_ID", function = "validate_identifier"))]
        pub field_id: String,
        pub user_id: Option<String>,
        #[serde(default)]
        pub reserve: bool,
    }
}

pub mod response {
    use crate::modules::payment::{gateway, repository::Payment};
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;
    use validator::ValidationErrors;

    pub enum Success {
        PaymentCreated(Payment),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::PaymentCreated(payment) => (
                    StatusCode::CREATED,
                    Json(json!({
                        "checkout_url": payment.checkout_url.clone(),
                        "payment": payment,
                    })),
                )
                    .into_response(),
            }
        }
    }

    pub enum Error {
        FailedToValidate(ValidationErrors),
        PaymentAlreadyExists,
        FailedToFetchPayment,
        FailedToCreatePayment,
        Gateway(gateway::Error),
        UnexpectedError,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::FailedToValidate(errors) => {
                    crate::utils::validation::into_response(errors).into_response()
                }
                Self::PaymentAlreadyExists => (
                    StatusCode::CONFLICT,
                    Json(json!({ "error": "A payment already exists for this booking" })),
                )
                    .into_response(),
                Self::FailedToFetchPayment => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to fetch payment" })),
                )
                    .into_response(),
                Self::FailedToCreatePayment => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create payment" })),
                )
                    .into_response(),
                Self::Gateway(gateway::Error::Configuration(_)) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Payment gateway is misconfigured" })),
                )
                    .into_response(),
                Self::Gateway(err) => (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({
                        "error": "Payment gateway request failed",
                        "upstream_status": err.upstream_status(),
                    })),
                )
                    .into_response(),
                Self::UnexpectedError => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "An unexpected error occurred" })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
