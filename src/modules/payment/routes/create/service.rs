use super::types::{request, response};
use crate::{
    modules::payment::{
        gateway::types::{CheckoutCustomer, CheckoutRequest, NewCheckout},
        repository::{self, CreatePaymentPayload},
        state,
    },
    types::Context,
    utils::validation::normalize_phone_number,
};
use bigdecimal::ToPrimitive;
use std::sync::Arc;
use validator::{Validate, ValidationError, ValidationErrors};

pub fn callback_url(callback_domain: &str, booking_id: &str) -> String {
    format!("{}/bookings/{}", callback_domain, booking_id)
}

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    payload.validate().map_err(|errors| {
        tracing::warn!("Failed to validate payload: {errors}");
        response::Error::FailedToValidate(errors)
    })?;

    let amount = payload.amount.to_i64().ok_or_else(|| {
        tracing::warn!("Payment amount {} is out of range", payload.amount);
        let mut errors = ValidationErrors::new();
        errors.add("amount", ValidationError::new("INVALID_AMOUNT"));
        response::Error::FailedToValidate(errors)
    })?;

    if ctx
        .payments
        .find_by_booking_id(payload.booking_id.clone())
        .await
        .map_err(|_| response::Error::FailedToFetchPayment)?
        .is_some()
    {
        return Err(response::Error::PaymentAlreadyExists);
    }

    let phone = normalize_phone_number(&payload.phone);
    let (transaction_status, payment_status) = state::initial(payload.reserve);

    let checkout: CheckoutRequest = NewCheckout {
        amount,
        invoice_number: payload.booking_id.clone(),
        callback_url: callback_url(&ctx.payment.callback_domain, &payload.booking_id),
        due_minutes: ctx.payment.due_minutes,
        customer: CheckoutCustomer {
            name: payload.name.clone(),
            email: payload.email.clone(),
            phone: phone.clone(),
        },
    }
    .into();

    let task_ctx = ctx.clone();
    let payment = tokio::spawn(async move {
        let dispatched = task_ctx
            .payment
            .gateway
            .create_payment(&checkout)
            .await
            .map_err(response::Error::Gateway)?;

        task_ctx
            .payments
            .create(CreatePaymentPayload {
                amount: payload.amount,
                name: payload.name,
                email: payload.email,
                phone,
                user_id: payload.user_id,
                booking_id: payload.booking_id,
                field_id: payload.field_id,
                transaction_status,
                payment_status,
                gateway_reference: dispatched.response.gateway_reference(),
                checkout_url: Some(dispatched.response.response.payment.url),
                request_id: dispatched.request_id,
            })
            .await
            .map_err(|err| match err {
                repository::Error::DuplicateBooking => response::Error::PaymentAlreadyExists,
                repository::Error::UnexpectedError => response::Error::FailedToCreatePayment,
            })
    })
    .await
    .map_err(|err| {
        tracing::error!("Payment creation task failed: {}", err);
        response::Error::UnexpectedError
    })??;

    tracing::info!(
        payment_id = %payment.id,
        booking_id = %payment.booking_id,
        request_id = %payment.request_id,
        "Payment created"
    );

    Ok(response::Success::PaymentCreated(payment))
}
