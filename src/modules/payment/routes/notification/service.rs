use super::types::{
    request::{self, NOTIFICATION_TARGET},
    response,
};
use crate::{
    modules::payment::{
        gateway::signature::{self, SigningContext},
        repository::TransitionError,
        state::{self, Transition, TransitionRequest},
    },
    types::Context,
};
use std::sync::Arc;

fn verify_headers(ctx: &Context, payload: &request::Payload) -> Result<(), response::Error> {
    let headers = payload.headers.as_ref().ok_or_else(|| {
        tracing::warn!("Payment notification is missing signature headers");
        response::Error::Unauthorized
    })?;

    let credentials = ctx.payment.gateway.credentials();
    if headers.client_id.0 != credentials.client_id() {
        tracing::warn!(
            client_id = %headers.client_id.0,
            "Payment notification sent for a different client"
        );
        return Err(response::Error::Unauthorized);
    }

    let body = std::str::from_utf8(&payload.body).map_err(|err| {
        tracing::warn!("Payment notification body is not valid utf-8: {}", err);
        response::Error::Unauthorized
    })?;

    let signing = SigningContext::received(
        credentials,
        headers.request_id.0.clone(),
        headers.request_timestamp.0.clone(),
        NOTIFICATION_TARGET,
    );

    signature::verify(body, &signing, &headers.signature.0).map_err(|err| {
        tracing::warn!(
            request_id = %headers.request_id.0,
            "Failed to verify payment notification: {}",
            err
        );
        response::Error::Unauthorized
    })
}

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    if ctx.payment.verify_notifications {
        verify_headers(&ctx, &payload)?;
    }

    let notification = serde_json::from_slice::<request::Notification>(&payload.body)
        .map_err(|err| {
            tracing::warn!("Malformed payment notification: {}", err);
            response::Error::InvalidPayload
        })?;

    let invoice_number = notification.order.invoice_number.trim().to_string();
    if invoice_number.is_empty() {
        tracing::warn!("Payment notification has an empty invoice number");
        return Err(response::Error::InvalidPayload);
    }

    let status = state::parse_status(&notification.transaction.status).map_err(|err| {
        tracing::warn!(
            invoice_number = %invoice_number,
            "Payment notification has an unrecognized status: {:?}",
            err
        );
        response::Error::InvalidPayload
    })?;

    tracing::debug!(
        invoice_number = %invoice_number,
        status = %status,
        date = ?notification.transaction.date,
        original_request_id = ?notification.transaction.original_request_id,
        "Received payment notification"
    );

    let transition = ctx
        .payments
        .transition_by_booking_id(
            invoice_number.clone(),
            TransitionRequest {
                status,
                amount: notification.order.amount,
            },
        )
        .await
        .map_err(|err| match err {
            TransitionError::PaymentNotFound => {
                tracing::warn!(
                    invoice_number = %invoice_number,
                    "Payment notification for an unknown invoice"
                );
                response::Error::PaymentNotFound
            }
            TransitionError::Rejected(reason) => {
                tracing::warn!(
                    invoice_number = %invoice_number,
                    "Payment notification rejected: {:?}",
                    reason
                );
                response::Error::TransitionRejected
            }
            TransitionError::UnexpectedError => response::Error::ServerError,
        })?;

    match transition {
        Transition::Applied(payment) => {
            tracing::info!(
                payment_id = %payment.id,
                invoice_number = %invoice_number,
                transaction_status = %payment.transaction_status,
                payment_status = %payment.payment_status,
                "Payment status updated"
            );
            Ok(response::Success::Applied)
        }
        Transition::Unchanged(payment) => {
            tracing::info!(
                payment_id = %payment.id,
                invoice_number = %invoice_number,
                "Duplicate payment notification ignored"
            );
            Ok(response::Success::Duplicate)
        }
    }
}
