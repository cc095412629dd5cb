use super::repository::{Payment, PaymentStatus, TransactionStatus};
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnknownStatus(String),
    StateConflict {
        current: TransactionStatus,
        requested: TransactionStatus,
    },
    AmountMismatch {
        expected: BigDecimal,
        reported: BigDecimal,
    },
}

#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub status: TransactionStatus,
    /// Amount the gateway reports as settled, when it reports one.
    pub amount: Option<BigDecimal>,
}

#[derive(Debug, Clone)]
pub enum Transition {
    Applied(Payment),
    Unchanged(Payment),
}

impl Transition {
    pub fn into_payment(self) -> Payment {
        match self {
            Transition::Applied(payment) | Transition::Unchanged(payment) => payment,
        }
    }
}

pub fn parse_status(status: &str) -> Result<TransactionStatus, Error> {
    TransactionStatus::from_str(status.trim()).map_err(|_| Error::UnknownStatus(status.to_string()))
}

/// Statuses a freshly created payment starts in.
pub fn initial(reserve: bool) -> (TransactionStatus, PaymentStatus) {
    let payment_status = if reserve {
        PaymentStatus::Reserved
    } else {
        PaymentStatus::Unpaid
    };

    (TransactionStatus::Pending, payment_status)
}

pub fn payment_status_for(
    transaction_status: &TransactionStatus,
    current: &PaymentStatus,
) -> PaymentStatus {
    match (transaction_status, current) {
        (TransactionStatus::Success, _) => PaymentStatus::Paid,
        (TransactionStatus::Pending | TransactionStatus::Redirect, PaymentStatus::Reserved) => {
            PaymentStatus::Reserved
        }
        _ => PaymentStatus::Unpaid,
    }
}

/// The single place transaction and payment statuses change.
///
/// A repeated status is a no-op so duplicate callbacks are harmless. Only
/// `PENDING` and `REDIRECT` may move to a different status.
pub fn apply_transition(mut payment: Payment, request: &TransitionRequest) -> Result<Transition, Error> {
    if payment.transaction_status == request.status {
        return Ok(Transition::Unchanged(payment));
    }

    if payment.transaction_status.is_terminal() {
        return Err(Error::StateConflict {
            current: payment.transaction_status.clone(),
            requested: request.status.clone(),
        });
    }

    if request.status == TransactionStatus::Success {
        if let Some(reported) = &request.amount {
            if reported < &payment.amount {
                return Err(Error::AmountMismatch {
                    expected: payment.amount.clone(),
                    reported: reported.clone(),
                });
            }
        }
    }

    payment.payment_status = payment_status_for(&request.status, &payment.payment_status);
    payment.transaction_status = request.status.clone();
    payment.updated_at = Some(Utc::now().naive_utc());

    Ok(Transition::Applied(payment))
}
