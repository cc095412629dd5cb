use super::state::{self, Transition, TransitionRequest};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all(serialize = "UPPERCASE", deserialize = "UPPERCASE"))]
#[sqlx(type_name = "transaction_status", rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Expired,
    Timeout,
    Redirect,
}

impl TransactionStatus {
    /// Whether no further status change is accepted.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending | TransactionStatus::Redirect)
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransactionStatus::Pending),
            "SUCCESS" => Ok(TransactionStatus::Success),
            "FAILED" => Ok(TransactionStatus::Failed),
            "EXPIRED" => Ok(TransactionStatus::Expired),
            "TIMEOUT" => Ok(TransactionStatus::Timeout),
            "REDIRECT" => Ok(TransactionStatus::Redirect),
            _ => Err(format!("'{}' is not a valid TransactionStatus", s)),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Expired => "EXPIRED",
            TransactionStatus::Timeout => "TIMEOUT",
            TransactionStatus::Redirect => "REDIRECT",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all(serialize = "UPPERCASE", deserialize = "UPPERCASE"))]
#[sqlx(type_name = "payment_status", rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Reserved,
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAID" => Ok(PaymentStatus::Paid),
            "UNPAID" => Ok(PaymentStatus::Unpaid),
            "RESERVED" => Ok(PaymentStatus::Reserved),
            _ => Err(format!("'{}' is not a valid PaymentStatus", s)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::Reserved => "RESERVED",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Payment {
    pub id: String,
    pub amount: BigDecimal,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub user_id: Option<String>,
    pub booking_id: String,
    pub field_id: String,
    pub transaction_status: TransactionStatus,
    pub payment_status: PaymentStatus,
    pub request_id: String,
    pub checkout_url: Option<String>,
    pub gateway_reference: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentPayload {
    pub amount: BigDecimal,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub user_id: Option<String>,
    pub booking_id: String,
    pub field_id: String,
    pub transaction_status: TransactionStatus,
    pub payment_status: PaymentStatus,
    pub request_id: String,
    pub checkout_url: Option<String>,
    pub gateway_reference: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Error {
    UnexpectedError,
    DuplicateBooking,
}

#[derive(Debug, PartialEq)]
pub enum TransitionError {
    PaymentNotFound,
    Rejected(state::Error),
    UnexpectedError,
}

impl From<Error> for TransitionError {
    fn from(_: Error) -> Self {
        TransitionError::UnexpectedError
    }
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, payload: CreatePaymentPayload) -> Result<Payment, Error>;

    async fn find_by_id(&self, id: String) -> Result<Option<Payment>, Error>;

    async fn find_by_booking_id(&self, booking_id: String) -> Result<Option<Payment>, Error>;

    /// Loads the payment for `booking_id` under a lock, runs the state
    /// machine, and persists the result before releasing the lock.
    async fn transition_by_booking_id(
        &self,
        booking_id: String,
        request: TransitionRequest,
    ) -> Result<Transition, TransitionError>;
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreatePaymentPayload,
) -> Result<Payment, Error> {
    sqlx::query_as::<_, Payment>(
        "
        INSERT INTO payments (
            id,
            amount,
            name,
            email,
            phone,
            user_id,
            booking_id,
            field_id,
            transaction_status,
            payment_status,
            request_id,
            checkout_url,
            gateway_reference
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(&payload.amount)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.user_id)
    .bind(&payload.booking_id)
    .bind(&payload.field_id)
    .bind(&payload.transaction_status)
    .bind(&payload.payment_status)
    .bind(&payload.request_id)
    .bind(&payload.checkout_url)
    .bind(&payload.gateway_reference)
    .fetch_one(e)
    .await
    .map_err(|err| {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                tracing::warn!(
                    "Payment for booking {} already exists",
                    payload.booking_id
                );
                return Error::DuplicateBooking;
            }
        }

        tracing::error!(
            "Error occurred while trying to create payment {:?}: {}",
            payload,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Payment>, Error> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(&id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch payment by id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_by_booking_id<'e, E: PgExecutor<'e>>(
    e: E,
    booking_id: String,
) -> Result<Option<Payment>, Error> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = $1")
        .bind(&booking_id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch payment by booking id {}: {}",
                booking_id,
                err
            );
            Error::UnexpectedError
        })
}

async fn find_by_booking_id_for_update<'e, E: PgExecutor<'e>>(
    e: E,
    booking_id: &str,
) -> Result<Option<Payment>, Error> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = $1 FOR UPDATE")
        .bind(booking_id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to lock payment for booking {}: {}",
                booking_id,
                err
            );
            Error::UnexpectedError
        })
}

pub async fn update_status<'e, E: PgExecutor<'e>>(
    e: E,
    payment: &Payment,
) -> Result<Payment, Error> {
    sqlx::query_as::<_, Payment>(
        "
        UPDATE payments
        SET
            transaction_status = $1,
            payment_status = $2,
            updated_at = NOW()
        WHERE id = $3
        RETURNING *
        ",
    )
    .bind(&payment.transaction_status)
    .bind(&payment.payment_status)
    .bind(&payment.id)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to update status of payment {}: {}",
            payment.id,
            err
        );
        Error::UnexpectedError
    })
}

pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn create(&self, payload: CreatePaymentPayload) -> Result<Payment, Error> {
        create(&self.pool, payload).await
    }

    async fn find_by_id(&self, id: String) -> Result<Option<Payment>, Error> {
        find_by_id(&self.pool, id).await
    }

    async fn find_by_booking_id(&self, booking_id: String) -> Result<Option<Payment>, Error> {
        find_by_booking_id(&self.pool, booking_id).await
    }

    async fn transition_by_booking_id(
        &self,
        booking_id: String,
        request: TransitionRequest,
    ) -> Result<Transition, TransitionError> {
        let mut tx = self.pool.begin().await.map_err(|err| {
            tracing::error!("Failed to start database transaction: {}", err);
            TransitionError::UnexpectedError
        })?;

        let payment = find_by_booking_id_for_update(&mut *tx, &booking_id)
            .await?
            .ok_or(TransitionError::PaymentNotFound)?;

        let transition = match state::apply_transition(payment, &request)
            .map_err(TransitionError::Rejected)?
        {
            Transition::Applied(payment) => {
                Transition::Applied(update_status(&mut *tx, &payment).await?)
            }
            unchanged => unchanged,
        };

        tx.commit().await.map_err(|err| {
            tracing::error!("Failed to commit database transaction: {}", err);
            TransitionError::UnexpectedError
        })?;

        Ok(transition)
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryPaymentStore;
    use super::*;
    use std::sync::Arc;

    fn payload(booking_id: &str) -> CreatePaymentPayload {
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
            checkout_url: None,
            gateway_reference: None,
        }
    }

    #[test]
    fn status_names_round_trip_through_strings() {
        for status in ["PENDING", "SUCCESS", "FAILED", "EXPIRED", "TIMEOUT", "REDIRECT"] {
            assert_eq!(status.parse::<TransactionStatus>().unwrap().to_string(), status);
        }
        for status in ["PAID", "UNPAID", "RESERVED"] {
            assert_eq!(status.parse::<PaymentStatus>().unwrap().to_string(), status);
        }
        assert!("success".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn only_pending_and_redirect_are_open() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::Redirect.is_terminal());
        assert!(TransactionStatus::Success.is_terminal());
        assert!(TransactionStatus::Timeout.is_terminal());
    }

    #[tokio::test]
    async fn second_payment_for_a_booking_is_rejected() {
        let store = MemoryPaymentStore::default();
        store.create(payload("INV-1")).await.unwrap();

        assert_eq!(
            store.create(payload("INV-1")).await.unwrap_err(),
            Error::DuplicateBooking
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn transition_of_unknown_booking_is_not_found() {
        let store = MemoryPaymentStore::default();

        let result = store
            .transition_by_booking_id(
                "INV-404".to_string(),
                TransitionRequest {
                    status: TransactionStatus::Success,
                    amount: None,
                },
            )
            .await;

        assert_eq!(result.unwrap_err(), TransitionError::PaymentNotFound);
    }

    #[tokio::test]
    async fn concurrent_terminal_notifications_apply_exactly_once() {
        let store = Arc::new(MemoryPaymentStore::default());
        let created = store.create(payload("INV-1")).await.unwrap();

        let handles = [TransactionStatus::Success, TransactionStatus::Failed]
            .into_iter()
            .map(|status| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .transition_by_booking_id(
                            "INV-1".to_string(),
                            TransitionRequest {
                                status,
                                amount: None,
                            },
                        )
                        .await
                })
            })
            .collect::<Vec<_>>();

        let mut applied = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(Transition::Applied(_)) => applied += 1,
                Err(TransitionError::Rejected(state::Error::StateConflict { .. })) => {
                    rejected += 1
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        assert_eq!((applied, rejected), (1, 1));

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(stored.transaction_status.is_terminal());
        assert_eq!(
            stored.payment_status == PaymentStatus::Paid,
            stored.transaction_status == TransactionStatus::Success
        );
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn postgres_lock_applies_concurrent_terminal_notifications_once(pool: PgPool) {
        let store = Arc::new(PgPaymentStore::new(pool));
        let created = store.create(payload("INV-1")).await.unwrap();

        let handles = [
            TransactionStatus::Success,
            TransactionStatus::Failed,
            TransactionStatus::Expired,
        ]
        .into_iter()
        .map(|status| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .transition_by_booking_id(
                        "INV-1".to_string(),
                        TransitionRequest {
                            status,
                            amount: None,
                        },
                    )
                    .await
            })
        })
        .collect::<Vec<_>>();

        let mut applied = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(Transition::Applied(payment)) => applied.push(payment),
                Err(TransitionError::Rejected(state::Error::StateConflict { .. })) => {}
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        assert_eq!(applied.len(), 1);

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.transaction_status, applied[0].transaction_status);
        assert_eq!(stored.payment_status, applied[0].payment_status);
        assert!(stored.updated_at.is_some());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn postgres_rejects_a_second_payment_for_a_booking(pool: PgPool) {
        let store = PgPaymentStore::new(pool);
        store.create(payload("INV-1")).await.unwrap();

        assert_eq!(
            store.create(payload("INV-1")).await.unwrap_err(),
            Error::DuplicateBooking
        );
    }
}
