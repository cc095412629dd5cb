use serde::{Deserialize, Serialize};

pub const CURRENCY: &str = "IDR";

/// Outbound checkout body. Field order is the serialization order and is
/// therefore part of what gets digested.
#[derive(Serialize, Debug, Clone)]
pub struct CheckoutRequest {
    pub order: CheckoutOrder,
    pub payment: CheckoutPaymentTerms,
    pub customer: CheckoutCustomer,
}

#[derive(Serialize, Debug, Clone)]
pub struct CheckoutOrder {
    pub amount: i64,
    pub currency: &'static str,
    pub invoice_number: String,
    pub callback_url: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct CheckoutPaymentTerms {
    /// Minutes the customer has to complete the payment.
    pub payment_due_date: u32,
}

#[derive(Serialize, Debug, Clone)]
pub struct CheckoutCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub struct NewCheckout {
    pub amount: i64,
    pub invoice_number: String,
    pub callback_url: String,
    pub due_minutes: u32,
    pub customer: CheckoutCustomer,
}

impl From<NewCheckout> for CheckoutRequest {
    fn from(checkout: NewCheckout) -> Self {
        Self {
            order: CheckoutOrder {
                amount: checkout.amount,
                currency: CURRENCY,
                invoice_number: checkout.invoice_number,
                callback_url: checkout.callback_url,
            },
            payment: CheckoutPaymentTerms {
                payment_due_date: checkout.due_minutes,
            },
            customer: checkout.customer,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub message: Vec<String>,
    pub response: CheckoutResponseData,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CheckoutResponseData {
    pub order: CheckoutResponseOrder,
    pub payment: CheckoutResponsePayment,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CheckoutResponseOrder {
    pub invoice_number: String,
    pub session_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CheckoutResponsePayment {
    pub url: String,
    pub token_id: Option<String>,
    pub expired_date: Option<String>,
}

impl CheckoutResponse {
    /// Reference the gateway assigned to this checkout, if it returned one.
    pub fn gateway_reference(&self) -> Option<String> {
        self.response
            .payment
            .token_id
            .clone()
            .or_else(|| self.response.order.session_id.clone())
    }
}

/// Result of one signed checkout call.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub request_id: String,
    pub response: CheckoutResponse,
}
