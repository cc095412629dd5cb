use super::error::{Error, GatewayResult};
use super::signature::{self, Credentials, SigningContext};
use super::types::{CheckoutRequest, CheckoutResponse, Dispatched};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

pub const CHECKOUT_TARGET: &str = "/checkout/v1/payment";

pub struct ClientConfig {
    pub base_url: String,
    pub client_id: String,
    pub secret_key: String,
    pub timeout: Duration,
}

/// Sends signed checkout requests. One call to [`Client::create_payment`] is
/// exactly one HTTP request; retrying is up to the caller.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

fn header_value(name: &str, value: &str) -> GatewayResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| {
        tracing::error!("Invalid value for header {}: {}", name, err);
        Error::Configuration(format!("invalid value for header {}", name))
    })
}

impl Client {
    pub fn new(config: ClientConfig) -> GatewayResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Configuration("base url is empty".to_string()));
        }

        let credentials = Credentials::new(config.client_id, config.secret_key)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Configuration(format!("failed to build http client: {}", err)))?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub async fn create_payment(&self, request: &CheckoutRequest) -> GatewayResult<Dispatched> {
        self.dispatch(
            request,
            SigningContext::fresh(&self.credentials, CHECKOUT_TARGET),
        )
        .await
    }

    async fn dispatch(
        &self,
        request: &CheckoutRequest,
        signing: SigningContext,
    ) -> GatewayResult<Dispatched> {
        let body = serde_json::to_string(request)
            .map_err(|err| Error::Configuration(format!("unserializable request: {}", err)))?;

        let signature = signature::sign(&body, &signing)?;

        let mut headers = HeaderMap::new();
        for (name, value) in [
            ("client-id", signing.client_id.as_str()),
            ("request-id", signing.request_id.as_str()),
            ("request-timestamp", signing.request_timestamp.as_str()),
            ("request-target", signing.request_target.as_str()),
            ("signature", signature.as_str()),
        ] {
            headers.insert(HeaderName::from_static(name), header_value(name, value)?);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::info!(
            request_id = %signing.request_id,
            invoice_number = %request.order.invoice_number,
            "Sending checkout request to payment gateway"
        );

        let res = self
            .http
            .post(format!("{}{}", self.base_url, signing.request_target))
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(
                    request_id = %signing.request_id,
                    "Failed to send checkout request: {}",
                    err
                );
                Error::Transport(err.to_string())
            })?;

        let status = res.status();
        let data = res.text().await.map_err(|err| {
            tracing::error!(
                request_id = %signing.request_id,
                "Failed to read checkout response: {}",
                err
            );
            Error::Transport(err.to_string())
        })?;

        if !status.is_success() {
            tracing::error!(
                request_id = %signing.request_id,
                status = status.as_u16(),
                "Payment gateway rejected checkout request: {}",
                data
            );
            return Err(Error::Upstream {
                status: status.as_u16(),
                body: data,
            });
        }

        tracing::debug!("Response received from payment gateway: {}", data);

        let response = serde_json::from_str::<CheckoutResponse>(&data).map_err(|err| {
            tracing::error!(
                request_id = %signing.request_id,
                "Failed to decode checkout response: {}",
                err
            );
            Error::Decode(err.to_string())
        })?;

        Ok(Dispatched {
            request_id: signing.request_id,
            response,
        })
    }
}
