//! Request signing for the checkout gateway.
//!
//! Every request (outbound checkout calls and inbound notifications) is bound to
//! a signature string of the form
//!
//! ```text
//! Client-Id:{client_id}
//! Request-Id:{request_id}
//! Request-Timestamp:{request_timestamp}
//! Request-Target:{request_target}
//! Digest:{base64(sha256(body))}
//! ```
//!
//! which is then signed with HMAC-SHA256 using the merchant secret key. Labels,
//! order and separators must match the gateway byte for byte.

use super::error::{Error, GatewayResult};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

pub const SIGNATURE_PREFIX: &str = "HMACSHA256=";

#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(client_id: String, secret_key: String) -> GatewayResult<Self> {
        if client_id.trim().is_empty() {
            return Err(Error::Configuration("client id is empty".to_string()));
        }
        if secret_key.trim().is_empty() {
            return Err(Error::Configuration("secret key is empty".to_string()));
        }

        Ok(Self {
            client_id,
            secret_key,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Everything the signature binds to apart from the body. Built fresh for
/// every outbound attempt and never persisted.
#[derive(Clone)]
pub struct SigningContext {
    pub client_id: String,
    pub secret_key: String,
    pub request_id: String,
    pub request_timestamp: String,
    pub request_target: String,
}

impl SigningContext {
    /// New context with a random v4 request id and the current UTC second.
    pub fn fresh(credentials: &Credentials, request_target: &str) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            secret_key: credentials.secret_key.clone(),
            request_id: Uuid::new_v4().to_string(),
            request_timestamp: format_timestamp(Utc::now()),
            request_target: request_target.to_string(),
        }
    }

    /// Context rebuilt from the headers of a request the gateway sent us.
    pub fn received(
        credentials: &Credentials,
        request_id: String,
        request_timestamp: String,
        request_target: &str,
    ) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            secret_key: credentials.secret_key.clone(),
            request_id,
            request_timestamp,
            request_target: request_target.to_string(),
        }
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("client_id", &self.client_id)
            .field("secret_key", &"<redacted>")
            .field("request_id", &self.request_id)
            .field("request_timestamp", &self.request_timestamp)
            .field("request_target", &self.request_target)
            .finish()
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn digest(body: &str) -> String {
    BASE64_STANDARD.encode(Sha256::digest(body.as_bytes()))
}

pub fn signature_string(ctx: &SigningContext, digest: &str) -> String {
    format!(
        "Client-Id:{}\nRequest-Id:{}\nRequest-Timestamp:{}\nRequest-Target:{}\nDigest:{}",
        ctx.client_id, ctx.request_id, ctx.request_timestamp, ctx.request_target, digest
    )
}

fn mac_for(body: &str, ctx: &SigningContext) -> GatewayResult<Hmac<Sha256>> {
    if ctx.client_id.is_empty() || ctx.secret_key.is_empty() {
        return Err(Error::Configuration(
            "refusing to sign without client id and secret key".to_string(),
        ));
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(ctx.secret_key.as_bytes()).map_err(|err| {
        tracing::error!("Failed to initialize signature mac: {:?}", err);
        Error::Configuration("invalid secret key".to_string())
    })?;
    mac.update(signature_string(ctx, &digest(body)).as_bytes());

    Ok(mac)
}

/// Value for the `Signature` header: `HMACSHA256={base64 signature}`.
pub fn sign(body: &str, ctx: &SigningContext) -> GatewayResult<String> {
    let signature = mac_for(body, ctx)?.finalize().into_bytes();

    Ok(format!("{}{}", SIGNATURE_PREFIX, BASE64_STANDARD.encode(signature)))
}

/// Checks a received `Signature` header against the body and context in
/// constant time.
pub fn verify(body: &str, ctx: &SigningContext, header: &str) -> GatewayResult<()> {
    let encoded = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(Error::InvalidSignature)?;
    let signature = BASE64_STANDARD
        .decode(encoded)
        .map_err(|_| Error::InvalidSignature)?;

    mac_for(body, ctx)?
        .verify_slice(&signature)
        .map_err(|_| Error::InvalidSignature)
}
