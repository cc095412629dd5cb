use thiserror::Error;

pub type GatewayResult<T> = Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Payment gateway is not configured: {0}")]
    Configuration(String),

    #[error("Payment gateway request failed: {0}")]
    Transport(String),

    #[error("Payment gateway responded with status {status}")]
    Upstream { status: u16, body: String },

    #[error("Failed to decode payment gateway response: {0}")]
    Decode(String),

    #[error("Invalid payment gateway signature")]
    InvalidSignature,
}

impl Error {
    /// Status reported by the gateway, if the request got that far.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
