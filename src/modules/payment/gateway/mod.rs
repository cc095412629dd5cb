mod client;
pub mod error;
pub mod signature;
pub mod types;

pub use client::{Client, ClientConfig, CHECKOUT_TARGET};
pub use error::Error;

#[cfg(test)]
pub mod testing;
