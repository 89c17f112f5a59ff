//! Submission of rendered invoices to the JoFotara API.
//!
//! [`JoFotaraClient`] renders a document, base64-encodes it and hands one
//! request to a [`Transport`]. The `http` feature provides
//! [`HttpTransport`]; tests and custom stacks supply their own.
//!
//! # Example
//!
//! ```ignore
//! use jofotara::api::*;
//!
//! let client = JoFotaraClient::http("client-id", "secret", ApiConfig::default())?;
//! let response = client.send(&invoice)?;
//! if !response.is_success() {
//!     for error in response.errors() {
//!         eprintln!("{}", error.message);
//!     }
//! }
//! ```

mod client;
mod response;
mod transport;

pub use client::{
    ApiConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, JoFotaraClient, JoFotaraError, encode_invoice,
};
pub use response::{AUTH_FAILED_MESSAGE, ApiError, InvoiceResponse};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{ApiRequest, RawResponse, Transport, TransportError};
