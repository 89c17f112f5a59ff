//! Submission client.

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::response::InvoiceResponse;
use super::transport::{ApiRequest, Transport, TransportError};
use crate::core::{InvoiceDocument, ValidationError};

/// Production submission endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://backend.jofotara.gov.jo/core/invoices/";

/// Request timeout used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error from building or submitting an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JoFotaraError {
    /// The invoice failed validation or could not be rendered.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The client is misconfigured.
    #[error("{0}")]
    Config(String),
    /// The request did not reach the API.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The API's answer could not be interpreted.
    #[error("could not interpret API response: {0}")]
    Encoding(String),
}

/// Where and how long to talk to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct SubmissionRequest<'a> {
    invoice: &'a str,
}

/// Base64 (standard alphabet) of the rendered invoice.
pub fn encode_invoice(document: &InvoiceDocument) -> Result<String, ValidationError> {
    let xml = document.generate_xml()?;
    Ok(STANDARD.encode(xml.as_bytes()))
}

/// Submits rendered invoices through a [`Transport`].
pub struct JoFotaraClient<T> {
    client_id: String,
    secret: String,
    config: ApiConfig,
    transport: T,
}

impl<T> fmt::Debug for JoFotaraClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoFotaraClient")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> JoFotaraClient<T> {
    /// # Errors
    ///
    /// Returns [`JoFotaraError::Config`] if either credential is blank.
    pub fn new(
        client_id: impl Into<String>,
        secret: impl Into<String>,
        transport: T,
    ) -> Result<Self, JoFotaraError> {
        let client_id = client_id.into();
        let secret = secret.into();
        if client_id.trim().is_empty() || secret.trim().is_empty() {
            return Err(JoFotaraError::Config(
                "JoFotara client ID and secret are required".into(),
            ));
        }
        Ok(Self {
            client_id,
            secret,
            config: ApiConfig::default(),
            transport,
        })
    }

    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn encode_invoice(&self, document: &InvoiceDocument) -> Result<String, JoFotaraError> {
        Ok(encode_invoice(document)?)
    }

    /// Render and encode `document` into the request [`send`](Self::send) would issue.
    pub fn build_request(&self, document: &InvoiceDocument) -> Result<ApiRequest, JoFotaraError> {
        let encoded = self.encode_invoice(document)?;
        let body = serde_json::to_string(&SubmissionRequest { invoice: &encoded })
            .map_err(|e| JoFotaraError::Encoding(e.to_string()))?;
        Ok(ApiRequest {
            url: self.config.endpoint.clone(),
            headers: vec![
                ("Client-Id".into(), self.client_id.clone()),
                ("Secret-Key".into(), self.secret.clone()),
                ("Content-Type".into(), "application/json".into()),
            ],
            body,
        })
    }

    /// Render, encode and submit `document`. The transport is called once.
    ///
    /// A rejected invoice is still `Ok`; inspect
    /// [`InvoiceResponse::is_success`] and [`InvoiceResponse::errors`].
    pub fn send(&self, document: &InvoiceDocument) -> Result<InvoiceResponse, JoFotaraError> {
        let request = self.build_request(document)?;
        let raw = self.transport.execute(&request).inspect_err(|e| {
            warn!(endpoint = %self.config.endpoint, error = %e, "invoice submission failed");
        })?;

        let status = raw.status;
        let response =
            InvoiceResponse::from_raw(raw).map_err(|e| JoFotaraError::Encoding(e.to_string()))?;
        if response.is_success() {
            info!(status, client_id = %self.client_id, "invoice submitted");
        } else {
            warn!(status, errors = response.errors().len(), "invoice rejected");
        }
        Ok(response)
    }
}

#[cfg(feature = "http")]
impl JoFotaraClient<super::transport::HttpTransport> {
    /// A client talking HTTPS with the timeout from `config`.
    pub fn http(
        client_id: impl Into<String>,
        secret: impl Into<String>,
        config: ApiConfig,
    ) -> Result<Self, JoFotaraError> {
        let transport = super::transport::HttpTransport::new(config.timeout)?;
        Ok(Self::new(client_id, secret, transport)?.with_config(config))
    }
}
