//! The seam between the client and the network.

use thiserror::Error;

/// A fully prepared submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiRequest {
    /// First value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body as received, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Option<String>,
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(String),
    /// The transport could not be set up.
    #[error("transport setup failed: {0}")]
    Setup(String),
}

/// Delivers one request and returns the raw response.
///
/// Called at most once per submission. Retrying is up to the implementation.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking HTTPS transport backed by `reqwest`. Does not retry.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(timeout: std::time::Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let resp = builder
            .body(request.body.clone())
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(RawResponse {
            status,
            body: (!body.is_empty()).then_some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let request = ApiRequest {
            url: "https://example.test".into(),
            headers: vec![("Client-Id".into(), "abc".into())],
            body: String::new(),
        };
        assert_eq!(request.header("client-id"), Some("abc"));
        assert_eq!(request.header("Secret-Key"), None);
    }
}
