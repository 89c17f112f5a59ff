//! Interpretation of the submission API's answer.

use serde::{Deserialize, Serialize};

use super::transport::RawResponse;

/// Message shown for HTTP 403.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please check your client ID and secret.";

/// One error reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    /// Error code, when the API supplied one.
    pub code: Option<String>,
}

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }
}

/// Success payload of an accepted invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionBody {
    validation_results: Option<ValidationResults>,
    invoice_status: Option<String>,
    invoice_number: Option<String>,
    #[serde(rename = "invoiceUUID")]
    invoice_uuid: Option<String>,
    qr_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationResults {
    status: Option<String>,
    #[serde(default)]
    error_messages: Vec<RawMessage>,
}

/// Error entries come either as bare strings or as objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum RawMessage {
    Text(String),
    Detail {
        #[serde(alias = "EINV_MESSAGE")]
        message: String,
        #[serde(default, alias = "EINV_CODE")]
        code: Option<String>,
    },
}

impl From<RawMessage> for ApiError {
    fn from(raw: RawMessage) -> Self {
        match raw {
            RawMessage::Text(message) => ApiError::new(message),
            RawMessage::Detail { message, code } => ApiError { message, code },
        }
    }
}

/// The API's answer to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceResponse {
    status_code: u16,
    raw_body: Option<String>,
    errors: Vec<ApiError>,
    validation_status: Option<String>,
    invoice_status: Option<String>,
    invoice_number: Option<String>,
    invoice_uuid: Option<String>,
    qr_code: Option<String>,
}

impl InvoiceResponse {
    /// Interpret a raw response.
    ///
    /// 403 yields a fixed authentication message and any other non-2xx
    /// status carries the body verbatim. A 2xx body must be JSON (or empty).
    ///
    /// # Errors
    ///
    /// Returns the JSON error when a 2xx body cannot be parsed.
    pub fn from_raw(raw: RawResponse) -> Result<Self, serde_json::Error> {
        let mut response = Self {
            status_code: raw.status,
            raw_body: raw.body,
            errors: Vec::new(),
            validation_status: None,
            invoice_status: None,
            invoice_number: None,
            invoice_uuid: None,
            qr_code: None,
        };

        if raw.status == 403 {
            response.errors.push(ApiError::new(AUTH_FAILED_MESSAGE));
            return Ok(response);
        }
        if !(200..300).contains(&raw.status) {
            let message = response
                .raw_body
                .clone()
                .unwrap_or_else(|| format!("HTTP {}", raw.status));
            response.errors.push(ApiError::new(message));
            return Ok(response);
        }

        let body = match response.raw_body.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => serde_json::from_str::<SubmissionBody>(text)?,
            _ => SubmissionBody::default(),
        };
        if let Some(results) = body.validation_results {
            response.validation_status = results.status;
            response
                .errors
                .extend(results.error_messages.into_iter().map(ApiError::from));
        }
        response.invoice_status = body.invoice_status;
        response.invoice_number = body.invoice_number;
        response.invoice_uuid = body.invoice_uuid;
        response.qr_code = body.qr_code;
        Ok(response)
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn errors(&self) -> &[ApiError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    /// `PASS` or `NOT_PASS` from the validation results.
    pub fn validation_status(&self) -> Option<&str> {
        self.validation_status.as_deref()
    }

    pub fn invoice_status(&self) -> Option<&str> {
        self.invoice_status.as_deref()
    }

    pub fn invoice_number(&self) -> Option<&str> {
        self.invoice_number.as_deref()
    }

    pub fn invoice_uuid(&self) -> Option<&str> {
        self.invoice_uuid.as_deref()
    }

    pub fn qr_code(&self) -> Option<&str> {
        self.qr_code.as_deref()
    }
}
