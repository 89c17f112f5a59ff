#![cfg(feature = "api")]

use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jofotara::api::{
    ApiConfig, ApiRequest, AUTH_FAILED_MESSAGE, JoFotaraClient, JoFotaraError, RawResponse,
    Transport, TransportError, encode_invoice,
};
use jofotara::core::*;

/// Records every request and answers with a canned result.
struct MockTransport {
    requests: Mutex<Vec<ApiRequest>>,
    answer: Result<RawResponse, TransportError>,
}

impl MockTransport {
    fn answering(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            answer: Ok(RawResponse {
                status,
                body: Some(body.to_string()),
            }),
        }
    }

    fn failing(error: TransportError) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            answer: Err(error),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer.clone()
    }
}

const ACCEPTED: &str = r#"{
    "validationResults": {"status": "PASS", "errorMessages": []},
    "invoiceStatus": "SUBMITTED",
    "invoiceNumber": "INV-001",
    "invoiceUUID": "123e4567-e89b-12d3-a456-426614174000",
    "qrCode": "QR-DATA"
}"#;

fn invoice(config: ValidationConfig) -> InvoiceDocument {
    let mut doc = InvoiceDocument::with_config(config);
    doc.basic_information()
        .set_invoice_id("INV-001")
        .unwrap()
        .set_uuid("123e4567-e89b-12d3-a456-426614174000")
        .unwrap()
        .set_issue_date_str("16-02-2025")
        .unwrap()
        .set_invoice_type(InvoiceType::Income)
        .cash();
    doc.seller_information()
        .set_tin("12345678")
        .unwrap()
        .set_name("Test Seller")
        .unwrap();
    doc.buyer_information()
        .set_id("123456789", IdType::TaxId)
        .set_name("Test Buyer")
        .set_city_code(CityCode::Amman);
    doc.supplier_income_source("123456789");
    doc.items()
        .add_item("1")
        .unwrap()
        .set_quantity(1.0)
        .unwrap()
        .set_unit_price(100.0)
        .unwrap()
        .set_description("Test Item")
        .tax(16.0)
        .unwrap();
    doc.invoice_totals().unwrap();
    doc
}

fn inconsistent(config: ValidationConfig) -> InvoiceDocument {
    let mut doc = invoice(config);
    let totals = doc.invoice_totals().unwrap();
    let mut values = totals.values();
    values.payable_amount = Some(50.0);
    totals.replace_values_unchecked(values);
    doc
}

fn decoded_invoice(request: &ApiRequest) -> String {
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    let encoded = body["invoice"].as_str().unwrap();
    String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
}

// --- Client setup ---

#[test]
fn empty_credentials_rejected() {
    let err = JoFotaraClient::new("", "", MockTransport::answering(200, "{}")).unwrap_err();
    assert!(matches!(err, JoFotaraError::Config(_)));
    assert_eq!(err.to_string(), "JoFotara client ID and secret are required");
}

#[test]
fn custom_endpoint_is_used() {
    let config = ApiConfig {
        endpoint: "https://sandbox.example.test/invoices/".into(),
        ..ApiConfig::default()
    };
    let client = JoFotaraClient::new("id", "secret", MockTransport::answering(200, ACCEPTED))
        .unwrap()
        .with_config(config);
    client.send(&invoice(ValidationConfig::ENABLED)).unwrap();
    assert_eq!(
        client.transport().last_request().url,
        "https://sandbox.example.test/invoices/"
    );
}

// --- Encoding ---

#[test]
fn encoded_invoice_decodes_to_rendered_xml() {
    let doc = invoice(ValidationConfig::ENABLED);
    let encoded = encode_invoice(&doc).unwrap();
    let xml = String::from_utf8(STANDARD.decode(&encoded).unwrap()).unwrap();

    assert_eq!(xml, doc.generate_xml().unwrap());
    for expected in [
        "INV-001",
        "123e4567-e89b-12d3-a456-426614174000",
        "2025-02-16",
        "100.0",
        "16.0",
        "116.0",
        "Test Item",
    ] {
        assert!(xml.contains(expected), "missing {expected}");
    }
}

#[test]
fn inconsistent_totals_encoded_verbatim_when_disabled() {
    let doc = inconsistent(ValidationConfig::DISABLED);
    let xml = String::from_utf8(STANDARD.decode(encode_invoice(&doc).unwrap()).unwrap()).unwrap();
    assert!(xml.contains(r#"<cbc:PayableAmount currencyID="JO">50.000000000</cbc:PayableAmount>"#));
}

// --- Submission ---

#[test]
fn accepted_submission() {
    let client =
        JoFotaraClient::new("client-1", "s3cret", MockTransport::answering(200, ACCEPTED)).unwrap();
    let response = client.send(&invoice(ValidationConfig::ENABLED)).unwrap();

    assert!(response.is_success());
    assert!(!response.has_errors());
    assert_eq!(response.validation_status(), Some("PASS"));
    assert_eq!(response.invoice_status(), Some("SUBMITTED"));
    assert_eq!(response.invoice_number(), Some("INV-001"));
    assert_eq!(
        response.invoice_uuid(),
        Some("123e4567-e89b-12d3-a456-426614174000")
    );
    assert_eq!(response.qr_code(), Some("QR-DATA"));

    let transport = client.transport();
    assert_eq!(transport.calls(), 1);
    let request = transport.last_request();
    assert_eq!(request.header("Client-Id"), Some("client-1"));
    assert_eq!(request.header("Secret-Key"), Some("s3cret"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert!(decoded_invoice(&request).contains("<cbc:ID>INV-001</cbc:ID>"));
}

#[test]
fn forbidden_reports_authentication_failure() {
    let client =
        JoFotaraClient::new("id", "wrong", MockTransport::answering(403, "Forbidden")).unwrap();
    let response = client.send(&invoice(ValidationConfig::ENABLED)).unwrap();
    assert!(!response.is_success());
    assert_eq!(response.status_code(), 403);
    assert_eq!(response.errors()[0].message, AUTH_FAILED_MESSAGE);
}

#[test]
fn rejected_submission_keeps_body() {
    let client =
        JoFotaraClient::new("id", "secret", MockTransport::answering(400, "Invalid invoice"))
            .unwrap();
    let response = client.send(&invoice(ValidationConfig::ENABLED)).unwrap();
    assert_eq!(response.errors()[0].message, "Invalid invoice");
    assert_eq!(response.raw_body(), Some("Invalid invoice"));
}

#[test]
fn invalid_invoice_never_reaches_transport() {
    let client =
        JoFotaraClient::new("id", "secret", MockTransport::answering(200, ACCEPTED)).unwrap();
    let err = client
        .send(&inconsistent(ValidationConfig::ENABLED))
        .unwrap_err();
    assert!(matches!(err, JoFotaraError::Validation(_)));
    assert_eq!(err.to_string(), "Invoice totals do not match the sum of line items");
    assert_eq!(client.transport().calls(), 0);
}

#[test]
fn transport_failure_propagates() {
    let client = JoFotaraClient::new(
        "id",
        "secret",
        MockTransport::failing(TransportError::Network("timed out".into())),
    )
    .unwrap();
    let err = client.send(&invoice(ValidationConfig::ENABLED)).unwrap_err();
    assert!(matches!(err, JoFotaraError::Transport(TransportError::Network(_))));
    assert_eq!(client.transport().calls(), 1);
}

#[test]
fn garbled_success_body_is_an_encoding_error() {
    let client =
        JoFotaraClient::new("id", "secret", MockTransport::answering(200, "<html>")).unwrap();
    let err = client.send(&invoice(ValidationConfig::ENABLED)).unwrap_err();
    assert!(matches!(err, JoFotaraError::Encoding(_)));
}

#[test]
fn borrowed_transport_can_be_shared() {
    let transport = MockTransport::answering(200, ACCEPTED);
    let first = JoFotaraClient::new("a", "secret", &transport).unwrap();
    let second = JoFotaraClient::new("b", "secret", &transport).unwrap();
    first.send(&invoice(ValidationConfig::ENABLED)).unwrap();
    second.send(&invoice(ValidationConfig::ENABLED)).unwrap();
    assert_eq!(transport.calls(), 2);
    assert_eq!(transport.last_request().header("Client-Id"), Some("b"));
}
