//! Invoice-level metadata: identifiers, date, type and return details.

use chrono::NaiveDate;
use serde::Serialize;

use super::config::ValidationConfig;
use super::error::{SectionResult, ValidationError};
use super::section::InvoiceSection;
use super::types::{InvoiceType, PaymentMethod, is_non_negative};
use super::xml::{FragmentWriter, format_amount};

/// Profile identifier of the reporting scheme.
pub const PROFILE_ID: &str = "reporting:1.0";

/// Document and tax currency.
pub const CURRENCY_CODE: &str = "JOD";

/// UBL invoice type code of a regular invoice.
pub const INVOICE_TYPE_CODE: &str = "388";

/// UBL invoice type code of a credit (return) invoice.
pub const CREDIT_INVOICE_TYPE_CODE: &str = "381";

/// Input format accepted by [`BasicInvoiceInformation::set_issue_date_str`].
pub const ISSUE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Reference to the invoice a credit invoice returns goods against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditReference {
    pub original_invoice_id: String,
    pub original_uuid: String,
    pub original_full_amount: f64,
}

/// Identifiers, issue date, invoice type and payment method.
///
/// Always present on a document. A credit invoice additionally carries a
/// [`CreditReference`] and a reason for return.
#[derive(Debug, Clone)]
pub struct BasicInvoiceInformation {
    invoice_id: Option<String>,
    uuid: Option<String>,
    issue_date: Option<NaiveDate>,
    invoice_type: Option<InvoiceType>,
    payment_method: Option<PaymentMethod>,
    note: Option<String>,
    invoice_counter: u32,
    credit: Option<CreditReference>,
    reason_for_return: Option<String>,
    config: ValidationConfig,
}

impl BasicInvoiceInformation {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            invoice_id: None,
            uuid: None,
            issue_date: None,
            invoice_type: None,
            payment_method: None,
            note: None,
            invoice_counter: 1,
            credit: None,
            reason_for_return: None,
            config,
        }
    }

    pub fn set_invoice_id(&mut self, id: impl Into<String>) -> SectionResult<&mut Self> {
        let id = id.into();
        if self.config.enabled && id.trim().is_empty() {
            return Err(ValidationError::new("basic.invoice_id", "Invoice ID cannot be empty"));
        }
        self.invoice_id = Some(id);
        Ok(self)
    }

    pub fn set_uuid(&mut self, uuid: impl Into<String>) -> SectionResult<&mut Self> {
        let uuid = uuid.into();
        if self.config.enabled {
            check_uuid(&uuid, "basic.uuid")?;
        }
        self.uuid = Some(uuid);
        Ok(self)
    }

    pub fn set_issue_date(&mut self, date: NaiveDate) -> &mut Self {
        self.issue_date = Some(date);
        self
    }

    /// Parse a `dd-mm-yyyy` date, e.g. `16-02-2025`.
    pub fn set_issue_date_str(&mut self, date: &str) -> SectionResult<&mut Self> {
        let date = NaiveDate::parse_from_str(date, ISSUE_DATE_FORMAT).map_err(|_| {
            ValidationError::new("basic.issue_date", "Issue date must be in dd-mm-yyyy format")
        })?;
        Ok(self.set_issue_date(date))
    }

    pub fn set_invoice_type(&mut self, invoice_type: InvoiceType) -> &mut Self {
        self.invoice_type = Some(invoice_type);
        self
    }

    /// Set the invoice type by name (`income`, `general_sales`, `special_sales`).
    pub fn set_invoice_type_name(&mut self, name: &str) -> SectionResult<&mut Self> {
        let invoice_type = name.parse::<InvoiceType>()?;
        Ok(self.set_invoice_type(invoice_type))
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> &mut Self {
        self.payment_method = Some(method);
        self
    }

    pub fn cash(&mut self) -> &mut Self {
        self.set_payment_method(PaymentMethod::Cash)
    }

    pub fn receivable(&mut self) -> &mut Self {
        self.set_payment_method(PaymentMethod::Receivable)
    }

    pub fn set_note(&mut self, note: impl Into<String>) -> &mut Self {
        self.note = Some(note.into());
        self
    }

    /// Sequential invoice counter (ICV) of the income source. Starts at 1.
    pub fn set_invoice_counter(&mut self, counter: u32) -> SectionResult<&mut Self> {
        if self.config.enabled && counter == 0 {
            return Err(ValidationError::new(
                "basic.invoice_counter",
                "Invoice counter must be greater than 0",
            ));
        }
        self.invoice_counter = counter;
        Ok(self)
    }

    /// Turn this into a credit invoice returning against an earlier invoice.
    pub fn as_credit_invoice(
        &mut self,
        original_invoice_id: impl Into<String>,
        original_uuid: impl Into<String>,
        original_full_amount: f64,
    ) -> SectionResult<&mut Self> {
        let original_invoice_id = original_invoice_id.into();
        let original_uuid = original_uuid.into();
        if self.config.enabled {
            if original_invoice_id.trim().is_empty() {
                return Err(ValidationError::required(
                    "basic.credit.original_invoice_id",
                    "Original invoice ID",
                ));
            }
            check_uuid(&original_uuid, "basic.credit.original_uuid")?;
            if !is_non_negative(original_full_amount) {
                return Err(ValidationError::negative(
                    "basic.credit.original_full_amount",
                    "Original invoice amount",
                ));
            }
        }
        self.credit = Some(CreditReference {
            original_invoice_id,
            original_uuid,
            original_full_amount,
        });
        Ok(self)
    }

    pub fn set_reason_for_return(&mut self, reason: impl Into<String>) -> SectionResult<&mut Self> {
        let reason = reason.into();
        if self.config.enabled && reason.trim().is_empty() {
            return Err(ValidationError::new(
                "basic.reason_for_return",
                "Reason for return cannot be empty",
            ));
        }
        self.reason_for_return = Some(reason);
        Ok(self)
    }

    pub fn invoice_id(&self) -> Option<&str> {
        self.invoice_id.as_deref()
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn invoice_type(&self) -> Option<InvoiceType> {
        self.invoice_type
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn invoice_counter(&self) -> u32 {
        self.invoice_counter
    }

    pub fn credit_reference(&self) -> Option<&CreditReference> {
        self.credit.as_ref()
    }

    pub fn is_credit_invoice(&self) -> bool {
        self.credit.is_some()
    }

    pub fn reason_for_return(&self) -> Option<&str> {
        self.reason_for_return.as_deref()
    }

    /// `388`, or `381` for credit invoices.
    pub fn type_code(&self) -> &'static str {
        if self.is_credit_invoice() {
            CREDIT_INVOICE_TYPE_CODE
        } else {
            INVOICE_TYPE_CODE
        }
    }

    /// Payment method code followed by the invoice type digit, e.g. `011`.
    pub fn type_code_name(&self) -> Option<String> {
        let method = self.payment_method?;
        let invoice_type = self.invoice_type?;
        Some(format!("{}{}", method.code(), invoice_type.digit()))
    }

    /// The payment means fragment carrying the reason for return.
    ///
    /// Empty unless this is a credit invoice with a reason.
    pub fn payment_means_xml(&self) -> SectionResult<String> {
        let Some(reason) = self.reason_for_return.as_deref().filter(|_| self.is_credit_invoice())
        else {
            return Ok(String::new());
        };
        let mut w = FragmentWriter::new();
        w.start_element("cac:PaymentMeans")?;
        w.text_element_with_attrs("cbc:PaymentMeansCode", "10", &[("listID", "UN/ECE 4461")])?;
        w.text_element("cbc:InstructionNote", reason)?;
        w.end_element("cac:PaymentMeans")?;
        w.into_fragment()
    }
}

fn check_uuid(uuid: &str, field: &str) -> SectionResult<()> {
    uuid::Uuid::parse_str(uuid)
        .map(|_| ())
        .map_err(|_| ValidationError::new(field, "Invalid UUID format"))
}

impl InvoiceSection for BasicInvoiceInformation {
    fn validate_section(&self) -> SectionResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        if self.invoice_id.is_none() {
            return Err(ValidationError::required("basic.invoice_id", "Invoice ID"));
        }
        if self.uuid.is_none() {
            return Err(ValidationError::required("basic.uuid", "UUID"));
        }
        if self.issue_date.is_none() {
            return Err(ValidationError::required("basic.issue_date", "Issue date"));
        }
        if self.invoice_type.is_none() {
            return Err(ValidationError::required("basic.invoice_type", "Invoice type"));
        }
        if self.payment_method.is_none() {
            return Err(ValidationError::required("basic.payment_method", "Payment method"));
        }
        if self.is_credit_invoice() && self.reason_for_return.is_none() {
            return Err(ValidationError::required(
                "basic.reason_for_return",
                "Reason for return",
            ));
        }
        Ok(())
    }

    fn to_xml(&self) -> SectionResult<String> {
        let mut w = FragmentWriter::new();
        w.text_element("cbc:ProfileID", PROFILE_ID)?;
        if let Some(id) = &self.invoice_id {
            w.text_element("cbc:ID", id)?;
        }
        if let Some(uuid) = &self.uuid {
            w.text_element("cbc:UUID", uuid)?;
        }
        if let Some(date) = self.issue_date {
            w.text_element("cbc:IssueDate", &date.format("%Y-%m-%d").to_string())?;
        }
        match self.type_code_name() {
            Some(name) => {
                w.text_element_with_attrs(
                    "cbc:InvoiceTypeCode",
                    self.type_code(),
                    &[("name", name.as_str())],
                )?
            }
            None => w.text_element("cbc:InvoiceTypeCode", self.type_code())?,
        };
        if let Some(note) = &self.note {
            w.text_element("cbc:Note", note)?;
        }
        w.text_element("cbc:DocumentCurrencyCode", CURRENCY_CODE)?;
        w.text_element("cbc:TaxCurrencyCode", CURRENCY_CODE)?;

        if let Some(credit) = &self.credit {
            w.start_element("cac:BillingReference")?;
            w.start_element("cac:InvoiceDocumentReference")?;
            w.text_element("cbc:ID", &credit.original_invoice_id)?;
            w.text_element("cbc:UUID", &credit.original_uuid)?;
            w.text_element(
                "cbc:DocumentDescription",
                &format_amount(credit.original_full_amount),
            )?;
            w.end_element("cac:InvoiceDocumentReference")?;
            w.end_element("cac:BillingReference")?;
        }

        w.start_element("cac:AdditionalDocumentReference")?;
        w.text_element("cbc:ID", "ICV")?;
        w.text_element("cbc:UUID", &self.invoice_counter.to_string())?;
        w.end_element("cac:AdditionalDocumentReference")?;
        w.into_fragment()
    }

    fn apply_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    fn config(&self) -> ValidationConfig {
        self.config
    }
}

impl Default for BasicInvoiceInformation {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
