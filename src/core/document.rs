//! The invoice document: owns the sections, reconciles them and renders
//! the final UBL XML.

use tracing::{debug, warn};

use super::basic::BasicInvoiceInformation;
use super::config::{SellerDefaults, SellerIdentity, ValidationConfig};
use super::error::{SectionResult, ValidationError};
use super::items::InvoiceItems;
use super::parties::{BuyerInformation, SellerInformation, SupplierParty};
use super::section::InvoiceSection;
use super::totals::{InvoiceTotals, TotalsValues};
use super::xml::ubl_ns;

/// XML declaration opening every rendered document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// UBL version carried by every document.
pub const UBL_VERSION: &str = "2.1";

/// A JoFotara invoice under construction.
///
/// Basic information always exists. The other sections are created on first
/// access and then live as long as the document; only created sections are
/// rendered.
///
/// ```
/// use jofotara::core::*;
///
/// let mut invoice = InvoiceDocument::new();
/// invoice
///     .basic_information()
///     .set_invoice_id("INV-001")?
///     .set_uuid("123e4567-e89b-12d3-a456-426614174000")?
///     .set_issue_date_str("16-02-2025")?
///     .set_invoice_type(InvoiceType::Income)
///     .cash();
/// invoice.seller_information().set_tin("12345678")?.set_name("Test Seller")?;
/// invoice.supplier_income_source("123456789");
/// invoice
///     .items()
///     .add_item("1")?
///     .set_quantity(1.0)?
///     .set_unit_price(100.0)?
///     .set_description("Test Item")
///     .tax(16.0)?;
/// invoice.invoice_totals()?;
///
/// let xml = invoice.generate_xml()?;
/// assert!(xml.contains(r#"<cbc:PayableAmount currencyID="JO">116.000000000</cbc:PayableAmount>"#));
/// # Ok::<(), ValidationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InvoiceDocument {
    config: ValidationConfig,
    seller_defaults: Option<SellerIdentity>,
    basic: BasicInvoiceInformation,
    seller: Option<SellerInformation>,
    buyer: Option<BuyerInformation>,
    supplier: Option<SupplierParty>,
    items: Option<InvoiceItems>,
    totals: Option<InvoiceTotals>,
}

impl InvoiceDocument {
    /// A document with validation enabled.
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            seller_defaults: None,
            basic: BasicInvoiceInformation::new(config),
            seller: None,
            buyer: None,
            supplier: None,
            items: None,
            totals: None,
        }
    }

    /// Snapshot `defaults`; the seller section starts from it when created.
    pub fn with_seller_defaults(mut self, defaults: &SellerDefaults) -> Self {
        self.seller_defaults = defaults.identity().cloned();
        self
    }

    pub fn config(&self) -> ValidationConfig {
        self.config
    }

    pub fn validations_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Change the validation flag of the document and every section it holds.
    /// Sections created later pick up the new flag too.
    pub fn set_validations_enabled(&mut self, enabled: bool) -> &mut Self {
        let config = ValidationConfig::new(enabled);
        self.config = config;
        for section in self.sections_mut() {
            section.apply_config(config);
        }
        self
    }

    pub fn basic_information(&mut self) -> &mut BasicInvoiceInformation {
        &mut self.basic
    }

    pub fn seller_information(&mut self) -> &mut SellerInformation {
        let (config, defaults) = (self.config, self.seller_defaults.as_ref());
        self.seller
            .get_or_insert_with(|| SellerInformation::from_identity(defaults, config))
    }

    pub fn buyer_information(&mut self) -> &mut BuyerInformation {
        let config = self.config;
        self.buyer.get_or_insert_with(|| BuyerInformation::new(config))
    }

    pub fn supplier_information(&mut self) -> &mut SupplierParty {
        let config = self.config;
        self.supplier
            .get_or_insert_with(|| SupplierParty::new(String::new(), config))
    }

    /// Set the income source sequence, creating the supplier section if needed.
    pub fn supplier_income_source(&mut self, sequence: impl Into<String>) -> &mut SupplierParty {
        self.supplier_information().set_sequence(sequence)
    }

    pub fn items(&mut self) -> &mut InvoiceItems {
        let config = self.config;
        self.items.get_or_insert_with(|| InvoiceItems::new(config))
    }

    /// The totals section.
    ///
    /// On first access the totals are filled from the lines registered so
    /// far, through the regular setters. Later calls return the same section
    /// untouched.
    pub fn invoice_totals(&mut self) -> SectionResult<&mut InvoiceTotals> {
        if self.totals.is_none() {
            let mut totals = InvoiceTotals::new(self.config);
            if let Some(expected) = self.expected_totals()? {
                populate(&mut totals, &expected)?;
            }
            self.totals = Some(totals);
        }
        let config = self.config;
        Ok(self.totals.get_or_insert_with(|| InvoiceTotals::new(config)))
    }

    /// Totals implied by the current lines, or `None` without lines.
    ///
    /// Exclusive is the sum of amounts before discount, inclusive adds the
    /// tax, and payable subtracts the discount from inclusive.
    pub fn expected_totals(&self) -> SectionResult<Option<TotalsValues>> {
        let Some(items) = self.items.as_ref().filter(|i| !i.is_empty()) else {
            return Ok(None);
        };
        let exclusive = items.tax_exclusive_total()?;
        let tax = items.tax_total()?;
        let discount = items.discount_total();
        let inclusive = exclusive + tax;
        Ok(Some(TotalsValues {
            tax_exclusive_amount: Some(exclusive),
            tax_inclusive_amount: Some(inclusive),
            discount_total_amount: discount,
            tax_total_amount: tax,
            payable_amount: Some(inclusive - discount),
        }))
    }

    /// Check that the totals section equals the sums of the lines.
    ///
    /// Skipped when validation is disabled or either side is missing.
    pub fn reconcile(&self) -> SectionResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let Some(totals) = &self.totals else {
            return Ok(());
        };
        let Some(expected) = self.expected_totals()? else {
            return Ok(());
        };
        let provided = totals.values();
        if provided != expected {
            warn!(?provided, ?expected, "invoice totals do not reconcile with line items");
            return Err(ValidationError::new(
                "totals",
                "Invoice totals do not match the sum of line items",
            ));
        }
        Ok(())
    }

    /// Reconcile totals with the lines, then validate every present section.
    pub fn validate_sections(&self) -> SectionResult<()> {
        self.reconcile()?;
        self.sections().try_for_each(|s| s.validate_section())
    }

    /// Render the complete invoice.
    pub fn generate_xml(&self) -> SectionResult<String> {
        self.validate_sections()?;

        let mut parts = vec![
            XML_DECLARATION.to_string(),
            format!(
                r#"<Invoice xmlns="{}" xmlns:cac="{}" xmlns:cbc="{}">"#,
                ubl_ns::INVOICE,
                ubl_ns::CAC,
                ubl_ns::CBC
            ),
            format!("<cbc:UBLVersionID>{UBL_VERSION}</cbc:UBLVersionID>"),
            self.basic.to_xml()?,
        ];
        let optional = [
            self.seller.as_ref().map(InvoiceSection::to_xml),
            self.buyer.as_ref().map(InvoiceSection::to_xml),
            self.supplier.as_ref().map(InvoiceSection::to_xml),
            Some(self.basic.payment_means_xml()),
            self.totals.as_ref().map(InvoiceSection::to_xml),
            self.items.as_ref().map(InvoiceSection::to_xml),
        ];
        for fragment in optional.into_iter().flatten() {
            let fragment = fragment?;
            if !fragment.is_empty() {
                parts.push(fragment);
            }
        }
        parts.push("</Invoice>".to_string());

        debug!(
            sections = self.sections().count(),
            items = self.items.as_ref().map_or(0, InvoiceItems::len),
            credit = self.basic.is_credit_invoice(),
            "rendered invoice"
        );
        Ok(parts.join("\n"))
    }

    fn sections(&self) -> impl Iterator<Item = &dyn InvoiceSection> {
        let optional: [Option<&dyn InvoiceSection>; 5] = [
            self.seller.as_ref().map(|s| s as &dyn InvoiceSection),
            self.buyer.as_ref().map(|s| s as &dyn InvoiceSection),
            self.supplier.as_ref().map(|s| s as &dyn InvoiceSection),
            self.totals.as_ref().map(|s| s as &dyn InvoiceSection),
            self.items.as_ref().map(|s| s as &dyn InvoiceSection),
        ];
        std::iter::once(&self.basic as &dyn InvoiceSection).chain(optional.into_iter().flatten())
    }

    fn sections_mut(&mut self) -> impl Iterator<Item = &mut dyn InvoiceSection> {
        let optional: [Option<&mut dyn InvoiceSection>; 5] = [
            self.seller.as_mut().map(|s| s as &mut dyn InvoiceSection),
            self.buyer.as_mut().map(|s| s as &mut dyn InvoiceSection),
            self.supplier.as_mut().map(|s| s as &mut dyn InvoiceSection),
            self.totals.as_mut().map(|s| s as &mut dyn InvoiceSection),
            self.items.as_mut().map(|s| s as &mut dyn InvoiceSection),
        ];
        std::iter::once(&mut self.basic as &mut dyn InvoiceSection)
            .chain(optional.into_iter().flatten())
    }
}

/// Fill `totals` in setter order: exclusive, inclusive, discount, tax, payable.
fn populate(totals: &mut InvoiceTotals, values: &TotalsValues) -> SectionResult<()> {
    if let Some(exclusive) = values.tax_exclusive_amount {
        totals.set_tax_exclusive_amount(exclusive)?;
    }
    if let Some(inclusive) = values.tax_inclusive_amount {
        totals.set_tax_inclusive_amount(inclusive)?;
    }
    totals.set_discount_total_amount(values.discount_total_amount)?;
    totals.set_tax_total_amount(values.tax_total_amount)?;
    if let Some(payable) = values.payable_amount {
        totals.set_payable_amount(payable)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_created_once() {
        let mut doc = InvoiceDocument::new();
        doc.buyer_information().set_name("Buyer");
        doc.buyer_information();
        assert_eq!(doc.buyer.as_ref().unwrap().values().name.as_deref(), Some("Buyer"));
    }

    #[test]
    fn totals_without_items_start_empty() {
        let mut doc = InvoiceDocument::new();
        assert_eq!(doc.invoice_totals().unwrap().values(), TotalsValues::default());
    }

    #[test]
    fn flag_change_reaches_existing_and_future_sections() {
        let mut doc = InvoiceDocument::new();
        doc.items().add_item("1").unwrap();
        doc.set_validations_enabled(false);
        assert!(!doc.items().validations_enabled());
        assert!(!doc.items().get("1").unwrap().validations_enabled());
        assert!(!doc.buyer_information().validations_enabled());
        assert!(!doc.basic_information().validations_enabled());
    }

    #[test]
    fn empty_document_renders_skeleton_when_disabled() {
        let doc = InvoiceDocument::with_config(ValidationConfig::DISABLED);
        let xml = doc.generate_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Invoice "));
        assert!(xml.contains("\n<cbc:UBLVersionID>2.1</cbc:UBLVersionID>\n<cbc:ProfileID>"));
        assert!(xml.ends_with("</cac:AdditionalDocumentReference>\n</Invoice>"));
    }
}
