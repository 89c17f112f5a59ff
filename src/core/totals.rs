//! Document-level monetary totals.

use serde::Serialize;

use super::config::ValidationConfig;
use super::error::{SectionResult, ValidationError};
use super::section::InvoiceSection;
use super::types::is_non_negative;
use super::xml::FragmentWriter;

/// Slack allowed in ordering comparisons between totals.
const TOLERANCE: f64 = 1e-6;

/// Stored totals.
///
/// Discount and tax default to zero. The other three stay `None` until set
/// and are required for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TotalsValues {
    pub tax_exclusive_amount: Option<f64>,
    pub tax_inclusive_amount: Option<f64>,
    pub discount_total_amount: f64,
    pub tax_total_amount: f64,
    pub payable_amount: Option<f64>,
}

/// The five monetary aggregates of an invoice.
///
/// Each setter checks its value against the siblings set *so far*. The
/// result depends on call order: setting the payable amount before the tax
/// inclusive amount skips the payable bound, for example. Full consistency
/// with the lines is checked when the document renders.
#[derive(Debug, Clone, Default)]
pub struct InvoiceTotals {
    values: TotalsValues,
    config: ValidationConfig,
}

impl InvoiceTotals {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            values: TotalsValues::default(),
            config,
        }
    }

    pub fn set_tax_exclusive_amount(&mut self, amount: f64) -> SectionResult<&mut Self> {
        if self.config.enabled {
            check_non_negative(amount, "tax_exclusive_amount", "Tax exclusive amount")?;
        }
        self.values.tax_exclusive_amount = Some(amount);
        Ok(self)
    }

    pub fn set_tax_inclusive_amount(&mut self, amount: f64) -> SectionResult<&mut Self> {
        if self.config.enabled {
            check_non_negative(amount, "tax_inclusive_amount", "Tax inclusive amount")?;
            if let Some(exclusive) = self.values.tax_exclusive_amount {
                check_inclusive(amount, exclusive, self.values.discount_total_amount)?;
            }
        }
        self.values.tax_inclusive_amount = Some(amount);
        Ok(self)
    }

    pub fn set_discount_total_amount(&mut self, amount: f64) -> SectionResult<&mut Self> {
        if self.config.enabled {
            check_non_negative(amount, "discount_total_amount", "Discount total amount")?;
            if let Some(exclusive) = self.values.tax_exclusive_amount {
                check_discount(amount, exclusive)?;
            }
        }
        self.values.discount_total_amount = amount;
        Ok(self)
    }

    /// Set the tax total.
    ///
    /// Once both the exclusive and inclusive amounts are known, the
    /// discounted exclusive amount plus tax may not exceed the inclusive amount.
    pub fn set_tax_total_amount(&mut self, amount: f64) -> SectionResult<&mut Self> {
        if self.config.enabled {
            check_non_negative(amount, "tax_total_amount", "Tax total amount")?;
            if let (Some(exclusive), Some(inclusive)) =
                (self.values.tax_exclusive_amount, self.values.tax_inclusive_amount)
            {
                let net = exclusive - self.values.discount_total_amount;
                if net + amount > inclusive + TOLERANCE {
                    return Err(ValidationError::new(
                        "totals.tax_total_amount",
                        "Tax total amount would make tax inclusive amount invalid",
                    ));
                }
            }
        }
        self.values.tax_total_amount = amount;
        Ok(self)
    }

    pub fn set_payable_amount(&mut self, amount: f64) -> SectionResult<&mut Self> {
        if self.config.enabled {
            check_non_negative(amount, "payable_amount", "Payable amount")?;
            if let Some(inclusive) = self.values.tax_inclusive_amount {
                check_payable(amount, inclusive, self.values.discount_total_amount)?;
            }
        }
        self.values.payable_amount = Some(amount);
        Ok(self)
    }

    pub fn tax_exclusive_amount(&self) -> Option<f64> {
        self.values.tax_exclusive_amount
    }

    pub fn tax_inclusive_amount(&self) -> Option<f64> {
        self.values.tax_inclusive_amount
    }

    pub fn discount_total_amount(&self) -> f64 {
        self.values.discount_total_amount
    }

    pub fn tax_total_amount(&self) -> f64 {
        self.values.tax_total_amount
    }

    pub fn payable_amount(&self) -> Option<f64> {
        self.values.payable_amount
    }

    pub fn values(&self) -> TotalsValues {
        self.values
    }

    /// Overwrite every stored value without running any check.
    ///
    /// For building deliberately inconsistent invoices, e.g. to exercise
    /// reconciliation. Regular callers should use the setters.
    pub fn replace_values_unchecked(&mut self, values: TotalsValues) -> &mut Self {
        self.values = values;
        self
    }

    fn required(&self) -> SectionResult<(f64, f64, f64)> {
        let exclusive = self.values.tax_exclusive_amount.ok_or_else(|| {
            ValidationError::required("totals.tax_exclusive_amount", "Tax exclusive amount")
        })?;
        let inclusive = self.values.tax_inclusive_amount.ok_or_else(|| {
            ValidationError::required("totals.tax_inclusive_amount", "Tax inclusive amount")
        })?;
        let payable = self
            .values
            .payable_amount
            .ok_or_else(|| ValidationError::required("totals.payable_amount", "Payable amount"))?;
        Ok((exclusive, inclusive, payable))
    }
}

fn check_non_negative(amount: f64, field: &str, label: &str) -> SectionResult<()> {
    if !is_non_negative(amount) {
        return Err(ValidationError::negative(format!("totals.{field}"), label));
    }
    Ok(())
}

fn check_inclusive(inclusive: f64, exclusive: f64, discount: f64) -> SectionResult<()> {
    if inclusive + TOLERANCE < exclusive - discount {
        return Err(ValidationError::new(
            "totals.tax_inclusive_amount",
            "Tax inclusive amount cannot be less than tax exclusive amount",
        ));
    }
    Ok(())
}

fn check_discount(discount: f64, exclusive: f64) -> SectionResult<()> {
    if discount > exclusive + TOLERANCE {
        return Err(ValidationError::new(
            "totals.discount_total_amount",
            "Discount total amount cannot be greater than tax exclusive amount",
        ));
    }
    Ok(())
}

fn check_payable(payable: f64, inclusive: f64, discount: f64) -> SectionResult<()> {
    if payable + TOLERANCE < inclusive - discount {
        return Err(ValidationError::new(
            "totals.payable_amount",
            "Payable amount cannot be less than tax inclusive amount minus discounts",
        ));
    }
    Ok(())
}

impl InvoiceSection for InvoiceTotals {
    fn validate_section(&self) -> SectionResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let (exclusive, inclusive, payable) = self.required()?;
        let discount = self.values.discount_total_amount;
        check_non_negative(exclusive, "tax_exclusive_amount", "Tax exclusive amount")?;
        check_non_negative(inclusive, "tax_inclusive_amount", "Tax inclusive amount")?;
        check_non_negative(discount, "discount_total_amount", "Discount total amount")?;
        check_non_negative(self.values.tax_total_amount, "tax_total_amount", "Tax total amount")?;
        check_non_negative(payable, "payable_amount", "Payable amount")?;
        check_inclusive(inclusive, exclusive, discount)?;
        check_discount(discount, exclusive)?;
        check_payable(payable, inclusive, discount)
    }

    fn to_xml(&self) -> SectionResult<String> {
        let (exclusive, inclusive, payable) = self.required()?;
        let discount = self.values.discount_total_amount;

        let mut w = FragmentWriter::new();
        if discount > 0.0 {
            w.start_element("cac:AllowanceCharge")?;
            w.text_element("cbc:ChargeIndicator", "false")?;
            w.text_element("cbc:AllowanceChargeReason", "discount")?;
            w.amount_element("cbc:Amount", discount)?;
            w.end_element("cac:AllowanceCharge")?;
        }

        w.start_element("cac:TaxTotal")?;
        w.amount_element("cbc:TaxAmount", self.values.tax_total_amount)?;
        w.end_element("cac:TaxTotal")?;

        w.start_element("cac:LegalMonetaryTotal")?;
        w.amount_element("cbc:TaxExclusiveAmount", exclusive)?;
        w.amount_element("cbc:TaxInclusiveAmount", inclusive)?;
        if discount > 0.0 {
            w.amount_element("cbc:AllowanceTotalAmount", discount)?;
        }
        w.amount_element("cbc:PayableAmount", payable)?;
        w.end_element("cac:LegalMonetaryTotal")?;
        w.into_fragment()
    }

    fn apply_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    fn config(&self) -> ValidationConfig {
        self.config
    }
}
