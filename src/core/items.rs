//! Invoice lines and the ordered collection that owns them.

use serde::Serialize;

use super::config::ValidationConfig;
use super::error::{SectionResult, ValidationError};
use super::section::InvoiceSection;
use super::types::{TaxCategory, is_non_negative, is_positive};
use super::xml::FragmentWriter;

/// Sales tax rate applied to new lines until changed.
pub const DEFAULT_TAX_PERCENT: f64 = 16.0;

/// Unit code applied to new lines until changed (piece).
pub const DEFAULT_UNIT_CODE: &str = "PCE";

/// A single invoice line.
///
/// Created through [`InvoiceItems::add_item`]. Monetary amounts are plain
/// `f64` and are never rounded before rendering.
#[derive(Debug, Clone)]
pub struct LineItem {
    id: String,
    quantity: Option<f64>,
    unit_price: Option<f64>,
    discount: f64,
    description: Option<String>,
    tax_category: TaxCategory,
    tax_percent: f64,
    unit_code: String,
    config: ValidationConfig,
}

/// Snapshot of a line's stored fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemValues {
    pub id: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub discount: f64,
    pub description: Option<String>,
    pub tax_category: TaxCategory,
    pub tax_percent: f64,
    pub unit_code: String,
}

impl LineItem {
    pub fn new(id: impl Into<String>, config: ValidationConfig) -> Self {
        Self {
            id: id.into(),
            quantity: None,
            unit_price: None,
            discount: 0.0,
            description: None,
            tax_category: TaxCategory::Standard,
            tax_percent: DEFAULT_TAX_PERCENT,
            unit_code: DEFAULT_UNIT_CODE.to_string(),
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_quantity(&mut self, quantity: f64) -> SectionResult<&mut Self> {
        if self.config.enabled && !is_positive(quantity) {
            return Err(self.error("quantity", "Quantity must be greater than 0"));
        }
        self.quantity = Some(quantity);
        Ok(self)
    }

    pub fn set_unit_price(&mut self, price: f64) -> SectionResult<&mut Self> {
        if self.config.enabled && !is_non_negative(price) {
            return Err(self.error("unit_price", "Unit price cannot be negative"));
        }
        self.unit_price = Some(price);
        Ok(self)
    }

    /// Set the discount amount for the whole line.
    ///
    /// With validation enabled the quantity and unit price must already be
    /// set, because the discount may not exceed their product.
    pub fn set_discount(&mut self, discount: f64) -> SectionResult<&mut Self> {
        if self.config.enabled {
            if !is_non_negative(discount) {
                return Err(self.error("discount", "Discount amount cannot be negative"));
            }
            if discount > self.amount_before_discount()? {
                return Err(self.error("discount", "Discount cannot be greater than total amount"));
            }
        }
        self.discount = discount;
        Ok(self)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_unit_code(&mut self, unit_code: impl Into<String>) -> &mut Self {
        self.unit_code = unit_code.into();
        self
    }

    /// Set the tax category.
    ///
    /// Standard rate requires a positive percentage. The other categories
    /// always carry 0 % and ignore `percent`. These rules hold whether or
    /// not validation is enabled.
    pub fn set_tax_category(
        &mut self,
        category: TaxCategory,
        percent: Option<f64>,
    ) -> SectionResult<&mut Self> {
        let percent = match category {
            TaxCategory::Standard => match percent {
                None => {
                    return Err(self.error(
                        "tax_percent",
                        "Tax percentage is required for standard rate category",
                    ));
                }
                Some(p) if !is_positive(p) => {
                    return Err(self.error("tax_percent", "Invalid tax rate for standard category"));
                }
                Some(p) => p,
            },
            TaxCategory::ZeroRated | TaxCategory::Exempt => 0.0,
        };
        self.tax_category = category;
        self.tax_percent = percent;
        Ok(self)
    }

    /// Set the tax category from its code letter (`S`, `O` or `Z`).
    pub fn set_tax_category_code(
        &mut self,
        code: &str,
        percent: Option<f64>,
    ) -> SectionResult<&mut Self> {
        let category = code.parse::<TaxCategory>()?;
        self.set_tax_category(category, percent)
    }

    /// Standard rate at `percent`.
    pub fn tax(&mut self, percent: f64) -> SectionResult<&mut Self> {
        self.set_tax_category(TaxCategory::Standard, Some(percent))
    }

    /// Zero rated at 0 %.
    pub fn zero_tax(&mut self) -> &mut Self {
        self.tax_category = TaxCategory::ZeroRated;
        self.tax_percent = 0.0;
        self
    }

    /// Exempt at 0 %.
    pub fn tax_exempted(&mut self) -> &mut Self {
        self.tax_category = TaxCategory::Exempt;
        self.tax_percent = 0.0;
        self
    }

    pub fn quantity(&self) -> Option<f64> {
        self.quantity
    }

    pub fn unit_price(&self) -> Option<f64> {
        self.unit_price
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tax_category(&self) -> TaxCategory {
        self.tax_category
    }

    pub fn tax_percent(&self) -> f64 {
        self.tax_percent
    }

    pub fn unit_code(&self) -> &str {
        &self.unit_code
    }

    /// `quantity × unit price`.
    pub fn amount_before_discount(&self) -> SectionResult<f64> {
        let quantity = self
            .quantity
            .ok_or_else(|| ValidationError::required(self.field("quantity"), "Quantity"))?;
        let unit_price = self
            .unit_price
            .ok_or_else(|| ValidationError::required(self.field("unit_price"), "Unit price"))?;
        Ok(quantity * unit_price)
    }

    /// Amount before discount minus the discount.
    pub fn amount_after_discount(&self) -> SectionResult<f64> {
        Ok(self.amount_before_discount()? - self.discount)
    }

    /// Tax exclusive amount used for document totals (before discount).
    pub fn tax_exclusive_amount(&self) -> SectionResult<f64> {
        self.amount_before_discount()
    }

    /// Tax on the discounted amount; zero unless standard rated.
    pub fn tax_amount(&self) -> SectionResult<f64> {
        let base = self.amount_after_discount()?;
        Ok(match self.tax_category {
            TaxCategory::Standard => base * self.tax_percent / 100.0,
            TaxCategory::ZeroRated | TaxCategory::Exempt => 0.0,
        })
    }

    pub fn tax_inclusive_amount(&self) -> SectionResult<f64> {
        Ok(self.amount_after_discount()? + self.tax_amount()?)
    }

    pub fn values(&self) -> LineItemValues {
        LineItemValues {
            id: self.id.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            description: self.description.clone(),
            tax_category: self.tax_category,
            tax_percent: self.tax_percent,
            unit_code: self.unit_code.clone(),
        }
    }

    fn field(&self, name: &str) -> String {
        format!("items.{}.{name}", self.id)
    }

    fn error(&self, name: &str, message: &str) -> ValidationError {
        ValidationError::new(self.field(name), message)
    }
}

impl InvoiceSection for LineItem {
    fn validate_section(&self) -> SectionResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let before = self.amount_before_discount()?;
        if self
            .description
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
        {
            return Err(ValidationError::required(self.field("description"), "Item description"));
        }
        if !self.quantity.is_some_and(is_positive) {
            return Err(self.error("quantity", "Quantity must be greater than 0"));
        }
        if !self.unit_price.is_some_and(is_non_negative) {
            return Err(self.error("unit_price", "Unit price cannot be negative"));
        }
        if !is_non_negative(self.discount) {
            return Err(self.error("discount", "Discount amount cannot be negative"));
        }
        if self.discount > before {
            return Err(self.error("discount", "Discount cannot be greater than total amount"));
        }
        Ok(())
    }

    fn to_xml(&self) -> SectionResult<String> {
        let quantity = self
            .quantity
            .ok_or_else(|| ValidationError::required(self.field("quantity"), "Quantity"))?;
        let unit_price = self
            .unit_price
            .ok_or_else(|| ValidationError::required(self.field("unit_price"), "Unit price"))?;
        let tax_amount = self.tax_amount()?;
        let percent = format!("{:.2}", self.tax_percent);

        let mut w = FragmentWriter::new();
        w.start_element("cac:InvoiceLine")?;
        w.text_element("cbc:ID", &self.id)?;
        w.quantity_element("cbc:InvoicedQuantity", quantity, &self.unit_code)?;
        w.amount_element("cbc:LineExtensionAmount", self.amount_after_discount()?)?;

        w.start_element("cac:TaxTotal")?;
        w.amount_element("cbc:TaxAmount", tax_amount)?;
        w.amount_element("cbc:RoundingAmount", self.tax_inclusive_amount()?)?;
        w.start_element("cac:TaxSubtotal")?;
        w.amount_element("cbc:TaxAmount", tax_amount)?;
        w.start_element("cac:TaxCategory")?;
        w.text_element_with_attrs(
            "cbc:ID",
            self.tax_category.code(),
            &[("schemeAgencyID", "6"), ("schemeID", "UN/ECE 5305")],
        )?;
        w.text_element("cbc:Percent", &percent)?;
        w.start_element("cac:TaxScheme")?;
        w.text_element_with_attrs(
            "cbc:ID",
            "VAT",
            &[("schemeAgencyID", "6"), ("schemeID", "UN/ECE 5153")],
        )?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:TaxCategory")?;
        w.end_element("cac:TaxSubtotal")?;
        w.end_element("cac:TaxTotal")?;

        w.start_element("cac:Item")?;
        w.text_element("cbc:Name", self.description.as_deref().unwrap_or_default())?;
        w.end_element("cac:Item")?;

        w.start_element("cac:Price")?;
        w.amount_element("cbc:PriceAmount", unit_price)?;
        w.start_element("cac:AllowanceCharge")?;
        w.text_element("cbc:ChargeIndicator", "false")?;
        w.text_element("cbc:AllowanceChargeReason", "DISCOUNT")?;
        w.amount_element("cbc:Amount", self.discount)?;
        w.end_element("cac:AllowanceCharge")?;
        w.end_element("cac:Price")?;
        w.end_element("cac:InvoiceLine")?;
        w.into_fragment()
    }

    fn apply_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    fn config(&self) -> ValidationConfig {
        self.config
    }
}

/// Ordered, id-keyed collection of invoice lines.
#[derive(Debug, Clone, Default)]
pub struct InvoiceItems {
    items: Vec<LineItem>,
    config: ValidationConfig,
}

impl InvoiceItems {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            items: Vec::new(),
            config,
        }
    }

    /// Register a new line and return it for configuration.
    ///
    /// With validation enabled a repeated id is rejected. With validation
    /// disabled the existing line is replaced in place, keeping its position.
    pub fn add_item(&mut self, id: impl Into<String>) -> SectionResult<&mut LineItem> {
        let id = id.into();
        let item = LineItem::new(id.clone(), self.config);
        match self.items.iter().position(|i| i.id == id) {
            Some(_) if self.config.enabled => Err(ValidationError::new(
                "items",
                format!("Item with ID {id} already exists"),
            )),
            Some(pos) => {
                self.items[pos] = item;
                Ok(&mut self.items[pos])
            }
            None => {
                self.items.push(item);
                let last = self.items.len() - 1;
                Ok(&mut self.items[last])
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of tax exclusive amounts (before discount).
    pub fn tax_exclusive_total(&self) -> SectionResult<f64> {
        self.items.iter().map(LineItem::tax_exclusive_amount).sum()
    }

    pub fn tax_total(&self) -> SectionResult<f64> {
        self.items.iter().map(LineItem::tax_amount).sum()
    }

    pub fn discount_total(&self) -> f64 {
        self.items.iter().map(LineItem::discount).sum()
    }

    pub fn values(&self) -> Vec<LineItemValues> {
        self.items.iter().map(LineItem::values).collect()
    }
}

impl InvoiceSection for InvoiceItems {
    fn validate_section(&self) -> SectionResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        if self.items.is_empty() {
            return Err(ValidationError::new("items", "At least one invoice item is required"));
        }
        self.items.iter().try_for_each(LineItem::validate_section)
    }

    fn to_xml(&self) -> SectionResult<String> {
        if self.config.enabled && self.items.is_empty() {
            return Err(ValidationError::new("items", "At least one invoice item is required"));
        }
        let fragments = self
            .items
            .iter()
            .map(LineItem::to_xml)
            .collect::<SectionResult<Vec<_>>>()?;
        Ok(fragments.join("\n"))
    }

    fn apply_config(&mut self, config: ValidationConfig) {
        self.config = config;
        for item in &mut self.items {
            item.apply_config(config);
        }
    }

    fn config(&self) -> ValidationConfig {
        self.config
    }
}
