//! Seller, buyer and supplier sections.

use serde::Serialize;

use super::config::{SellerIdentity, ValidationConfig};
use super::error::{SectionResult, ValidationError};
use super::section::InvoiceSection;
use super::types::{CityCode, IdType, is_jordanian_mobile};
use super::xml::FragmentWriter;

/// Country code of every party address.
pub const COUNTRY_CODE: &str = "JO";

fn write_tax_scheme(w: &mut FragmentWriter, company_id: &str) -> SectionResult<()> {
    w.start_element("cac:PartyTaxScheme")?;
    w.text_element("cbc:CompanyID", company_id)?;
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", "VAT")?;
    w.end_element("cac:TaxScheme")?;
    w.end_element("cac:PartyTaxScheme")?;
    Ok(())
}

fn write_legal_entity(w: &mut FragmentWriter, name: &str) -> SectionResult<()> {
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", name)?;
    w.end_element("cac:PartyLegalEntity")?;
    Ok(())
}

fn write_country(w: &mut FragmentWriter) -> SectionResult<()> {
    w.start_element("cac:Country")?;
    w.text_element("cbc:IdentificationCode", COUNTRY_CODE)?;
    w.end_element("cac:Country")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Seller
// ---------------------------------------------------------------------------

/// The invoicing taxpayer.
#[derive(Debug, Clone, Default)]
pub struct SellerInformation {
    tin: Option<String>,
    name: Option<String>,
    config: ValidationConfig,
}

/// Snapshot of the seller section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerValues {
    pub tin: Option<String>,
    pub name: Option<String>,
    pub country_code: &'static str,
}

impl SellerInformation {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            tin: None,
            name: None,
            config,
        }
    }

    /// Start from a default identity, if one is given.
    pub fn from_identity(identity: Option<&SellerIdentity>, config: ValidationConfig) -> Self {
        Self {
            tin: identity.map(|i| i.tin.clone()),
            name: identity.map(|i| i.name.clone()),
            config,
        }
    }

    pub fn set_tin(&mut self, tin: impl Into<String>) -> SectionResult<&mut Self> {
        let tin = tin.into();
        if tin.trim().is_empty() {
            return Err(ValidationError::new("seller.tin", "TIN cannot be empty"));
        }
        self.tin = Some(tin);
        Ok(self)
    }

    /// Set the name as registered with the tax department.
    pub fn set_name(&mut self, name: impl Into<String>) -> SectionResult<&mut Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::new("seller.name", "Seller name cannot be empty"));
        }
        self.name = Some(name);
        Ok(self)
    }

    pub fn tin(&self) -> Option<&str> {
        self.tin.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn values(&self) -> SellerValues {
        SellerValues {
            tin: self.tin.clone(),
            name: self.name.clone(),
            country_code: COUNTRY_CODE,
        }
    }

    fn required(&self) -> SectionResult<(&str, &str)> {
        let tin = self
            .tin
            .as_deref()
            .ok_or_else(|| ValidationError::required("seller.tin", "Seller TIN"))?;
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| ValidationError::required("seller.name", "Seller name"))?;
        Ok((tin, name))
    }
}

impl InvoiceSection for SellerInformation {
    fn validate_section(&self) -> SectionResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        self.required().map(|_| ())
    }

    fn to_xml(&self) -> SectionResult<String> {
        let (tin, name) = self.required()?;
        let mut w = FragmentWriter::new();
        w.start_element("cac:AccountingSupplierParty")?;
        w.start_element("cac:Party")?;
        w.start_element("cac:PostalAddress")?;
        write_country(&mut w)?;
        w.end_element("cac:PostalAddress")?;
        write_tax_scheme(&mut w, tin)?;
        write_legal_entity(&mut w, name)?;
        w.end_element("cac:Party")?;
        w.end_element("cac:AccountingSupplierParty")?;
        w.into_fragment()
    }

    fn apply_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    fn config(&self) -> ValidationConfig {
        self.config
    }
}

// ---------------------------------------------------------------------------
// Buyer
// ---------------------------------------------------------------------------

/// The customer. Every field is optional until validation.
#[derive(Debug, Clone, Default)]
pub struct BuyerInformation {
    id: Option<(String, IdType)>,
    postal_code: Option<String>,
    city_code: Option<CityCode>,
    name: Option<String>,
    phone: Option<String>,
    tin: Option<String>,
    config: ValidationConfig,
}

/// Snapshot of the buyer section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuyerValues {
    pub id: Option<String>,
    pub id_type: Option<IdType>,
    pub postal_code: Option<String>,
    pub city_code: Option<CityCode>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub tin: Option<String>,
}

impl BuyerInformation {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>, id_type: IdType) -> &mut Self {
        self.id = Some((id.into(), id_type));
        self
    }

    /// Set the identification number with a raw scheme code (`NIN`, `PN`, `TIN`).
    pub fn set_id_with_code(
        &mut self,
        id: impl Into<String>,
        id_type: &str,
    ) -> SectionResult<&mut Self> {
        let id_type = id_type.parse::<IdType>()?;
        Ok(self.set_id(id, id_type))
    }

    pub fn set_postal_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.postal_code = Some(code.into());
        self
    }

    pub fn set_city_code(&mut self, city: CityCode) -> &mut Self {
        self.city_code = Some(city);
        self
    }

    /// Set the governorate from its ISO code (e.g. `JO-AM`).
    pub fn set_city_code_str(&mut self, code: &str) -> SectionResult<&mut Self> {
        let city = code.parse::<CityCode>()?;
        Ok(self.set_city_code(city))
    }

    /// Required for receivable invoices and for cash invoices above 10,000 JOD.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) -> SectionResult<&mut Self> {
        let phone = phone.into();
        if self.config.enabled {
            check_phone(&phone)?;
        }
        self.phone = Some(phone);
        Ok(self)
    }

    pub fn set_tin(&mut self, tin: impl Into<String>) -> &mut Self {
        self.tin = Some(tin.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn id_type(&self) -> Option<IdType> {
        self.id.as_ref().map(|(_, t)| *t)
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn city_code(&self) -> Option<CityCode> {
        self.city_code
    }

    pub fn values(&self) -> BuyerValues {
        BuyerValues {
            id: self.id().map(str::to_string),
            id_type: self.id_type(),
            postal_code: self.postal_code.clone(),
            city_code: self.city_code,
            name: self.name.clone(),
            phone: self.phone.clone(),
            tin: self.tin.clone(),
        }
    }
}

fn check_phone(phone: &str) -> SectionResult<()> {
    if !is_jordanian_mobile(phone) {
        return Err(ValidationError::new(
            "buyer.phone",
            "Invalid phone number format. Must be a valid Jordanian mobile number",
        ));
    }
    Ok(())
}

impl InvoiceSection for BuyerInformation {
    fn validate_section(&self) -> SectionResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let Some((id, _)) = &self.id else {
            return Err(ValidationError::new("buyer.id", "Buyer ID and type are required"));
        };
        if id.trim().is_empty() {
            return Err(ValidationError::new("buyer.id", "Buyer ID cannot be empty"));
        }
        if let Some(phone) = &self.phone {
            check_phone(phone)?;
        }
        Ok(())
    }

    fn to_xml(&self) -> SectionResult<String> {
        let mut w = FragmentWriter::new();
        w.start_element("cac:AccountingCustomerParty")?;
        w.start_element("cac:Party")?;

        if let Some((id, id_type)) = &self.id {
            w.start_element("cac:PartyIdentification")?;
            w.text_element_with_attrs("cbc:ID", id, &[("schemeID", id_type.code())])?;
            w.end_element("cac:PartyIdentification")?;
        }

        if self.postal_code.is_some() || self.city_code.is_some() {
            w.start_element("cac:PostalAddress")?;
            if let Some(postal) = &self.postal_code {
                w.text_element("cbc:PostalZone", postal)?;
            }
            if let Some(city) = self.city_code {
                w.text_element("cbc:CountrySubentityCode", city.code())?;
            }
            write_country(&mut w)?;
            w.end_element("cac:PostalAddress")?;
        }

        if let Some(tin) = &self.tin {
            write_tax_scheme(&mut w, tin)?;
        }
        if let Some(name) = &self.name {
            write_legal_entity(&mut w, name)?;
        }
        w.end_element("cac:Party")?;

        if let Some(phone) = &self.phone {
            w.start_element("cac:AccountingContact")?;
            w.text_element("cbc:Telephone", phone)?;
            w.end_element("cac:AccountingContact")?;
        }

        w.end_element("cac:AccountingCustomerParty")?;
        w.into_fragment()
    }

    fn apply_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    fn config(&self) -> ValidationConfig {
        self.config
    }
}

// ---------------------------------------------------------------------------
// Supplier income source
// ---------------------------------------------------------------------------

/// Income source sequence assigned to the seller by the tax portal.
#[derive(Debug, Clone, Default)]
pub struct SupplierParty {
    sequence: String,
    config: ValidationConfig,
}

impl SupplierParty {
    pub fn new(sequence: impl Into<String>, config: ValidationConfig) -> Self {
        Self {
            sequence: sequence.into(),
            config,
        }
    }

    pub fn set_sequence(&mut self, sequence: impl Into<String>) -> &mut Self {
        self.sequence = sequence.into();
        self
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }
}

impl InvoiceSection for SupplierParty {
    fn validate_section(&self) -> SectionResult<()> {
        if self.config.enabled && self.sequence.trim().is_empty() {
            return Err(ValidationError::required(
                "supplier.sequence",
                "Income source sequence",
            ));
        }
        Ok(())
    }

    fn to_xml(&self) -> SectionResult<String> {
        let mut w = FragmentWriter::new();
        w.start_element("cac:SellerSupplierParty")?;
        w.start_element("cac:PartyIdentification")?;
        w.text_element("cbc:ID", &self.sequence)?;
        w.end_element("cac:PartyIdentification")?;
        w.end_element("cac:SellerSupplierParty")?;
        w.into_fragment()
    }

    fn apply_config(&mut self, config: ValidationConfig) {
        self.config = config;
    }

    fn config(&self) -> ValidationConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seller_starts_from_identity() {
        let identity = SellerIdentity {
            tin: "111".into(),
            name: "Shop".into(),
        };
        let seller = SellerInformation::from_identity(Some(&identity), ValidationConfig::ENABLED);
        assert_eq!(seller.tin(), Some("111"));
        assert_eq!(seller.name(), Some("Shop"));
    }

    #[test]
    fn seller_rejects_blank_tin_even_when_disabled() {
        let mut seller = SellerInformation::new(ValidationConfig::DISABLED);
        assert_eq!(seller.set_tin(" ").unwrap_err().to_string(), "TIN cannot be empty");
    }

    #[test]
    fn buyer_phone_checked_only_when_enabled() {
        let mut buyer = BuyerInformation::new(ValidationConfig::DISABLED);
        buyer.set_phone("12345").unwrap();
        assert_eq!(buyer.phone(), Some("12345"));

        let mut strict = BuyerInformation::new(ValidationConfig::ENABLED);
        let err = strict.set_phone("0761234567").unwrap_err();
        assert_eq!(err.field, "buyer.phone");
        assert_eq!(strict.phone(), None);
    }

    #[test]
    fn buyer_city_code_is_categorical() {
        let mut buyer = BuyerInformation::new(ValidationConfig::DISABLED);
        assert!(buyer.set_city_code_str("JO-XX").is_err());
        buyer.set_city_code_str("JO-AQ").unwrap();
        assert_eq!(buyer.city_code(), Some(CityCode::Aqaba));
    }

    #[test]
    fn contact_sits_outside_party() {
        let mut buyer = BuyerInformation::new(ValidationConfig::ENABLED);
        buyer.set_phone("0791234567").unwrap();
        let xml = buyer.to_xml().unwrap();
        let party_end = xml.find("</cac:Party>").unwrap();
        let contact = xml.find("<cac:AccountingContact>").unwrap();
        assert!(contact > party_end);
        assert!(xml.contains("        <cbc:Telephone>0791234567</cbc:Telephone>"));
    }
}
