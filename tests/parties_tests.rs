use jofotara::core::*;

// --- Seller ---

#[test]
fn seller_xml() {
    let mut seller = SellerInformation::new(ValidationConfig::ENABLED);
    seller.set_tin("12345678").unwrap().set_name("Test Seller").unwrap();
    let expected = "\
<cac:AccountingSupplierParty>
    <cac:Party>
        <cac:PostalAddress>
            <cac:Country>
                <cbc:IdentificationCode>JO</cbc:IdentificationCode>
            </cac:Country>
        </cac:PostalAddress>
        <cac:PartyTaxScheme>
            <cbc:CompanyID>12345678</cbc:CompanyID>
            <cac:TaxScheme>
                <cbc:ID>VAT</cbc:ID>
            </cac:TaxScheme>
        </cac:PartyTaxScheme>
        <cac:PartyLegalEntity>
            <cbc:RegistrationName>Test Seller</cbc:RegistrationName>
        </cac:PartyLegalEntity>
    </cac:Party>
</cac:AccountingSupplierParty>";
    assert_eq!(seller.to_xml().unwrap(), expected);
}

#[test]
fn seller_requires_tin_and_name() {
    let seller = SellerInformation::new(ValidationConfig::ENABLED);
    assert_eq!(
        seller.validate_section().unwrap_err().to_string(),
        "Seller TIN is required"
    );
    assert_eq!(seller.to_xml().unwrap_err().to_string(), "Seller TIN is required");

    let mut named = SellerInformation::new(ValidationConfig::ENABLED);
    named.set_tin("1").unwrap();
    assert_eq!(
        named.validate_section().unwrap_err().to_string(),
        "Seller name is required"
    );

    let lax = SellerInformation::new(ValidationConfig::DISABLED);
    lax.validate_section().unwrap();
}

#[test]
fn seller_rejects_blank_name() {
    let mut seller = SellerInformation::new(ValidationConfig::ENABLED);
    assert_eq!(
        seller.set_name("  ").unwrap_err().to_string(),
        "Seller name cannot be empty"
    );
}

#[test]
fn seller_escapes_name() {
    let mut seller = SellerInformation::new(ValidationConfig::ENABLED);
    seller.set_tin("1").unwrap().set_name("Ali & Sons").unwrap();
    assert!(seller.to_xml().unwrap().contains("Ali &amp; Sons"));
}

// --- Buyer ---

fn full_buyer() -> BuyerInformation {
    let mut buyer = BuyerInformation::new(ValidationConfig::ENABLED);
    buyer
        .set_id("123456789", IdType::TaxId)
        .set_postal_code("11181")
        .set_city_code(CityCode::Amman)
        .set_tin("123456789")
        .set_name("Test Buyer")
        .set_phone("0791234567")
        .unwrap();
    buyer
}

#[test]
fn buyer_xml() {
    let expected = "\
<cac:AccountingCustomerParty>
    <cac:Party>
        <cac:PartyIdentification>
            <cbc:ID schemeID=\"TIN\">123456789</cbc:ID>
        </cac:PartyIdentification>
        <cac:PostalAddress>
            <cbc:PostalZone>11181</cbc:PostalZone>
            <cbc:CountrySubentityCode>JO-AM</cbc:CountrySubentityCode>
            <cac:Country>
                <cbc:IdentificationCode>JO</cbc:IdentificationCode>
            </cac:Country>
        </cac:PostalAddress>
        <cac:PartyTaxScheme>
            <cbc:CompanyID>123456789</cbc:CompanyID>
            <cac:TaxScheme>
                <cbc:ID>VAT</cbc:ID>
            </cac:TaxScheme>
        </cac:PartyTaxScheme>
        <cac:PartyLegalEntity>
            <cbc:RegistrationName>Test Buyer</cbc:RegistrationName>
        </cac:PartyLegalEntity>
    </cac:Party>
    <cac:AccountingContact>
        <cbc:Telephone>0791234567</cbc:Telephone>
    </cac:AccountingContact>
</cac:AccountingCustomerParty>";
    assert_eq!(full_buyer().to_xml().unwrap(), expected);
}

#[test]
fn buyer_address_only_with_city() {
    let mut buyer = BuyerInformation::new(ValidationConfig::ENABLED);
    buyer.set_id("9", IdType::NationalId).set_city_code(CityCode::Irbid);
    let xml = buyer.to_xml().unwrap();
    assert!(xml.contains("<cbc:CountrySubentityCode>JO-IR</cbc:CountrySubentityCode>"));
    assert!(!xml.contains("PostalZone"));
    assert!(!xml.contains("PartyTaxScheme"));
    assert!(!xml.contains("AccountingContact"));
}

#[test]
fn buyer_phone_formats() {
    let mut buyer = BuyerInformation::new(ValidationConfig::ENABLED);
    buyer.set_phone("0791234567").unwrap();
    assert_eq!(
        buyer.set_phone("0761234567").unwrap_err().to_string(),
        "Invalid phone number format. Must be a valid Jordanian mobile number"
    );
    assert!(buyer.set_phone("079123456").is_err());
    assert_eq!(buyer.phone(), Some("0791234567"));
}

#[test]
fn buyer_validate_section() {
    let mut buyer = BuyerInformation::new(ValidationConfig::ENABLED);
    assert_eq!(
        buyer.validate_section().unwrap_err().to_string(),
        "Buyer ID and type are required"
    );
    buyer.set_id("  ", IdType::Passport);
    assert_eq!(
        buyer.validate_section().unwrap_err().to_string(),
        "Buyer ID cannot be empty"
    );
    full_buyer().validate_section().unwrap();
}

#[test]
fn buyer_phone_stored_while_disabled_fails_once_enabled() {
    let mut buyer = BuyerInformation::new(ValidationConfig::DISABLED);
    buyer.set_id("1", IdType::NationalId).set_phone("12345").unwrap();
    buyer.validate_section().unwrap();

    buyer.set_validations_enabled(true);
    assert!(buyer.validate_section().is_err());
}

#[test]
fn buyer_categorical_codes_checked_even_when_disabled() {
    let mut buyer = BuyerInformation::new(ValidationConfig::DISABLED);
    assert_eq!(
        buyer.set_id_with_code("1", "SSN").unwrap_err().to_string(),
        "ID type must be one of: NIN, PN, TIN"
    );
    assert_eq!(
        buyer.set_city_code_str("Amman").unwrap_err().to_string(),
        "City code must be one of: JO-BA, JO-MN, JO-MD, JO-MA, JO-KA, JO-JA, JO-IR, JO-AZ, JO-AT, JO-AQ, JO-AM, JO-AJ"
    );
    buyer.set_id_with_code("A1", "PN").unwrap();
    assert_eq!(buyer.id_type(), Some(IdType::Passport));
}

#[test]
fn buyer_values_snapshot() {
    let values = full_buyer().values();
    assert_eq!(values, full_buyer().values());
    assert_eq!(values.id.as_deref(), Some("123456789"));
    assert_eq!(values.id_type, Some(IdType::TaxId));
    assert_eq!(values.city_code, Some(CityCode::Amman));
}

// --- Supplier ---

#[test]
fn supplier_xml() {
    let supplier = SupplierParty::new("123456789", ValidationConfig::ENABLED);
    assert_eq!(
        supplier.to_xml().unwrap(),
        "<cac:SellerSupplierParty>\n    <cac:PartyIdentification>\n        <cbc:ID>123456789</cbc:ID>\n    </cac:PartyIdentification>\n</cac:SellerSupplierParty>"
    );
}

#[test]
fn supplier_requires_sequence() {
    let supplier = SupplierParty::new("", ValidationConfig::ENABLED);
    assert_eq!(
        supplier.validate_section().unwrap_err().to_string(),
        "Income source sequence is required"
    );
    SupplierParty::new("", ValidationConfig::DISABLED)
        .validate_section()
        .unwrap();
}

#[test]
fn buyer_accepts_078_prefix() {
    // 077, 078 and 079 are all valid operator prefixes.
    let mut buyer = BuyerInformation::new(ValidationConfig::ENABLED);
    buyer.set_phone("0781234567").unwrap();
    assert_eq!(buyer.phone(), Some("0781234567"));
}

#[test]
fn names_keep_surrounding_spaces() {
    let mut seller = SellerInformation::new(ValidationConfig::ENABLED);
    seller.set_tin("1").unwrap().set_name("  Acme  ").unwrap();
    assert!(
        seller
            .to_xml()
            .unwrap()
            .contains("<cbc:RegistrationName>  Acme  </cbc:RegistrationName>")
    );
}
