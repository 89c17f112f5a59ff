use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Tax category of an invoice line, as coded by the JoFotara profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaxCategory {
    /// S: Standard rate, a positive percentage applies.
    #[default]
    Standard,
    /// O: Zero rated, taxable at 0 %.
    ZeroRated,
    /// Z: Exempt from tax.
    Exempt,
}

impl TaxCategory {
    /// Category code letter.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Standard => "S",
            Self::ZeroRated => "O",
            Self::Exempt => "Z",
        }
    }

    /// Parse from the category code letter.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::Standard),
            "O" => Some(Self::ZeroRated),
            "Z" => Some(Self::Exempt),
            _ => None,
        }
    }
}

impl FromStr for TaxCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
            .ok_or_else(|| ValidationError::new("tax_category", "Tax category must be Z, O, or S"))
    }
}

impl fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Scheme of a buyer identification number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    /// NIN: National identification number.
    NationalId,
    /// PN: Passport number.
    Passport,
    /// TIN: Tax identification number.
    TaxId,
}

impl IdType {
    pub const ALL: [IdType; 3] = [Self::NationalId, Self::Passport, Self::TaxId];

    /// Scheme code rendered as `schemeID`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NationalId => "NIN",
            Self::Passport => "PN",
            Self::TaxId => "TIN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl FromStr for IdType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| {
            ValidationError::new(
                "buyer.id_type",
                format!("ID type must be one of: {}", join_codes(Self::ALL.map(|t| t.code()))),
            )
        })
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// ISO 3166-2:JO governorate codes accepted for buyer addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CityCode {
    Balqa,
    Maan,
    Madaba,
    Mafraq,
    Karak,
    Jerash,
    Irbid,
    Zarqa,
    Tafilah,
    Aqaba,
    Amman,
    Ajloun,
}

impl CityCode {
    pub const ALL: [CityCode; 12] = [
        Self::Balqa,
        Self::Maan,
        Self::Madaba,
        Self::Mafraq,
        Self::Karak,
        Self::Jerash,
        Self::Irbid,
        Self::Zarqa,
        Self::Tafilah,
        Self::Aqaba,
        Self::Amman,
        Self::Ajloun,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Balqa => "JO-BA",
            Self::Maan => "JO-MN",
            Self::Madaba => "JO-MD",
            Self::Mafraq => "JO-MA",
            Self::Karak => "JO-KA",
            Self::Jerash => "JO-JA",
            Self::Irbid => "JO-IR",
            Self::Zarqa => "JO-AZ",
            Self::Tafilah => "JO-AT",
            Self::Aqaba => "JO-AQ",
            Self::Amman => "JO-AM",
            Self::Ajloun => "JO-AJ",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl FromStr for CityCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| {
            ValidationError::new(
                "buyer.city_code",
                format!("City code must be one of: {}", join_codes(Self::ALL.map(|c| c.code()))),
            )
        })
    }
}

impl fmt::Display for CityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind of sale the invoice reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    /// Income invoice (taxpayers not registered for sales tax).
    Income,
    /// General sales tax invoice.
    GeneralSales,
    /// Special sales tax invoice.
    SpecialSales,
}

impl InvoiceType {
    pub const ALL: [InvoiceType; 3] = [Self::Income, Self::GeneralSales, Self::SpecialSales];

    /// Name accepted when parsing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::GeneralSales => "general_sales",
            Self::SpecialSales => "special_sales",
        }
    }

    /// Last digit of the invoice type code name.
    pub fn digit(&self) -> char {
        match self {
            Self::Income => '1',
            Self::GeneralSales => '2',
            Self::SpecialSales => '3',
        }
    }
}

impl FromStr for InvoiceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.name() == s).ok_or_else(|| {
            ValidationError::new(
                "basic.invoice_type",
                format!("Invoice type must be one of: {}", join_codes(Self::ALL.map(|t| t.name()))),
            )
        })
    }
}

/// How the invoice is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Receivable,
}

impl PaymentMethod {
    /// Leading two digits of the invoice type code name.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cash => "01",
            Self::Receivable => "02",
        }
    }
}

/// Jordanian mobile number: `07` followed by 7, 8 or 9 and seven more digits.
pub fn is_jordanian_mobile(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 10
        && bytes.starts_with(b"07")
        && matches!(bytes[2], b'7' | b'8' | b'9')
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

/// Finite and strictly greater than zero. NaN and infinities fail.
pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Finite and not below zero. NaN and infinities fail.
pub(crate) fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn join_codes<const N: usize>(codes: [&str; N]) -> String {
    codes.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_category_codes() {
        assert_eq!(TaxCategory::Standard.code(), "S");
        assert_eq!(TaxCategory::ZeroRated.code(), "O");
        assert_eq!(TaxCategory::Exempt.code(), "Z");
        assert_eq!("Z".parse::<TaxCategory>().unwrap(), TaxCategory::Exempt);
        assert_eq!(
            "X".parse::<TaxCategory>().unwrap_err().to_string(),
            "Tax category must be Z, O, or S"
        );
    }

    #[test]
    fn id_type_parse() {
        assert_eq!("PN".parse::<IdType>().unwrap(), IdType::Passport);
        assert_eq!(
            "SSN".parse::<IdType>().unwrap_err().to_string(),
            "ID type must be one of: NIN, PN, TIN"
        );
    }

    #[test]
    fn city_codes_are_fixed() {
        assert_eq!(CityCode::ALL.len(), 12);
        for city in CityCode::ALL {
            assert_eq!(CityCode::from_code(city.code()), Some(city));
        }
        assert_eq!("JO-IR".parse::<CityCode>().unwrap(), CityCode::Irbid);
        let err = "JO-XX".parse::<CityCode>().unwrap_err().to_string();
        assert!(err.starts_with("City code must be one of: JO-BA, JO-MN"));
        assert!(err.ends_with("JO-AM, JO-AJ"));
    }

    #[test]
    fn invoice_type_parse() {
        assert_eq!("general_sales".parse::<InvoiceType>().unwrap(), InvoiceType::GeneralSales);
        assert!("refund".parse::<InvoiceType>().is_err());
    }

    #[test]
    fn mobile_numbers() {
        assert!(is_jordanian_mobile("0791234567"));
        assert!(is_jordanian_mobile("0771234567"));
        assert!(is_jordanian_mobile("0781234567"));
        assert!(!is_jordanian_mobile("0761234567"));
        assert!(!is_jordanian_mobile("079123456"));
        assert!(!is_jordanian_mobile("07912345678"));
        assert!(!is_jordanian_mobile("+962791234567"));
        assert!(!is_jordanian_mobile("07912a4567"));
        assert!(!is_jordanian_mobile(""));
    }
}
