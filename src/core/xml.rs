//! XML rendering helpers shared by all sections.
//!
//! Fragments are written compactly with [`FragmentWriter`] and then passed
//! through [`normalize_xml`], which is the one place indentation is decided.
//! Identical field values therefore always produce identical bytes.

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::error::{SectionResult, ValidationError};

/// Currency attribute carried by every monetary amount.
pub const CURRENCY_ID: &str = "JO";

/// Digits after the decimal point in rendered amounts and quantities.
pub const AMOUNT_DECIMALS: usize = 9;

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2.1";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}

const INDENT_WIDTH: usize = 4;

fn xml_error(e: impl std::fmt::Display) -> ValidationError {
    ValidationError::new("xml", format!("XML write error: {e}"))
}

/// Escape `& < > " '` for use in text or attribute values.
pub fn escape_xml(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Re-indent an XML fragment (or a sequence of sibling fragments).
///
/// Text made up only of whitespace counts as formatting and is dropped;
/// any other text is kept byte for byte, including its leading and trailing
/// spaces. Nesting is then indented by four spaces per level and elements
/// containing only text stay on one line.
pub fn normalize_xml(xml: &str) -> SectionResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Text(text)) if text.iter().all(u8::is_ascii_whitespace) => {}
            Ok(event) => writer.write_event(event).map_err(xml_error)?,
            Err(e) => {
                return Err(ValidationError::new(
                    "xml",
                    format!("malformed XML at position {}: {e}", reader.error_position()),
                ));
            }
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| ValidationError::new("xml", format!("XML UTF-8 error: {e}")))
}

/// Fixed-point rendering of a monetary amount or quantity.
pub fn format_amount(value: f64) -> String {
    format!("{:.*}", AMOUNT_DECIMALS, value)
}

/// Compact writer for section fragments.
pub struct FragmentWriter {
    writer: Writer<Vec<u8>>,
}

impl FragmentWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    /// Finish the fragment and return it normalized.
    pub fn into_fragment(self) -> SectionResult<String> {
        let raw = String::from_utf8(self.writer.into_inner())
            .map_err(|e| ValidationError::new("xml", format!("XML UTF-8 error: {e}")))?;
        normalize_xml(&raw)
    }

    pub fn start_element(&mut self, name: &str) -> SectionResult<&mut Self> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_error)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> SectionResult<&mut Self> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer.write_event(Event::Start(elem)).map_err(xml_error)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> SectionResult<&mut Self> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> SectionResult<&mut Self> {
        self.text_element_with_attrs(name, text, &[])
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> SectionResult<&mut Self> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(escape_xml(text))))
            .map_err(xml_error)?;
        self.end_element(name)
    }

    /// Write an amount with the `currencyID` attribute.
    pub fn amount_element(&mut self, name: &str, amount: f64) -> SectionResult<&mut Self> {
        self.text_element_with_attrs(name, &format_amount(amount), &[("currencyID", CURRENCY_ID)])
    }

    /// Write a quantity with the `unitCode` attribute.
    pub fn quantity_element(
        &mut self,
        name: &str,
        quantity: f64,
        unit: &str,
    ) -> SectionResult<&mut Self> {
        self.text_element_with_attrs(name, &format_amount(quantity), &[("unitCode", unit)])
    }
}

impl Default for FragmentWriter {
    fn default() -> Self {
        Self::new()
    }
}
