//! # jofotara
//!
//! Invoice assembly, validation and submission for Jordan's JoFotara
//! e-invoicing system.
//!
//! Invoices are built section by section (basic information, seller, buyer,
//! supplier income source, line items, totals). Each section checks its own
//! values; the document reconciles the totals against the line items and
//! renders one UBL 2.1 XML document. Monetary values are `f64` and are only
//! formatted, to nine decimals, when rendered.
//!
//! ## Quick Start
//!
//! ```rust
//! use jofotara::core::*;
//!
//! let mut defaults = SellerDefaults::new();
//! defaults.configure("12345678", "Test Seller")?;
//!
//! let mut invoice = InvoiceDocument::new().with_seller_defaults(&defaults);
//! invoice
//!     .basic_information()
//!     .set_invoice_id("INV-001")?
//!     .set_uuid("123e4567-e89b-12d3-a456-426614174000")?
//!     .set_issue_date_str("16-02-2025")?
//!     .set_invoice_type(InvoiceType::GeneralSales)
//!     .cash();
//! invoice
//!     .buyer_information()
//!     .set_id("123456789", IdType::TaxId)
//!     .set_name("Test Buyer")
//!     .set_city_code(CityCode::Amman)
//!     .set_phone("0791234567")?;
//! invoice.supplier_income_source("123456789");
//! invoice
//!     .items()
//!     .add_item("1")?
//!     .set_quantity(2.0)?
//!     .set_unit_price(50.0)?
//!     .set_description("Consulting")
//!     .set_discount(10.0)?
//!     .tax(16.0)?;
//!
//! let totals = invoice.invoice_totals()?;
//! assert_eq!(totals.payable_amount(), Some(104.4));
//!
//! let xml = invoice.generate_xml()?;
//! assert!(xml.contains(r#"<cbc:InvoiceTypeCode name="012">388</cbc:InvoiceTypeCode>"#));
//! # Ok::<(), ValidationError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Sections, validation, reconciliation, XML rendering |
//! | `api` | Submission client, response model, `Transport` trait |
//! | `http` | Blocking HTTPS transport (`reqwest`) |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "api")]
pub mod api;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
