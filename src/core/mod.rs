//! Invoice sections, the document orchestrator and XML rendering.
//!
//! Every section validates its own fields and renders one UBL fragment.
//! [`InvoiceDocument`] owns the sections, reconciles the totals with the
//! line items and joins the fragments into the final document.

mod basic;
mod config;
mod document;
mod error;
mod items;
mod parties;
mod section;
mod totals;
mod types;
pub mod xml;

pub use basic::*;
pub use config::*;
pub use document::*;
pub use error::*;
pub use items::*;
pub use parties::*;
pub use section::*;
pub use totals::*;
pub use types::*;
