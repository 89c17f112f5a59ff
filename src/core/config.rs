//! Configuration values threaded into sections at construction time.

use serde::{Deserialize, Serialize};

use super::error::{SectionResult, ValidationError};

/// Whether numeric and policy checks run for a section.
///
/// Categorical checks (enum membership, tax category codes) always run.
/// A document hands its config to every section it creates and re-applies
/// it to existing sections whenever the flag changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub enabled: bool,
}

impl ValidationConfig {
    pub const ENABLED: Self = Self { enabled: true };
    pub const DISABLED: Self = Self { enabled: false };

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// Seller identity shared by many invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerIdentity {
    /// Tax identification number.
    pub tin: String,
    /// Name as registered with the Income and Sales Tax Department.
    pub name: String,
}

/// Default seller identity applied to documents created with it.
///
/// Owned by the caller and passed to
/// [`InvoiceDocument::with_seller_defaults`](super::InvoiceDocument::with_seller_defaults).
/// A document snapshots the identity when it is created, so later
/// `configure`/`clear` calls only affect documents created afterwards.
///
/// ```
/// use jofotara::core::*;
///
/// let mut defaults = SellerDefaults::new();
/// defaults.configure("12345678", "Acme Trading").unwrap();
///
/// let mut invoice = InvoiceDocument::new().with_seller_defaults(&defaults);
/// assert_eq!(invoice.seller_information().tin(), Some("12345678"));
///
/// defaults.clear();
/// let mut next = InvoiceDocument::new().with_seller_defaults(&defaults);
/// assert_eq!(next.seller_information().tin(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SellerDefaults {
    identity: Option<SellerIdentity>,
}

impl SellerDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default TIN and name. Blank values are always rejected.
    pub fn configure(&mut self, tin: &str, name: &str) -> SectionResult<&mut Self> {
        if tin.trim().is_empty() {
            return Err(ValidationError::new("seller.tin", "TIN cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(ValidationError::new("seller.name", "Seller name cannot be empty"));
        }
        self.identity = Some(SellerIdentity {
            tin: tin.to_string(),
            name: name.to_string(),
        });
        Ok(self)
    }

    /// Forget the configured identity.
    pub fn clear(&mut self) {
        self.identity = None;
    }

    pub fn identity(&self) -> Option<&SellerIdentity> {
        self.identity.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.identity.is_some()
    }
}
