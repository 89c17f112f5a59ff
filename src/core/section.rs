use super::config::ValidationConfig;
use super::error::SectionResult;

/// A part of the invoice that can check its own completeness and render
/// itself as a UBL fragment.
pub trait InvoiceSection {
    /// Verify that required fields are present and consistent.
    /// A no-op when validation is disabled for the section.
    fn validate_section(&self) -> SectionResult<()>;

    /// Render the section's XML fragment.
    fn to_xml(&self) -> SectionResult<String>;

    /// Apply `config` to this section and everything it owns.
    fn apply_config(&mut self, config: ValidationConfig);

    fn config(&self) -> ValidationConfig;

    fn set_validations_enabled(&mut self, enabled: bool) {
        self.apply_config(ValidationConfig::new(enabled));
    }

    fn validations_enabled(&self) -> bool {
        self.config().enabled
    }
}
