//! Validation trait definition

/// Trait for validating configuration sections
pub trait Validate {
    /// Validate the configuration, returning the first problem found
    fn validate(&self) -> Result<(), String>;
}
