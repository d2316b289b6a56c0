use crate::rules::{commitment_rule, expiry_rule, format_rule, size_rule, BlobValidationConfig, RuleError};
use types::{Commitment, Slot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<RuleError>,
}

/// Ordered rule chain over a candidate blob (§4.14): size, format, commitment, expiry. All rules
/// run regardless of earlier failures so the caller sees every violation at once.
pub struct BlobValidator {
    config: BlobValidationConfig,
}

impl BlobValidator {
    pub fn new(config: BlobValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(
        &self,
        data: &[u8],
        commitment: &Commitment,
        expiry: Slot,
        current_slot: Slot,
    ) -> ValidationResult {
        let errors: Vec<RuleError> = [
            size_rule(data, &self.config),
            format_rule(data, &self.config),
            commitment_rule(data, commitment),
            expiry_rule(current_slot, expiry),
        ]
        .into_iter()
        .flatten()
        .collect();

        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }
}
