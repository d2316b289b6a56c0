use das_crypto::keccak256;
use types::{Commitment, Slot};

const HIGH_BYTE_CEILING: u8 = 0x73;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    SizeOutOfRange,
    UnalignedLength,
    HighByteViolation { element_index: usize },
    CommitmentMismatch,
    Expired,
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SizeOutOfRange => write!(f, "blob size outside [min, max]"),
            Self::UnalignedLength => write!(f, "length is not a multiple of bytes_per_field_element"),
            Self::HighByteViolation { element_index } => {
                write!(f, "field element {element_index} has a high byte >= 0x{HIGH_BYTE_CEILING:02x}")
            }
            Self::CommitmentMismatch => write!(f, "recomputed hash does not match commitment"),
            Self::Expired => write!(f, "current slot is past the blob's expiry"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlobValidationConfig {
    pub min_size: usize,
    pub max_size: usize,
    pub bytes_per_field_element: usize,
    pub strict_format: bool,
}

pub fn size_rule(data: &[u8], cfg: &BlobValidationConfig) -> Option<RuleError> {
    if data.len() < cfg.min_size || data.len() > cfg.max_size {
        Some(RuleError::SizeOutOfRange)
    } else {
        None
    }
}

/// Strict mode rejects any length not a multiple of `bytes_per_field_element`; either mode
/// checks the high byte of every fully-present field element.
pub fn format_rule(data: &[u8], cfg: &BlobValidationConfig) -> Option<RuleError> {
    if cfg.bytes_per_field_element == 0 {
        return None;
    }
    if cfg.strict_format && data.len() % cfg.bytes_per_field_element != 0 {
        return Some(RuleError::UnalignedLength);
    }

    let full_elements = data.len() / cfg.bytes_per_field_element;
    for i in 0..full_elements {
        let start = i * cfg.bytes_per_field_element;
        if data[start] >= HIGH_BYTE_CEILING {
            return Some(RuleError::HighByteViolation { element_index: i });
        }
    }
    None
}

/// A zero commitment means "no commitment supplied" and the check is skipped.
pub fn commitment_rule(data: &[u8], commitment: &Commitment) -> Option<RuleError> {
    if commitment.is_zero() {
        return None;
    }
    if keccak256(data) == commitment.0 {
        None
    } else {
        Some(RuleError::CommitmentMismatch)
    }
}

/// A zero expiry means "no expiry supplied" and the check is skipped.
pub fn expiry_rule(current_slot: Slot, expiry: Slot) -> Option<RuleError> {
    if expiry.as_u64() == 0 {
        return None;
    }
    if current_slot.as_u64() > expiry.as_u64() {
        Some(RuleError::Expired)
    } else {
        None
    }
}
