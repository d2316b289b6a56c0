use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructionError {
    LengthMismatch,
    InsufficientPoints,
    DuplicateEvaluationPoint,
    NotPowerOfTwo,
    UnalignedCellLength,
    HighByteViolation,
    UnknownBlob,
    NoCells,
    InsufficientCells,
    OutputSizeMismatch,
    DuplicateCell,
}

impl fmt::Display for ReconstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconstructionError::LengthMismatch => write!(f, "xs and ys have different lengths"),
            ReconstructionError::InsufficientPoints => write!(f, "fewer points than the requested degree"),
            ReconstructionError::DuplicateEvaluationPoint => write!(f, "duplicate evaluation point"),
            ReconstructionError::NotPowerOfTwo => write!(f, "length is not a power of two"),
            ReconstructionError::UnalignedCellLength => write!(f, "cell length is not a multiple of the field element size"),
            ReconstructionError::HighByteViolation => write!(f, "field element high byte exceeds the modulus ceiling"),
            ReconstructionError::UnknownBlob => write!(f, "no collector state for this (slot, blob)"),
            ReconstructionError::NoCells => write!(f, "no cells collected for this blob"),
            ReconstructionError::InsufficientCells => write!(f, "fewer cells collected than the reconstruction threshold"),
            ReconstructionError::OutputSizeMismatch => write!(f, "reconstructed output size did not match the expected blob size"),
            ReconstructionError::DuplicateCell => write!(f, "cell index already collected for this blob"),
        }
    }
}

impl std::error::Error for ReconstructionError {}
