#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconProcessorError {
    ValidatorStopped,
    Timeout,
}

impl std::fmt::Display for BeaconProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidatorStopped => write!(f, "validator has been shut down"),
            Self::Timeout => write!(f, "proof validation timed out"),
        }
    }
}

impl std::error::Error for BeaconProcessorError {}
