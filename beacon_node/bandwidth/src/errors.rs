#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandwidthError {
    /// Constructor rejected a non-positive rate/capacity, or `min_rate > max_rate`.
    ZeroRate,
    /// Requested allocation size fell outside `[MinAllocationSize, MaxAllocationSize]`.
    PolicyViolation,
    InsufficientBandwidth,
    /// Global utilization at or above the backpressure threshold.
    Backpressure,
    MaxChainsReached,
    Stopped,
}

impl std::fmt::Display for BandwidthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroRate => write!(f, "rate and capacity must be positive and min_rate <= max_rate"),
            Self::PolicyViolation => write!(f, "allocation size outside the configured policy bounds"),
            Self::InsufficientBandwidth => write!(f, "insufficient bandwidth available"),
            Self::Backpressure => write!(f, "global utilization exceeds the backpressure threshold"),
            Self::MaxChainsReached => write!(f, "maximum number of tracked chains reached"),
            Self::Stopped => write!(f, "bandwidth controller has been stopped"),
        }
    }
}

impl std::error::Error for BandwidthError {}
