#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    ZeroSlot,
    EmptyPeers,
    EmptyColumns,
}

impl std::fmt::Display for SamplingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroSlot => write!(f, "slot 0 cannot be sampled"),
            Self::EmptyPeers => write!(f, "no peers supplied for scheduling"),
            Self::EmptyColumns => write!(f, "no columns supplied for scheduling"),
        }
    }
}

impl std::error::Error for SamplingError {}
