#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    NoPeersForColumn(u64),
    MissingCustodyColumn(u64),
    InvalidGroupCount { requested: u64, min: u64, max: u64 },
}

impl std::fmt::Display for CustodyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPeersForColumn(c) => write!(f, "no peers custody column {c}"),
            Self::MissingCustodyColumn(c) => write!(f, "column {c} is not in local custody assignment"),
            Self::InvalidGroupCount { requested, min, max } => write!(
                f,
                "requested group count {requested} outside of allowed range [{min}, {max}]"
            ),
        }
    }
}

impl std::error::Error for CustodyError {}
