use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    NotStarted,
    NoPeersForColumn(u64),
    NoProviderAvailable(u64),
    Closed,
    EmptyColumnOrPeerList,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::NotStarted => write!(f, "sampling network manager is not started"),
            NetworkError::NoPeersForColumn(c) => write!(f, "no peers custody column {c}"),
            NetworkError::NoProviderAvailable(c) => {
                write!(f, "no peer or local store could serve column {c}")
            }
            NetworkError::Closed => write!(f, "handler is closed"),
            NetworkError::EmptyColumnOrPeerList => write!(f, "empty column list or peer list"),
        }
    }
}

impl std::error::Error for NetworkError {}
