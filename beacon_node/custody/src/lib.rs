pub mod custody_context;
pub mod errors;
pub mod peer_directory;

pub use custody_context::{compute_custody_columns, CustodyContext, CustodyCountChanged};
pub use errors::CustodyError;
pub use peer_directory::PeerDirectory;
