pub mod errors;
pub mod gossip_handler;
pub mod metrics;
pub mod router;
pub mod sampling_manager;

pub use errors::NetworkError;
pub use gossip_handler::{CellGossipHandler, CellOutcome, CellValidator, DefaultCellValidator};
pub use router::GossipRouter;
pub use sampling_manager::{
    CustodyDirectory, LocalColumnStore, PeerScoreSnapshot, SampleProvider, SamplingNetworkManager,
    SamplingRoundResult,
};
