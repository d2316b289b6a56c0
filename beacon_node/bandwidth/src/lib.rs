pub mod aimd;
pub mod controller;
pub mod enforcer;
pub mod errors;
pub mod token_bucket;

pub use aimd::AimdLimiter;
pub use controller::{compute_optimal_chunk_size, BandwidthController, ThroughputStats};
pub use enforcer::{BandwidthEnforcer, ChainId};
pub use errors::BandwidthError;
pub use token_bucket::TokenBucket;
