pub mod channel;
pub mod compression;
pub mod errors;
pub mod metrics;
pub mod packet;
pub mod reassembly;
pub mod streaming_pipeline;
pub mod teradata_manager;
pub mod teragas_pipeline;
pub mod throughput_manager;

pub use channel::BoundedChannel;
pub use compression::{simple_compress, simple_decompress};
pub use errors::TeragasError;
pub use packet::TpDataPacket;
pub use reassembly::ReassemblyStore;
pub use streaming_pipeline::{
    DecodeFn, PipelineItem, StoreFn, StreamingPipeline, StreamingPipelineBuilder, ValidateFn,
};
pub use teradata_manager::{StoreReceipt, TeradataManager};
pub use teragas_pipeline::{
    spawn_worker, BackpressurePolicy, BandwidthGateStage, ChunkingStage, CompressionStage,
    DecompressionStage, Stage, StageOutcome, TeragasPipeline,
};
pub use throughput_manager::ThroughputManager;
