use crate::channel::BoundedChannel;
use crate::compression::{simple_compress, simple_decompress};
use crate::errors::TeragasError;
use crate::metrics;
use crate::packet::TpDataPacket;
use bandwidth::BandwidthEnforcer;
use std::sync::Arc;
use std::time::Instant;
use task_executor::TaskExecutor;

/// Outcome of running one stage over a packet (§4.12, step 1).
pub enum StageOutcome {
    /// Consume but emit nothing further downstream (e.g. reassembly waiting on more chunks).
    Consume,
    Emit(TpDataPacket),
    Err(TeragasError),
}

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, packet: TpDataPacket) -> StageOutcome;
}

pub struct BandwidthGateStage {
    enforcer: Arc<BandwidthEnforcer>,
}

impl BandwidthGateStage {
    pub fn new(enforcer: Arc<BandwidthEnforcer>) -> Self {
        Self { enforcer }
    }
}

impl Stage for BandwidthGateStage {
    fn name(&self) -> &'static str {
        "bandwidth_gate"
    }

    fn apply(&self, packet: TpDataPacket) -> StageOutcome {
        match self.enforcer.allocate(packet.chain_id, packet.data.len() as u64) {
            Ok(()) => StageOutcome::Emit(packet),
            Err(_) => StageOutcome::Err(TeragasError::BandwidthDenied),
        }
    }
}

pub struct CompressionStage;

impl Stage for CompressionStage {
    fn name(&self) -> &'static str {
        "compression"
    }

    fn apply(&self, mut packet: TpDataPacket) -> StageOutcome {
        let before = packet.data.len();
        let compressed = simple_compress(&packet.data);
        if compressed.len() < before {
            metrics::inc_counter_by(
                &metrics::TP_COMPRESSION_BYTES_SAVED_TOTAL,
                (before - compressed.len()) as u64,
            );
        }
        packet.data = compressed;
        packet.compressed = true;
        StageOutcome::Emit(packet)
    }
}

/// Inverse of `CompressionStage`, used on the ingest/decode side of the pipeline.
pub struct DecompressionStage;

impl Stage for DecompressionStage {
    fn name(&self) -> &'static str {
        "decompression"
    }

    fn apply(&self, mut packet: TpDataPacket) -> StageOutcome {
        if !packet.compressed {
            return StageOutcome::Emit(packet);
        }
        match simple_decompress(&packet.data) {
            Ok(data) => {
                packet.data = data;
                packet.compressed = false;
                StageOutcome::Emit(packet)
            }
            Err(err) => StageOutcome::Err(err),
        }
    }
}

pub struct ChunkingStage {
    max_chunk_size: usize,
}

impl ChunkingStage {
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }
}

impl Stage for ChunkingStage {
    fn name(&self) -> &'static str {
        "chunking"
    }

    fn apply(&self, mut packet: TpDataPacket) -> StageOutcome {
        if self.max_chunk_size > 0 && packet.data.len() > self.max_chunk_size {
            let total = packet.data.len().div_ceil(self.max_chunk_size);
            packet.is_chunked = true;
            packet.total_chunks = total as u32;
        } else {
            packet.is_chunked = false;
            packet.total_chunks = 1;
        }
        StageOutcome::Emit(packet)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackpressurePolicy {
    DropOldest,
    BlockOnFull,
}

/// Composable stage chain over `TpDataPacket`, defaulting to `BandwidthGate -> Compression ->
/// Chunking` (§4.12).
pub struct TeragasPipeline {
    stages: Vec<Box<dyn Stage>>,
    max_chunk_size: usize,
}

impl TeragasPipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>, max_chunk_size: usize) -> Self {
        Self { stages, max_chunk_size }
    }

    pub fn default_stages(enforcer: Arc<BandwidthEnforcer>, max_chunk_size: usize) -> Self {
        Self::new(
            vec![
                Box::new(BandwidthGateStage::new(enforcer)),
                Box::new(CompressionStage),
                Box::new(ChunkingStage::new(max_chunk_size)),
            ],
            max_chunk_size,
        )
    }

    /// Runs the full stage chain over one packet, then performs the post-stage chunk split
    /// (§4.12, step 2). Returns the packets to emit downstream; empty means fully consumed.
    pub fn process(&self, mut packet: TpDataPacket) -> Vec<TpDataPacket> {
        metrics::inc_counter(&metrics::TP_PACKETS_IN_TOTAL);
        metrics::inc_counter_by(&metrics::TP_BYTES_IN_TOTAL, packet.data.len() as u64);
        let start = Instant::now();

        for stage in &self.stages {
            match stage.apply(packet) {
                StageOutcome::Emit(next) => packet = next,
                StageOutcome::Consume => {
                    self.record_latency(start);
                    return Vec::new();
                }
                StageOutcome::Err(err) => {
                    metrics::inc_counter(&metrics::TP_STAGE_ERRORS_TOTAL);
                    metrics::inc_counter(&metrics::TP_DROPPED_TOTAL);
                    if err == TeragasError::BandwidthDenied {
                        metrics::inc_counter(&metrics::TP_BANDWIDTH_EVENTS_TOTAL);
                    }
                    self.record_latency(start);
                    return Vec::new();
                }
            }
        }

        let outputs = if packet.is_chunked && packet.total_chunks > 1 {
            self.split_into_chunks(packet)
        } else {
            vec![packet]
        };

        for out in &outputs {
            metrics::inc_counter(&metrics::TP_PACKETS_OUT_TOTAL);
            metrics::inc_counter_by(&metrics::TP_BYTES_OUT_TOTAL, out.data.len() as u64);
        }
        self.record_latency(start);
        outputs
    }

    fn split_into_chunks(&self, packet: TpDataPacket) -> Vec<TpDataPacket> {
        let total_chunks = packet.total_chunks;
        packet
            .data
            .chunks(self.max_chunk_size.max(1))
            .enumerate()
            .map(|(index, chunk)| TpDataPacket {
                chain_id: packet.chain_id,
                data: chunk.to_vec(),
                chunk_index: index as u32,
                total_chunks,
                is_chunked: true,
                compressed: packet.compressed,
                orig_size: packet.orig_size,
                timestamp_nanos: packet.timestamp_nanos,
            })
            .collect()
    }

    fn record_latency(&self, start: Instant) {
        metrics::inc_counter_by(&metrics::TP_LATENCY_MS_SUM, start.elapsed().as_millis() as u64);
        metrics::inc_counter(&metrics::TP_LATENCY_COUNT);
    }
}

/// Spawns a worker loop reading `input`, running `pipeline.process`, and forwarding emitted
/// packets to `output` according to `policy`.
pub fn spawn_worker(
    executor: &TaskExecutor,
    pipeline: Arc<TeragasPipeline>,
    input: Arc<BoundedChannel<TpDataPacket>>,
    output: Arc<BoundedChannel<TpDataPacket>>,
    policy: BackpressurePolicy,
) {
    let exit = executor.exit();
    executor.spawn(
        async move {
            loop {
                let packet = tokio::select! {
                    biased;
                    _ = exit.cancelled() => break,
                    packet = input.recv() => match packet {
                        Some(packet) => packet,
                        None => break,
                    },
                };

                for emitted in pipeline.process(packet) {
                    match policy {
                        BackpressurePolicy::BlockOnFull => {
                            if output.send_block_on_full(emitted, &exit).await.is_err() {
                                return;
                            }
                        }
                        BackpressurePolicy::DropOldest => {
                            if output.send_drop_oldest(emitted).is_some() {
                                metrics::inc_counter(&metrics::TP_DROPPED_TOTAL);
                            }
                        }
                    }
                }
            }
            output.close();
        },
        "teragas-pipeline-worker",
    );
}
