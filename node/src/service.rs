use crate::config::Config;
use bandwidth::BandwidthEnforcer;
use beacon_processor::BeaconProcessor;
use custody::{CustodyContext, PeerDirectory};
use das_network::{CellGossipHandler, GossipRouter, SamplingNetworkManager};
use sampling::{SamplingScheduler, SlotSamplingTracker};
use slot_clock::{SlotClock, SystemTimeSlotClock};
use std::sync::Arc;
use std::time::Duration;
use task_executor::TaskExecutor;
use teragas::{
    BackpressurePolicy, BoundedChannel, ReassemblyStore, TeradataManager, TeragasPipeline,
    ThroughputManager, TpDataPacket,
};
use types::{DasSpec, Epoch, NodeId};
use validation::{BlobValidationConfig, BlobValidator};

/// Wires every subsystem crate into one running node, mirroring the teacher's top-level
/// `lighthouse` binary delegating to `ProductionBeaconNode`: this binary crate owns no protocol
/// logic itself, it only constructs and supervises the crates that do.
pub struct DasNodeService {
    pub spec: Arc<DasSpec>,
    pub node_id: NodeId,
    pub custody_context: Arc<CustodyContext>,
    pub peer_directory: Arc<PeerDirectory>,
    pub sampling_scheduler: Arc<SamplingScheduler>,
    pub slot_tracker: Arc<SlotSamplingTracker>,
    pub sampling_network: Arc<SamplingNetworkManager>,
    pub gossip_router: Arc<GossipRouter>,
    pub cell_gossip: Arc<CellGossipHandler>,
    pub beacon_processor: Arc<BeaconProcessor>,
    pub validator: Arc<BlobValidator>,
    pub throughput_manager: Arc<ThroughputManager>,
    pub teradata_manager: Arc<TeradataManager>,
    pub teragas_pipeline: Arc<TeragasPipeline>,
    pub reassembly: Arc<ReassemblyStore>,
    pub slot_clock: SystemTimeSlotClock,
    pub teragas_input: Arc<BoundedChannel<TpDataPacket>>,
    pub teragas_output: Arc<BoundedChannel<TpDataPacket>>,
    executor: TaskExecutor,
}

impl DasNodeService {
    pub fn new(config: &Config, executor: TaskExecutor) -> Result<Self, String> {
        let spec = config.das_spec();
        let node_id = config.node_id();

        let custody_context = Arc::new(CustodyContext::new(
            node_id,
            config.custody_group_count,
            spec.clone(),
        ));
        custody_context.initialize(Epoch::new(0));

        let peer_directory = Arc::new(PeerDirectory::new((*spec).clone()));

        let sampling_scheduler = Arc::new(SamplingScheduler::new(
            config.sampling_max_retries,
            Duration::from_millis(config.sampling_timeout_ms),
            config.sampling_failure_threshold,
        ));
        let slot_tracker = Arc::new(SlotSamplingTracker::new(config.tracked_slots));

        let sampling_network = Arc::new(SamplingNetworkManager::new(
            (*spec).clone(),
            0.5,
            0.01,
            1.0,
            1.0,
        ));
        let gossip_router = Arc::new(GossipRouter::new(config.gossip_prefix.clone(), spec.data_column_sidecar_subnet_count));
        let cell_gossip = Arc::new(CellGossipHandler::new((*spec).clone(), config.channel_capacity));

        let beacon_processor = Arc::new(BeaconProcessor::new(executor.clone()));

        let validator = Arc::new(BlobValidator::new(BlobValidationConfig {
            min_size: 1,
            max_size: spec.bytes_per_blob(),
            bytes_per_field_element: spec.bytes_per_field_element,
            strict_format: true,
        }));

        let throughput_manager = Arc::new(ThroughputManager::new(
            config.base_blob_limit,
            config.min_blob_limit,
            config.max_blob_limit,
            config.blob_limit_step,
            config.scale_up_threshold,
            config.scale_down_threshold,
            config.epochs_per_adjustment,
            spec.slots_per_epoch,
        ));

        let teradata_enforcer = BandwidthEnforcer::new(
            config.max_global_bps,
            config.per_chain_bps,
            config.max_chains,
            config.congestion_threshold,
            config.backpressure_threshold,
            config.congestion_multiplier,
        )
        .map_err(|e| format!("failed to build teradata bandwidth enforcer: {e}"))?;
        let teradata_manager = Arc::new(TeradataManager::new(teradata_enforcer));

        let pipeline_enforcer = Arc::new(
            BandwidthEnforcer::new(
                config.max_global_bps,
                config.per_chain_bps,
                config.max_chains,
                config.congestion_threshold,
                config.backpressure_threshold,
                config.congestion_multiplier,
            )
            .map_err(|e| format!("failed to build teragas pipeline bandwidth enforcer: {e}"))?,
        );
        let teragas_pipeline = Arc::new(TeragasPipeline::default_stages(
            pipeline_enforcer,
            config.max_chunk_size,
        ));
        let reassembly = Arc::new(ReassemblyStore::default());

        let teragas_input = Arc::new(BoundedChannel::new(config.channel_capacity));
        let teragas_output = Arc::new(BoundedChannel::new(config.channel_capacity));

        let genesis_duration = Duration::from_secs(0);
        let slot_clock = SystemTimeSlotClock::new(
            types::Slot::new(0),
            genesis_duration,
            Duration::from_secs(12),
        );

        Ok(Self {
            spec,
            node_id,
            custody_context,
            peer_directory,
            sampling_scheduler,
            slot_tracker,
            sampling_network,
            gossip_router,
            cell_gossip,
            beacon_processor,
            validator,
            throughput_manager,
            teradata_manager,
            teragas_pipeline,
            reassembly,
            slot_clock,
            teragas_input,
            teragas_output,
            executor,
        })
    }

    /// Spawns every long-running task on the shared executor: the teragas pipeline worker and
    /// the slot ticker that drives epoch-boundary custody rotation and throughput adjustment.
    pub fn spawn(self: &Arc<Self>) {
        teragas::spawn_worker(
            &self.executor,
            self.teragas_pipeline.clone(),
            self.teragas_input.clone(),
            self.teragas_output.clone(),
            BackpressurePolicy::BlockOnFull,
        );
        self.spawn_slot_ticker();
    }

    fn spawn_slot_ticker(self: &Arc<Self>) {
        let this = self.clone();
        let exit = self.executor.exit();
        self.executor.spawn(
            async move {
                let mut last_epoch = this
                    .slot_clock
                    .now()
                    .map(|slot| slot.epoch(this.spec.slots_per_epoch));
                loop {
                    let sleep_for = this
                        .slot_clock
                        .duration_to_next_slot()
                        .unwrap_or(Duration::from_secs(1));
                    tokio::select! {
                        biased;
                        _ = exit.cancelled() => break,
                        _ = tokio::time::sleep(sleep_for) => {}
                    }
                    let Some(slot) = this.slot_clock.now() else { continue };
                    let epoch = slot.epoch(this.spec.slots_per_epoch);
                    tracing::debug!(slot = slot.as_u64(), "slot tick");

                    if last_epoch != Some(epoch) {
                        let changed = this.custody_context.rotate_epoch(epoch);
                        tracing::info!(
                            epoch = epoch.as_u64(),
                            added = changed.added.len(),
                            dropped = changed.dropped.len(),
                            "rotated custody epoch"
                        );
                        last_epoch = Some(epoch);
                    }

                    if this.throughput_manager.adjust_limit() {
                        tracing::info!(
                            limit = this.throughput_manager.current_limit(),
                            "adjusted teragas throughput limit"
                        );
                    }

                    let pruned = this.teradata_manager.prune_old_data(slot);
                    if pruned > 0 {
                        tracing::debug!(pruned, "pruned stale teradata entries");
                    }
                }
            },
            "das-node-slot-ticker",
        );
    }
}
