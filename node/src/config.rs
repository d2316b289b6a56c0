use std::path::PathBuf;
use std::sync::Arc;
use types::{DasSpec, NodeId};

/// CLI options for the `das-node` binary, grounded on the teacher's `lighthouse` top-level
/// binary: a single flat `clap::Parser` struct that gets turned into the config every subsystem
/// is constructed from, rather than per-subsystem argument groups.
#[derive(clap::Parser, Debug, Clone)]
#[command(name = "das-node", about = "PeerDAS + teragas data-availability sampling node")]
pub struct Config {
    /// Use the scaled-down `DasSpec::minimal()` parameters instead of mainnet.
    #[arg(long)]
    pub minimal_spec: bool,

    /// This node's 32-byte identity, as hex. A random identity is generated if omitted.
    #[arg(long)]
    pub node_id: Option<String>,

    /// Number of custody groups this node commits to (clamped to `[CustodyRequirement,
    /// NumberOfCustodyGroups]`).
    #[arg(long, default_value_t = 4)]
    pub custody_group_count: u64,

    /// Gossip topic prefix handed to `GossipRouter`.
    #[arg(long, default_value = "das")]
    pub gossip_prefix: String,

    /// Directory for log files and other node state.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value_t = true)]
    pub log_color: bool,

    #[arg(long)]
    pub json_stdout: bool,

    #[arg(long, default_value_t = 200)]
    pub max_log_size_mb: u64,

    #[arg(long, default_value_t = 5)]
    pub max_log_number: usize,

    /// Bandwidth enforcer: aggregate bytes/sec budget shared by all L2 chains.
    #[arg(long, default_value_t = 50_000_000.0)]
    pub max_global_bps: f64,

    /// Bandwidth enforcer: per-chain bytes/sec budget.
    #[arg(long, default_value_t = 5_000_000.0)]
    pub per_chain_bps: f64,

    #[arg(long, default_value_t = 64)]
    pub max_chains: usize,

    #[arg(long, default_value_t = 0.8)]
    pub congestion_threshold: f64,

    #[arg(long, default_value_t = 0.97)]
    pub backpressure_threshold: f64,

    #[arg(long, default_value_t = 2.0)]
    pub congestion_multiplier: f64,

    /// Throughput manager: starting/min/max blobs-per-block and the AIMD step size.
    #[arg(long, default_value_t = 6)]
    pub base_blob_limit: u64,
    #[arg(long, default_value_t = 3)]
    pub min_blob_limit: u64,
    #[arg(long, default_value_t = 32)]
    pub max_blob_limit: u64,
    #[arg(long, default_value_t = 2)]
    pub blob_limit_step: u64,
    #[arg(long, default_value_t = 0.80)]
    pub scale_up_threshold: f64,
    #[arg(long, default_value_t = 0.20)]
    pub scale_down_threshold: f64,
    #[arg(long, default_value_t = 1)]
    pub epochs_per_adjustment: u64,

    /// Teragas pipeline: max bytes per chunked fragment, and the bounded channel depth between
    /// pipeline workers.
    #[arg(long, default_value_t = 262_144)]
    pub max_chunk_size: usize,
    #[arg(long, default_value_t = 1024)]
    pub channel_capacity: usize,

    /// Sampling scheduler retry policy (§4.10).
    #[arg(long, default_value_t = 3)]
    pub sampling_max_retries: u32,
    #[arg(long, default_value_t = 2_000)]
    pub sampling_timeout_ms: u64,
    #[arg(long, default_value_t = 0.1)]
    pub sampling_failure_threshold: f64,

    /// Number of trailing slots `SlotSamplingTracker` retains availability state for.
    #[arg(long, default_value_t = 64)]
    pub tracked_slots: u64,
}

impl Config {
    pub fn das_spec(&self) -> Arc<DasSpec> {
        Arc::new(if self.minimal_spec {
            DasSpec::minimal()
        } else {
            DasSpec::mainnet()
        })
    }

    /// Parses `--node-id`, falling back to a randomly generated identity.
    pub fn node_id(&self) -> NodeId {
        match &self.node_id {
            Some(hex_str) => {
                let bytes = hex::decode(hex_str.trim_start_matches("0x"))
                    .ok()
                    .filter(|b| b.len() == 32);
                match bytes {
                    Some(b) => {
                        let mut arr = [0u8; 32];
                        arr.copy_from_slice(&b);
                        NodeId::new(arr)
                    }
                    None => {
                        tracing::warn!("invalid --node-id, generating a random identity instead");
                        random_node_id()
                    }
                }
            }
            None => random_node_id(),
        }
    }

    pub fn logging_config(&self) -> logging::LoggingConfig {
        logging::LoggingConfig {
            log_color: self.log_color,
            json_stdout: self.json_stdout,
            extra_info: false,
            log_file_path: self.log_file.clone(),
            max_log_size_mb: self.max_log_size_mb,
            max_log_number: self.max_log_number,
            log_file_compression: false,
        }
    }
}

fn random_node_id() -> NodeId {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    NodeId::new(bytes)
}
