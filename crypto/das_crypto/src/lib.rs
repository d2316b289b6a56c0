pub mod hashing;
pub mod pqsigner;

pub use hashing::{
    cell_proof, column_proof, epoch_derived_node_id, hash_chain_sample, hash_chain_step,
    keccak256, l2_commitment, network_sampling_seed, sample_proof, sampling_seed,
};
pub use pqsigner::{
    blob_commitment_message, parse_signature_header, serialize_signature_header, DevSigner,
    PQSigner, PqAlgorithm, PqSignerError,
};
