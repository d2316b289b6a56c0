pub mod blob;
pub mod collector;
pub mod errors;
pub mod fr;
pub mod metrics;
pub mod pipeline;
pub mod poly;
pub mod scheduler;

pub use blob::{cell_to_field_elements, field_elements_to_bytes, reconstruct_blob, recover_cells_and_proofs};
pub use collector::{BlobState, CellCollector, Priority};
pub use errors::ReconstructionError;
pub use fr::Fr;
pub use pipeline::{reconstruct, reconstruct_with_proofs};
pub use poly::{evaluate_polynomial, fft, inverse_fft, reconstruct_polynomial};
pub use scheduler::{schedule, ScheduleEntry};
