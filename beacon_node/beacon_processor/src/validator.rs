use crate::errors::BeaconProcessorError;
use crate::metrics as proc_metrics;
use crate::rayon_manager::RayonManager;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use task_executor::TaskExecutor;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use types::{ColumnIndex, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Custody,
    Random,
}

impl Priority {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Custody => "custody",
            Self::Random => "random",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub slot: Slot,
    pub column: ColumnIndex,
    pub data: Vec<u8>,
    pub expected_root: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub slot: Slot,
    pub column: ColumnIndex,
    pub valid: bool,
}

struct QueuedItem {
    request: ValidationRequest,
    priority: Priority,
    submitted_at: Instant,
    responder: oneshot::Sender<Result<ValidationOutcome, BeaconProcessorError>>,
}

/// Async proof validator (§4.9): recomputes the column proof for each submitted item on a rayon
/// thread and compares it byte-exact against the caller's expected root. Custody-column items are
/// run on the default rayon pool; lower-priority random samples run on `RayonManager`'s dedicated
/// low-priority pool, so a flood of random samples never starves custody validation.
pub struct BeaconProcessor {
    exit: CancellationToken,
    custody_tx: mpsc::UnboundedSender<QueuedItem>,
    random_tx: mpsc::UnboundedSender<QueuedItem>,
    custody_depth: Arc<AtomicI64>,
    random_depth: Arc<AtomicI64>,
}

impl BeaconProcessor {
    pub fn new(executor: TaskExecutor) -> Self {
        let rayon = Arc::new(RayonManager::default());
        let exit = executor.exit();
        let (custody_tx, custody_rx) = mpsc::unbounded_channel();
        let (random_tx, random_rx) = mpsc::unbounded_channel();
        let custody_depth = Arc::new(AtomicI64::new(0));
        let random_depth = Arc::new(AtomicI64::new(0));

        executor.spawn(
            Self::run(rayon, exit.clone(), custody_rx, random_rx, custody_depth.clone(), random_depth.clone()),
            "beacon_processor_proof_validator",
        );

        Self {
            exit,
            custody_tx,
            random_tx,
            custody_depth,
            random_depth,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.exit.is_cancelled()
    }

    pub fn shutdown(&self) {
        self.exit.cancel();
    }

    pub async fn submit(
        &self,
        request: ValidationRequest,
        priority: Priority,
        timeout: Duration,
    ) -> Result<ValidationOutcome, BeaconProcessorError> {
        if self.exit.is_cancelled() {
            return Err(BeaconProcessorError::ValidatorStopped);
        }

        let label = priority.as_str();
        proc_metrics::inc_counter_vec(&proc_metrics::PROOF_VALIDATIONS_SUBMITTED_TOTAL, &[label]);

        let (responder, receiver) = oneshot::channel();
        let item = QueuedItem {
            request,
            priority,
            submitted_at: Instant::now(),
            responder,
        };

        let depth = match priority {
            Priority::Custody => &self.custody_depth,
            Priority::Random => &self.random_depth,
        };
        let new_depth = depth.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::set_gauge_vec(&proc_metrics::QUEUE_DEPTH, &[label], new_depth);

        let sent = match priority {
            Priority::Custody => self.custody_tx.send(item),
            Priority::Random => self.random_tx.send(item),
        };
        if sent.is_err() {
            return Err(BeaconProcessorError::ValidatorStopped);
        }

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BeaconProcessorError::ValidatorStopped),
            Err(_) => {
                proc_metrics::inc_counter_vec(&proc_metrics::PROOF_VALIDATIONS_TIMEOUT_TOTAL, &[label]);
                Err(BeaconProcessorError::Timeout)
            }
        }
    }

    async fn run(
        rayon: Arc<RayonManager>,
        exit: CancellationToken,
        mut custody_rx: mpsc::UnboundedReceiver<QueuedItem>,
        mut random_rx: mpsc::UnboundedReceiver<QueuedItem>,
        custody_depth: Arc<AtomicI64>,
        random_depth: Arc<AtomicI64>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = exit.cancelled() => {
                    Self::drain(&mut custody_rx, &custody_depth);
                    Self::drain(&mut random_rx, &random_depth);
                    break;
                }
                Some(item) = custody_rx.recv() => {
                    custody_depth.fetch_sub(1, Ordering::Relaxed);
                    metrics::set_gauge_vec(
                        &proc_metrics::QUEUE_DEPTH,
                        &["custody"],
                        custody_depth.load(Ordering::Relaxed).max(0),
                    );
                    Self::dispatch(&rayon, item);
                }
                Some(item) = random_rx.recv() => {
                    random_depth.fetch_sub(1, Ordering::Relaxed);
                    metrics::set_gauge_vec(
                        &proc_metrics::QUEUE_DEPTH,
                        &["random"],
                        random_depth.load(Ordering::Relaxed).max(0),
                    );
                    Self::dispatch(&rayon, item);
                }
                else => break,
            }
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<QueuedItem>, depth: &AtomicI64) {
        while let Ok(item) = rx.try_recv() {
            depth.fetch_sub(1, Ordering::Relaxed);
            let _ = item.responder.send(Err(BeaconProcessorError::ValidatorStopped));
        }
    }

    fn dispatch(rayon: &Arc<RayonManager>, item: QueuedItem) {
        match item.priority {
            Priority::Custody => rayon::spawn(move || Self::validate(item)),
            Priority::Random => rayon.low_priority_threadpool.spawn(move || Self::validate(item)),
        }
    }

    fn validate(item: QueuedItem) {
        let label = item.priority.as_str();
        let computed = das_crypto::column_proof(
            item.request.slot.as_u64(),
            item.request.column,
            &item.request.data,
        );
        let valid = computed == item.request.expected_root;

        if valid {
            proc_metrics::inc_counter_vec(&proc_metrics::PROOF_VALIDATIONS_SUCCEEDED_TOTAL, &[label]);
        } else {
            proc_metrics::inc_counter_vec(&proc_metrics::PROOF_VALIDATIONS_FAILED_TOTAL, &[label]);
        }
        let elapsed = item.submitted_at.elapsed().as_secs_f64();
        metrics::observe_vec(&proc_metrics::PROOF_VALIDATION_LATENCY, &[label], elapsed);

        let outcome = ValidationOutcome {
            slot: item.request.slot,
            column: item.request.column,
            valid,
        };
        let _ = item.responder.send(Ok(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use das_crypto::column_proof;

    fn request(slot: u64, column: ColumnIndex, data: &[u8]) -> ValidationRequest {
        ValidationRequest {
            slot: Slot::new(slot),
            column,
            data: data.to_vec(),
            expected_root: column_proof(slot, column, data),
        }
    }

    #[tokio::test]
    async fn valid_proof_is_accepted() {
        let executor = TaskExecutor::from_current();
        let processor = BeaconProcessor::new(executor);
        let req = request(1, 0, b"cell-bytes");
        let outcome = processor
            .submit(req, Priority::Custody, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(outcome.valid);
    }

    #[tokio::test]
    async fn mismatched_proof_is_rejected() {
        let executor = TaskExecutor::from_current();
        let processor = BeaconProcessor::new(executor);
        let mut req = request(1, 0, b"cell-bytes");
        req.expected_root = [0xAA; 32];
        let outcome = processor
            .submit(req, Priority::Random, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(!outcome.valid);
    }

    #[tokio::test]
    async fn shutdown_drains_pending_items_with_validator_stopped() {
        let executor = TaskExecutor::from_current();
        let processor = BeaconProcessor::new(executor);
        processor.shutdown();
        let req = request(1, 0, b"cell-bytes");
        let result = processor
            .submit(req, Priority::Custody, Duration::from_secs(1))
            .await;
        assert_eq!(result, Err(BeaconProcessorError::ValidatorStopped));
    }
}
