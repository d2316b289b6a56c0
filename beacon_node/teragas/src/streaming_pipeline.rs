use crate::channel::BoundedChannel;
use crate::metrics;
use das_crypto::keccak256;
use std::sync::Arc;
use task_executor::TaskExecutor;

/// Item flowing through the four-stage streaming pipeline (§4.11).
#[derive(Debug, Clone)]
pub struct PipelineItem {
    pub id: [u8; 32],
    pub raw_data: Vec<u8>,
    pub chain_id: u64,
    pub valid: bool,
    pub decoded_data: Vec<u8>,
    pub stored: bool,
    pub error: Option<String>,
    pub retries: u32,
    pub timestamp: u64,
}

impl PipelineItem {
    pub fn submission(raw_data: Vec<u8>, chain_id: u64, timestamp: u64) -> Self {
        Self {
            id: [0u8; 32],
            raw_data,
            chain_id,
            valid: false,
            decoded_data: Vec::new(),
            stored: false,
            error: None,
            retries: 0,
            timestamp,
        }
    }
}

pub type ValidateFn = Arc<dyn Fn(&PipelineItem) -> bool + Send + Sync>;
pub type DecodeFn = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, String> + Send + Sync>;
pub type StoreFn = Arc<dyn Fn(&PipelineItem) -> Result<(), String> + Send + Sync>;

fn default_validate() -> ValidateFn {
    Arc::new(|item: &PipelineItem| !item.raw_data.is_empty())
}

fn default_decode() -> DecodeFn {
    Arc::new(|raw: &[u8]| Ok(raw.to_vec()))
}

fn default_store() -> StoreFn {
    Arc::new(|_item: &PipelineItem| Ok(()))
}

/// Applies the shared retry policy (§4.11): on failure with retries remaining, the item is
/// attached with an error and forwarded in-line; once retries are exhausted the item is dropped.
fn apply_retry(item: &mut PipelineItem, max_retries: u32, result: Result<(), String>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            item.error = Some(err);
            if item.retries < max_retries {
                item.retries += 1;
                true
            } else {
                metrics::inc_counter(&metrics::STREAM_DROPPED_TOTAL);
                false
            }
        }
    }
}

/// Four bounded-channel stages (Receive -> Validate -> Decode -> Store), each its own worker
/// pool, cascading shutdown once its input drains.
pub struct StreamingPipeline {
    validate_fn: ValidateFn,
    decode_fn: DecodeFn,
    store_fn: StoreFn,
    max_retries: u32,
    receive: Arc<BoundedChannel<PipelineItem>>,
    validate: Arc<BoundedChannel<PipelineItem>>,
    decode: Arc<BoundedChannel<PipelineItem>>,
    store: Arc<BoundedChannel<PipelineItem>>,
    results: Arc<BoundedChannel<PipelineItem>>,
}

pub struct StreamingPipelineBuilder {
    validate_fn: Option<ValidateFn>,
    decode_fn: Option<DecodeFn>,
    store_fn: Option<StoreFn>,
    max_retries: u32,
    channel_capacity: usize,
}

impl Default for StreamingPipelineBuilder {
    fn default() -> Self {
        Self {
            validate_fn: None,
            decode_fn: None,
            store_fn: None,
            max_retries: 3,
            channel_capacity: 256,
        }
    }
}

impl StreamingPipelineBuilder {
    pub fn validate_fn(mut self, f: ValidateFn) -> Self {
        self.validate_fn = Some(f);
        self
    }

    pub fn decode_fn(mut self, f: DecodeFn) -> Self {
        self.decode_fn = Some(f);
        self
    }

    pub fn store_fn(mut self, f: StoreFn) -> Self {
        self.store_fn = Some(f);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> StreamingPipeline {
        StreamingPipeline {
            validate_fn: self.validate_fn.unwrap_or_else(default_validate),
            decode_fn: self.decode_fn.unwrap_or_else(default_decode),
            store_fn: self.store_fn.unwrap_or_else(default_store),
            max_retries: self.max_retries,
            receive: Arc::new(BoundedChannel::new(self.channel_capacity)),
            validate: Arc::new(BoundedChannel::new(self.channel_capacity)),
            decode: Arc::new(BoundedChannel::new(self.channel_capacity)),
            store: Arc::new(BoundedChannel::new(self.channel_capacity)),
            results: Arc::new(BoundedChannel::new(self.channel_capacity)),
        }
    }
}

impl StreamingPipeline {
    pub fn builder() -> StreamingPipelineBuilder {
        StreamingPipelineBuilder::default()
    }

    /// Submits a raw item for processing. Blocks (asynchronously) if the receive stage is full.
    pub async fn submit(&self, item: PipelineItem) -> Result<(), PipelineItem> {
        self.receive
            .send_block_on_full(item, &tokio_util::sync::CancellationToken::new())
            .await
    }

    pub fn results(&self) -> Arc<BoundedChannel<PipelineItem>> {
        self.results.clone()
    }

    /// Closes the receive stage; each stage cascades the close to the next once it drains.
    pub fn close_input(&self) {
        self.receive.close();
    }

    pub fn spawn_workers(self: &Arc<Self>, executor: &TaskExecutor) {
        self.spawn_receive(executor);
        self.spawn_validate(executor);
        self.spawn_decode(executor);
        self.spawn_store(executor);
    }

    fn spawn_receive(self: &Arc<Self>, executor: &TaskExecutor) {
        let this = self.clone();
        let exit = executor.exit();
        executor.spawn(
            async move {
                loop {
                    let mut item = tokio::select! {
                        biased;
                        _ = exit.cancelled() => break,
                        item = this.receive.recv() => match item {
                            Some(item) => item,
                            None => break,
                        },
                    };
                    if item.id == [0u8; 32] {
                        item.id = keccak256(&item.raw_data);
                    }
                    metrics::inc_counter(&metrics::STREAM_RECEIVED_TOTAL);
                    metrics::inc_counter_by(&metrics::STREAM_BYTES_PROCESSED_TOTAL, item.raw_data.len() as u64);
                    if this.validate.send_block_on_full(item, &exit).await.is_err() {
                        break;
                    }
                }
                this.validate.close();
            },
            "streaming-receive",
        );
    }

    fn spawn_validate(self: &Arc<Self>, executor: &TaskExecutor) {
        let this = self.clone();
        let exit = executor.exit();
        executor.spawn(
            async move {
                loop {
                    let mut item = tokio::select! {
                        biased;
                        _ = exit.cancelled() => break,
                        item = this.validate.recv() => match item {
                            Some(item) => item,
                            None => break,
                        },
                    };
                    let ok = (this.validate_fn)(&item);
                    item.valid = ok;
                    let result = if ok { Ok(()) } else { Err("validation rejected item".to_string()) };
                    if apply_retry(&mut item, this.max_retries, result) {
                        if item.valid {
                            metrics::inc_counter(&metrics::STREAM_VALIDATED_TOTAL);
                        }
                        if this.decode.send_block_on_full(item, &exit).await.is_err() {
                            break;
                        }
                    }
                }
                this.decode.close();
            },
            "streaming-validate",
        );
    }

    fn spawn_decode(self: &Arc<Self>, executor: &TaskExecutor) {
        let this = self.clone();
        let exit = executor.exit();
        executor.spawn(
            async move {
                loop {
                    let mut item = tokio::select! {
                        biased;
                        _ = exit.cancelled() => break,
                        item = this.decode.recv() => match item {
                            Some(item) => item,
                            None => break,
                        },
                    };
                    let result = match (this.decode_fn)(&item.raw_data) {
                        Ok(decoded) => {
                            item.decoded_data = decoded;
                            Ok(())
                        }
                        Err(err) => Err(err),
                    };
                    let succeeded = result.is_ok();
                    if apply_retry(&mut item, this.max_retries, result) {
                        if succeeded {
                            metrics::inc_counter(&metrics::STREAM_DECODED_TOTAL);
                        }
                        if this.store.send_block_on_full(item, &exit).await.is_err() {
                            break;
                        }
                    }
                }
                this.store.close();
            },
            "streaming-decode",
        );
    }

    fn spawn_store(self: &Arc<Self>, executor: &TaskExecutor) {
        let this = self.clone();
        let exit = executor.exit();
        executor.spawn(
            async move {
                loop {
                    let mut item = tokio::select! {
                        biased;
                        _ = exit.cancelled() => break,
                        item = this.store.recv() => match item {
                            Some(item) => item,
                            None => break,
                        },
                    };
                    let result = (this.store_fn)(&item);
                    let succeeded = result.is_ok();
                    if succeeded {
                        item.stored = true;
                    }
                    if apply_retry(&mut item, this.max_retries, result) {
                        if succeeded {
                            metrics::inc_counter(&metrics::STREAM_STORED_TOTAL);
                        }
                        if this.results.send_block_on_full(item, &exit).await.is_err() {
                            break;
                        }
                    }
                }
                this.results.close();
            },
            "streaming-store",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn ten_default_items_flow_through_fully_stored() {
        let executor = task_executor::TaskExecutor::new(tokio::runtime::Handle::current(), CancellationToken::new());
        let pipeline = Arc::new(StreamingPipeline::builder().build());
        pipeline.spawn_workers(&executor);

        for _ in 0..10 {
            pipeline.submit(PipelineItem::submission(vec![7u8; 1024], 1, 0)).await.unwrap();
        }
        pipeline.close_input();

        let results = pipeline.results();
        let mut received = Vec::new();
        while let Some(item) = results.recv().await {
            received.push(item);
        }

        assert_eq!(received.len(), 10);
        for item in &received {
            assert!(item.valid);
            assert!(item.stored);
            assert!(item.error.is_none());
        }
        let total_bytes: usize = received.iter().map(|i| i.raw_data.len()).sum();
        assert_eq!(total_bytes, 10_240);
    }

    #[tokio::test]
    async fn empty_items_fail_default_validation_and_are_dropped_with_no_retries_configured() {
        let executor = task_executor::TaskExecutor::new(tokio::runtime::Handle::current(), CancellationToken::new());
        let pipeline = Arc::new(StreamingPipeline::builder().max_retries(0).build());
        pipeline.spawn_workers(&executor);

        pipeline.submit(PipelineItem::submission(Vec::new(), 1, 0)).await.unwrap();
        pipeline.close_input();

        let results = pipeline.results();
        assert!(results.recv().await.is_none());
    }
}
