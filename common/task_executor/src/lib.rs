use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wraps a `tokio::runtime::Handle` with a shared shutdown signal, mirroring the teacher's
/// `task_executor` crate. Every long-running worker pool in this workspace (the proof
/// validator, the teragas pipeline stages) is handed a `TaskExecutor` rather than spawning
/// directly against a runtime, so a single `shutdown()` call cascades everywhere.
#[derive(Clone)]
pub struct TaskExecutor {
    handle: Handle,
    exit: CancellationToken,
}

impl TaskExecutor {
    pub fn new(handle: Handle, exit: CancellationToken) -> Self {
        Self { handle, exit }
    }

    /// Builds a `TaskExecutor` from the currently running runtime, with a fresh cancellation
    /// token. Panics outside of a tokio runtime context, matching `Handle::current`.
    pub fn from_current() -> Self {
        Self {
            handle: Handle::current(),
            exit: CancellationToken::new(),
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// A clone of the cancellation token; `.cancelled()` resolves once `shutdown()` is called.
    pub fn exit(&self) -> CancellationToken {
        self.exit.clone()
    }

    pub fn is_shutdown(&self) -> bool {
        self.exit.is_cancelled()
    }

    /// Signals every task holding a clone of this executor's cancellation token to wind down.
    pub fn shutdown(&self) {
        self.exit.cancel();
    }

    /// Spawns a future, logging (rather than panicking) if the runtime has already shut down.
    pub fn spawn(&self, future: impl Future<Output = ()> + Send + 'static, name: &'static str) {
        if self.exit.is_cancelled() {
            tracing::debug!(task = name, "not spawning task, executor is shutting down");
            return;
        }
        self.handle.spawn(future);
    }

    /// Spawns a future and returns a join handle for awaiting its result.
    pub fn spawn_handle<R: Send + 'static>(
        &self,
        future: impl Future<Output = R> + Send + 'static,
        name: &'static str,
    ) -> Option<JoinHandle<R>> {
        if self.exit.is_cancelled() {
            tracing::debug!(task = name, "not spawning task, executor is shutting down");
            return None;
        }
        Some(self.handle.spawn(future))
    }

    /// Offloads a blocking closure to the runtime's blocking thread pool. Used for CPU-bound
    /// work (field-element arithmetic, FFTs) that would otherwise stall the async executor.
    pub fn spawn_blocking_handle<F, R>(&self, f: F, name: &'static str) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let _ = name;
        self.handle.spawn_blocking(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawned_task_runs() {
        let executor = TaskExecutor::new(Handle::current(), CancellationToken::new());
        let handle = executor
            .spawn_handle(async { 1 + 1 }, "test-task")
            .expect("executor not shut down");
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn shutdown_prevents_further_spawns() {
        let executor = TaskExecutor::new(Handle::current(), CancellationToken::new());
        executor.shutdown();
        assert!(executor.is_shutdown());
        assert!(executor.spawn_handle(async {}, "test-task").is_none());
    }

    #[tokio::test]
    async fn exit_token_is_shared_across_clones() {
        let executor = TaskExecutor::new(Handle::current(), CancellationToken::new());
        let clone = executor.clone();
        executor.shutdown();
        assert!(clone.is_shutdown());
    }

    #[tokio::test]
    async fn spawn_blocking_offloads_work() {
        let executor = TaskExecutor::new(Handle::current(), CancellationToken::new());
        let handle = executor.spawn_blocking_handle(|| 40 + 2, "blocking-test");
        assert_eq!(handle.await.unwrap(), 42);
    }
}
