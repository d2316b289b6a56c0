use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Bounded queue supporting both blocking-on-full and drop-oldest-on-full sends (§5: "bounded
/// FIFO channels with cancellation tokens"). `tokio::sync::mpsc` only supports the former —
/// its `Sender` cannot reach into the receiver's buffer to evict an item — so the teragas
/// pipeline's `DropOldest` policy needs this instead.
pub struct BoundedChannel<T> {
    queue: Mutex<VecDeque<T>>,
    capacity: usize,
    readable: Notify,
    writable: Notify,
    closed: AtomicBool,
}

impl<T> BoundedChannel<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            readable: Notify::new(),
            writable: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.readable.notify_waiters();
        self.writable.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes `item` immediately, evicting the oldest queued item first if full. Returns the
    /// evicted item, if any.
    pub fn send_drop_oldest(&self, item: T) -> Option<T> {
        let mut queue = self.queue.lock();
        let evicted = if queue.len() >= self.capacity {
            queue.pop_front()
        } else {
            None
        };
        queue.push_back(item);
        drop(queue);
        self.readable.notify_one();
        evicted
    }

    /// Waits for space, then pushes. Returns `Err(item)` if the channel closes or `cancel`
    /// fires before space becomes available.
    pub async fn send_block_on_full(&self, mut item: T, cancel: &CancellationToken) -> Result<(), T> {
        loop {
            {
                let mut queue = self.queue.lock();
                if self.is_closed() {
                    return Err(item);
                }
                if queue.len() < self.capacity {
                    queue.push_back(item);
                    drop(queue);
                    self.readable.notify_one();
                    return Ok(());
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(item),
                _ = self.writable.notified() => {}
            }
            // `item` never touched in the branch above; re-loop to retry the push.
            let _ = &mut item;
        }
    }

    /// Waits for an item, returning `None` once the channel is closed and drained.
    pub async fn recv(&self) -> Option<T> {
        loop {
            {
                let mut queue = self.queue.lock();
                if let Some(item) = queue.pop_front() {
                    drop(queue);
                    self.writable.notify_one();
                    return Some(item);
                }
                if self.is_closed() {
                    return None;
                }
            }
            self.readable.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recv_returns_items_in_fifo_order() {
        let channel = BoundedChannel::new(4);
        channel.send_drop_oldest(1);
        channel.send_drop_oldest(2);
        assert_eq!(channel.recv().await, Some(1));
        assert_eq!(channel.recv().await, Some(2));
    }

    #[tokio::test]
    async fn drop_oldest_evicts_the_front_item_when_full() {
        let channel = BoundedChannel::new(2);
        channel.send_drop_oldest(1);
        channel.send_drop_oldest(2);
        let evicted = channel.send_drop_oldest(3);
        assert_eq!(evicted, Some(1));
        assert_eq!(channel.recv().await, Some(2));
        assert_eq!(channel.recv().await, Some(3));
    }

    #[tokio::test]
    async fn recv_returns_none_once_closed_and_drained() {
        let channel: BoundedChannel<u32> = BoundedChannel::new(2);
        channel.send_drop_oldest(1);
        channel.close();
        assert_eq!(channel.recv().await, Some(1));
        assert_eq!(channel.recv().await, None);
    }

    #[tokio::test]
    async fn block_on_full_send_waits_for_space() {
        let channel = std::sync::Arc::new(BoundedChannel::new(1));
        channel.send_drop_oldest(1);
        let cancel = CancellationToken::new();
        let sender_channel = channel.clone();
        let sender_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            sender_channel.send_block_on_full(2, &sender_cancel).await
        });
        tokio::task::yield_now().await;
        assert_eq!(channel.recv().await, Some(1));
        assert_eq!(handle.await.unwrap(), Ok(()));
        assert_eq!(channel.recv().await, Some(2));
    }
}
