//! Blocking coordination for list keys.
//!
//! [`State`] keeps one FIFO queue of waiters per key. A blocking command registers a waiter
//! and suspends on the returned [`WaiterHandle`]; a push onto the key delivers a wake-up to
//! the oldest waiter only. All methods are meant to be called while holding the same lock as
//! the store, so checking a list and registering a waiter happen atomically.

use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub type ClientId = u64;
pub type WaiterId = u64;

#[derive(Debug)]
pub struct Waiter {
    pub id: WaiterId,
    pub client_id: ClientId,
    sender: oneshot::Sender<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Woken,
    TimedOut,
    Cancelled,
}

/// The suspended side of a registered waiter.
#[derive(Debug)]
pub struct WaiterHandle {
    pub id: WaiterId,
    pub client_id: ClientId,
    pub key: String,
    receiver: oneshot::Receiver<()>,
}

impl WaiterHandle {
    /// Suspends until a wake-up is delivered, the deadline passes, or `cancellation` fires.
    ///
    /// A `deadline` of `None` waits forever.
    pub async fn wait(
        &mut self,
        deadline: Option<Instant>,
        cancellation: &CancellationToken,
    ) -> WaitOutcome {
        let expiry = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            // A dropped sender counts as a spurious wake-up, the caller re-checks the list.
            _ = &mut self.receiver => WaitOutcome::Woken,
            _ = cancellation.cancelled() => WaitOutcome::Cancelled,
            _ = expiry => WaitOutcome::TimedOut,
        }
    }
}

#[derive(Debug, Default)]
pub struct State {
    waiters: HashMap<String, VecDeque<Waiter>>,
    next_waiter_id: WaiterId,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a waiter at the back of the queue for `key`.
    pub fn add_waiter(&mut self, key: &str, client_id: ClientId) -> WaiterHandle {
        self.next_waiter_id += 1;
        let id = self.next_waiter_id;
        let (waiter, handle) = Self::waiter_pair(id, key, client_id);

        self.waiters
            .entry(key.to_string())
            .or_default()
            .push_back(waiter);
        debug!(key, client_id, waiter_id = id, "waiter registered");

        handle
    }

    /// Puts a woken waiter that found nothing to pop back at the head of its queue,
    /// keeping its turn ahead of later arrivals.
    pub fn requeue_waiter(&mut self, handle: WaiterHandle) -> WaiterHandle {
        let (waiter, handle) = Self::waiter_pair(handle.id, &handle.key, handle.client_id);

        self.waiters
            .entry(handle.key.clone())
            .or_default()
            .push_front(waiter);
        debug!(key = %handle.key, waiter_id = handle.id, "waiter requeued");

        handle
    }

    fn waiter_pair(id: WaiterId, key: &str, client_id: ClientId) -> (Waiter, WaiterHandle) {
        let (sender, receiver) = oneshot::channel();

        (
            Waiter {
                id,
                client_id,
                sender,
            },
            WaiterHandle {
                id,
                client_id,
                key: key.to_string(),
                receiver,
            },
        )
    }

    /// Unregisters a waiter. Returns `false` when it was no longer queued, meaning a
    /// wake-up has already been delivered to it.
    pub fn remove_waiter(&mut self, key: &str, id: WaiterId) -> bool {
        let Some(queue) = self.waiters.get_mut(key) else {
            return false;
        };

        let Some(position) = queue.iter().position(|waiter| waiter.id == id) else {
            return false;
        };
        queue.remove(position);

        if queue.is_empty() {
            self.waiters.remove(key);
        }

        true
    }

    /// Wakes the oldest waiter on `key`, if any, and returns its id.
    ///
    /// Waiters whose receiving side is already gone are discarded and the next one is tried.
    pub fn notify_waiter(&mut self, key: &str) -> Option<WaiterId> {
        let queue = self.waiters.get_mut(key)?;
        let mut woken = None;

        while let Some(waiter) = queue.pop_front() {
            if waiter.sender.send(()).is_ok() {
                debug!(key, client_id = waiter.client_id, waiter_id = waiter.id, "waiter woken");
                woken = Some(waiter.id);
                break;
            }
        }

        if queue.is_empty() {
            self.waiters.remove(key);
        }

        woken
    }

    pub fn waiter_count(&self, key: &str) -> usize {
        self.waiters.get(key).map_or(0, VecDeque::len)
    }

    pub fn waiter_ids(&self, key: &str) -> Vec<WaiterId> {
        self.waiters
            .get(key)
            .map(|queue| queue.iter().map(|waiter| waiter.id).collect())
            .unwrap_or_default()
    }
}
