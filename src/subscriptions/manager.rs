//! Polling subscription loops over room logs.

use crate::rooms::RoomRegistry;
use crate::types::Timestamp;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

use super::types::{DropReason, RoomEvent, SubscriberId, SubscriptionConfig, SubscriptionHandle};

/// Internal per-subscriber state held by the manager.
struct Subscription {
    /// Dropping this wakes the loop out of its sleep.
    cancel: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

type SubscriptionMap = Arc<RwLock<HashMap<SubscriberId, Subscription>>>;

/// Spawns and tracks one polling loop per subscriber.
///
/// Each loop sleeps for its configured interval, pulls the delta from
/// the room log since its watermark, and forwards it over a bounded
/// channel. Cancellation preempts the sleep, so unsubscribing never
/// waits out a poll interval.
pub struct SubscriptionManager {
    registry: Arc<RoomRegistry>,
    subscriptions: SubscriptionMap,
    next_id: AtomicU64,
}

impl SubscriptionManager {
    /// Create a manager polling rooms out of `registry`.
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start a polling subscription to `room`.
    ///
    /// The returned handle receives a `Joined` notice first, then every
    /// message visible since the configured watermark, batch by batch.
    pub fn subscribe(
        &self,
        room: impl Into<String>,
        config: SubscriptionConfig,
    ) -> SubscriptionHandle {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        // A zero buffer would drop every subscriber before the Joined
        // notice; keep at least one slot.
        let (events, receiver) = bounded(config.buffer_size.max(1));
        let (cancel, cancelled) = bounded(1);

        let worker = PollWorker {
            id,
            room: room.into(),
            registry: Arc::clone(&self.registry),
            subscriptions: Arc::clone(&self.subscriptions),
            config,
            events,
            cancelled,
        };

        // Register before spawning so the worker's self-removal always
        // finds its entry.
        self.subscriptions.write().insert(
            id,
            Subscription {
                cancel,
                thread: None,
            },
        );

        let thread = std::thread::spawn(move || worker.run());
        if let Some(sub) = self.subscriptions.write().get_mut(&id) {
            sub.thread = Some(thread);
        }

        debug!(subscriber = id.0, "subscribed");
        SubscriptionHandle { id, receiver }
    }

    /// Stop a subscription and wait for its loop to exit.
    ///
    /// Idempotent; unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let sub = self.subscriptions.write().remove(&id);
        if let Some(sub) = sub {
            Self::stop(sub);
            debug!(subscriber = id.0, "unsubscribed");
        }
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Cancel every subscription and wait for the loops to exit.
    pub fn shutdown(&self) {
        let subs: Vec<Subscription> = {
            let mut map = self.subscriptions.write();
            map.drain().map(|(_, sub)| sub).collect()
        };
        for sub in subs {
            Self::stop(sub);
        }
    }

    fn stop(mut sub: Subscription) {
        // Dropping the sender disconnects the worker's recv_timeout,
        // waking it mid-sleep.
        drop(sub.cancel);
        if let Some(thread) = sub.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The polling loop for a single subscriber.
struct PollWorker {
    id: SubscriberId,
    room: String,
    registry: Arc<RoomRegistry>,
    subscriptions: SubscriptionMap,
    config: SubscriptionConfig,
    events: Sender<RoomEvent>,
    cancelled: Receiver<()>,
}

impl PollWorker {
    fn run(self) {
        let reason = self.poll_loop();
        // Best effort: a full or disconnected buffer loses this too.
        let _ = self.events.try_send(RoomEvent::Dropped { reason });
        // Forget our entry; a no-op when unsubscribe/shutdown already
        // claimed it.
        self.subscriptions.write().remove(&self.id);
        debug!(subscriber = self.id.0, %reason, "poll loop ended");
    }

    /// Runs until cancelled or the subscriber stops keeping up.
    /// Returns the reason the loop ended.
    fn poll_loop(&self) -> DropReason {
        let mut watermark = self.config.since.unwrap_or_else(Timestamp::now);

        if let Err(reason) = self.emit(RoomEvent::Joined {
            room: self.room.clone(),
        }) {
            return reason;
        }

        loop {
            // The interval sleep doubles as the cancellation point: a
            // dropped sender wakes us immediately.
            match self.cancelled.recv_timeout(self.config.poll_interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    return DropReason::Unsubscribed;
                }
            }

            // Capture the next watermark before fetching, and emit only
            // messages older than it. Delivery then covers half-open
            // [watermark, now) windows: a message landing during the
            // fetch shows up in the next batch, and nothing is sent
            // twice.
            let now = Timestamp::now();
            let log = self.registry.get_or_create(&self.room);
            let batch = log.read_since(watermark);

            for message in batch {
                if message.created_at >= now {
                    continue;
                }
                if let Err(reason) = self.emit(RoomEvent::Message { message }) {
                    if reason == DropReason::BufferOverflow {
                        warn!(
                            subscriber = self.id.0,
                            room = %self.room,
                            "subscriber too slow, dropping"
                        );
                    }
                    return reason;
                }
            }

            watermark = now;
        }
    }

    fn emit(&self, event: RoomEvent) -> Result<(), DropReason> {
        match self.events.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DropReason::BufferOverflow),
            Err(TrySendError::Disconnected(_)) => Err(DropReason::Disconnected),
        }
    }
}
