//! Generic best-effort fan-out of events to independent subscribers
//!
//! Every subscriber owns a bounded queue. Publishing never waits: when a
//! subscriber's queue is full its copy of the event is dropped and everybody
//! else still receives theirs. The fan-out loop runs under the registry lock,
//! so each subscriber sees events in publish order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError, Weak};

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, trace};

use crate::config::defaults::DEFAULT_SUBSCRIBER_BUFFER;
use crate::observability::AppObservability;

/// Fan-out primitive for one event type
pub struct Broadcaster<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    registry: Mutex<Registry<T>>,
    buffer: usize,
    metrics: Option<(&'static str, AppObservability)>,
}

struct Registry<T> {
    next_id: u64,
    subscribers: HashMap<u64, mpsc::Sender<T>>,
    closed: bool,
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Broadcaster<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Broadcaster<T>
where
    T: Clone + Send + 'static,
{
    /// Broadcaster with the default per-subscriber buffer of 8
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_SUBSCRIBER_BUFFER)
    }

    pub fn with_buffer(buffer: usize) -> Self {
        Self::build(buffer, None)
    }

    /// Broadcaster that reports publish/drop counts under `stream`
    pub fn instrumented(
        buffer: usize,
        stream: &'static str,
        observability: AppObservability,
    ) -> Self {
        Self::build(buffer, Some((stream, observability)))
    }

    fn build(buffer: usize, metrics: Option<(&'static str, AppObservability)>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry {
                    next_id: 1,
                    subscribers: HashMap::new(),
                    closed: false,
                }),
                buffer: buffer.max(1),
                metrics,
            }),
        }
    }

    /// Register a new subscriber.
    ///
    /// Returns `None` once the broadcaster has been closed.
    pub fn subscribe(&self) -> Option<Subscription<T>> {
        let (sender, receiver) = mpsc::channel(self.inner.buffer);

        let id = {
            let mut registry = self.inner.lock();
            if registry.closed {
                return None;
            }
            let id = registry.next_id;
            registry.next_id += 1;
            registry.subscribers.insert(id, sender);
            id
        };

        if let Some((stream, observability)) = &self.inner.metrics {
            observability
                .event_subscribers
                .add(1, &[opentelemetry::KeyValue::new("stream", *stream)]);
        }
        trace!(subscription_id = id, "Subscriber registered");

        Some(Subscription {
            id,
            receiver,
            closer: SubscriptionCloser {
                id,
                once: Arc::new(Once::new()),
                inner: Arc::downgrade(&self.inner),
            },
        })
    }

    /// Deliver `event` to every registered subscriber without blocking.
    ///
    /// Returns how many subscribers received it. Subscribers with a full
    /// buffer miss this event. No-op once closed.
    pub fn broadcast(&self, event: T) -> usize {
        let mut delivered = 0;
        let mut dropped = 0u64;
        {
            let registry = self.inner.lock();
            if registry.closed || registry.subscribers.is_empty() {
                return 0;
            }
            for (id, sender) in &registry.subscribers {
                match sender.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        trace!(subscription_id = id, "Subscriber buffer full, event dropped");
                        dropped += 1;
                    }
                    Err(TrySendError::Closed(_)) => {}
                }
            }
        }

        if let Some((stream, observability)) = &self.inner.metrics {
            observability.record_broadcast(*stream, dropped);
        }
        delivered
    }

    /// Close every subscription and stop accepting new ones. Idempotent.
    pub fn close(&self) {
        let removed = {
            let mut registry = self.inner.lock();
            if registry.closed {
                return;
            }
            registry.closed = true;
            let removed = registry.subscribers.len();
            // Dropping the senders closes every subscriber channel
            registry.subscribers.clear();
            removed
        };

        if let Some((stream, observability)) = &self.inner.metrics {
            observability.event_subscribers.add(
                -(removed as i64),
                &[opentelemetry::KeyValue::new("stream", *stream)],
            );
        }
        debug!(subscribers = removed, "Broadcaster closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl<T> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unregister(&self, id: u64) {
        let removed = self.lock().subscribers.remove(&id).is_some();
        if removed {
            if let Some((stream, observability)) = &self.metrics {
                observability
                    .event_subscribers
                    .add(-1, &[opentelemetry::KeyValue::new("stream", *stream)]);
            }
            trace!(subscription_id = id, "Subscriber unregistered");
        }
    }
}

/// A registered subscriber's receiving end.
///
/// Dropping the subscription closes it, so registry entries never outlive
/// their consumer.
pub struct Subscription<T> {
    id: u64,
    receiver: mpsc::Receiver<T>,
    closer: SubscriptionCloser<T>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event in publish order, or `None` once the subscription or the
    /// broadcaster is closed and the buffer is drained
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Handle that can close this subscription from another task
    pub fn closer(&self) -> SubscriptionCloser<T> {
        self.closer.clone()
    }

    pub fn close(&self) {
        self.closer.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.closer.close();
    }
}

/// Cloneable close handle for a [`Subscription`].
///
/// The unregister-and-close sequence runs exactly once no matter how many
/// handles call [`close`](Self::close) or how concurrently.
pub struct SubscriptionCloser<T> {
    id: u64,
    once: Arc<Once>,
    inner: Weak<Inner<T>>,
}

impl<T> Clone for SubscriptionCloser<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            once: Arc::clone(&self.once),
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> SubscriptionCloser<T> {
    /// Unregister the subscription; its receiver then yields `None` after
    /// draining buffered events
    pub fn close(&self) {
        self.once.call_once(|| {
            if let Some(inner) = self.inner.upgrade() {
                inner.unregister(self.id);
            }
        });
    }

    pub fn is_closed(&self) -> bool {
        self.once.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_to_all_subscribers() {
        let broadcaster = Broadcaster::new();
        let mut a = broadcaster.subscribe().unwrap();
        let mut b = broadcaster.subscribe().unwrap();
        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());

        assert_eq!(broadcaster.broadcast(1u32), 2);
        assert_eq!(broadcaster.broadcast(2u32), 2);

        assert_eq!(a.recv().await, Some(1));
        assert_eq!(a.recv().await, Some(2));
        assert_eq!(b.recv().await, Some(1));
        assert_eq!(b.recv().await, Some(2));
    }

    #[test]
    fn test_broadcast_without_subscribers_is_noop() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        assert_eq!(broadcaster.broadcast(7), 0);
    }

    #[tokio::test]
    async fn test_dropping_subscription_unregisters() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        let sub = broadcaster.subscribe().unwrap();
        assert_eq!(broadcaster.subscriber_count(), 1);
        drop(sub);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_buffer_is_clamped() {
        let broadcaster = Broadcaster::with_buffer(0);
        let mut sub = broadcaster.subscribe().unwrap();
        assert_eq!(broadcaster.broadcast("x"), 1);
        assert_eq!(broadcaster.broadcast("y"), 0);
        assert_eq!(sub.try_recv(), Ok("x"));
    }

    #[tokio::test]
    async fn test_closer_outlives_broadcaster() {
        let broadcaster: Broadcaster<u32> = Broadcaster::new();
        let mut sub = broadcaster.subscribe().unwrap();
        let closer = sub.closer();
        drop(broadcaster);

        closer.close();
        assert!(closer.is_closed());
        assert_eq!(sub.recv().await, None);
    }
}
