//! Update Broadcaster
//!
//! Keeps one bounded channel per live subscriber and fans every queue event
//! out to them.
//!
//! # Design
//!
//! - The subscriber set sits behind a mutex. Publishing copies the matching
//!   senders under that lock and delivers after releasing it.
//! - Delivery is `try_send`: a subscriber whose buffer is full or whose
//!   receiver is gone is removed instead of slowing anyone down. Its stream
//!   ends and the client reconnects for a fresh snapshot.
//! - A second mutex around the sequence counter serializes publishes, so all
//!   subscribers observe one global order.
//! - Dropping a `Subscription` unsubscribes it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use super::events::{EventKinds, QueueEvent, QueueMessage};
use crate::store::TicketStore;
use crate::types::{QueueResult, Ticket};

/// Identifier handed to each subscriber
pub type SubscriberId = u64;

/// Default per-subscriber buffer
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

struct Subscriber {
    kinds: EventKinds,
    tx: mpsc::Sender<QueueMessage>,
}

struct Shared {
    subscribers: Mutex<HashMap<SubscriberId, Subscriber>>,
    /// Next sequence id; held for the whole publish to fix the global order
    sequence: Mutex<u64>,
    next_subscriber: AtomicU64,
    buffer: usize,
}

impl Shared {
    fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.lock().remove(&id).is_some();
        if removed {
            debug!(subscriber = id, "Subscriber removed");
        }
        removed
    }
}

/// Full ticket list taken when a subscriber joined
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tickets: Vec<Ticket>,
    /// Events from this sequence id on are delivered to the new subscription
    #[serde(rename = "sequenceId")]
    pub sequence_id: u64,
}

/// Process-wide fan-out of queue events
///
/// Create one at startup and hand clones to whoever publishes or subscribes;
/// clones share the same subscriber set. Call `shutdown` on teardown to end
/// every open stream.
#[derive(Clone)]
pub struct Broadcaster {
    shared: Arc<Shared>,
}

impl Broadcaster {
    /// Create a broadcaster whose subscribers buffer up to `buffer` events
    pub fn new(buffer: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                subscribers: Mutex::new(HashMap::new()),
                sequence: Mutex::new(0),
                next_subscriber: AtomicU64::new(1),
                buffer: buffer.max(1),
            }),
        }
    }

    /// Register a new subscriber for `kinds`
    pub fn subscribe(&self, kinds: EventKinds) -> Subscription {
        let id = self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.shared.buffer);

        let count = {
            let mut subscribers = self.shared.subscribers.lock();
            subscribers.insert(id, Subscriber { kinds, tx });
            subscribers.len()
        };
        debug!(subscriber = id, subscribers = count, ?kinds, "Subscriber added");

        Subscription {
            id,
            rx,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Register a subscriber, then read the current tickets
    ///
    /// Registration happens first, so an event published while the store is
    /// being read reaches the subscriber as a harmless duplicate instead of
    /// being lost. If the read fails the subscription is dropped again.
    pub fn subscribe_with_snapshot<S>(
        &self,
        kinds: EventKinds,
        store: &S,
    ) -> QueueResult<(Snapshot, Subscription)>
    where
        S: TicketStore + ?Sized,
    {
        let subscription = self.subscribe(kinds);
        let sequence_id = self.current_sequence_id();
        let tickets = store.list_all()?;
        Ok((
            Snapshot {
                tickets,
                sequence_id,
            },
            subscription,
        ))
    }

    /// Deliver `event` to every subscriber listening for its kind
    ///
    /// Never blocks and never fails; returns how many subscribers accepted
    /// the event.
    pub fn publish(&self, event: QueueEvent) -> usize {
        let kind = event.kind();
        let mut sequence = self.shared.sequence.lock();
        let message = QueueMessage {
            event,
            sequence_id: *sequence,
            timestamp: chrono::Utc::now().timestamp(),
        };
        *sequence += 1;

        let targets: Vec<(SubscriberId, mpsc::Sender<QueueMessage>)> = self
            .shared
            .subscribers
            .lock()
            .iter()
            .filter(|(_, s)| s.kinds.contains(kind))
            .map(|(id, s)| (*id, s.tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut dropped = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = id, "Subscriber buffer full, dropping subscriber");
                    dropped.push(id);
                }
                Err(TrySendError::Closed(_)) => dropped.push(id),
            }
        }
        drop(sequence);

        for id in dropped {
            self.shared.remove(id);
        }

        debug!(
            sequence_id = message.sequence_id,
            %kind,
            delivered,
            "Published queue event"
        );
        delivered
    }

    /// Remove a subscriber; returns false if it was already gone
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.shared.remove(id)
    }

    /// Change which kinds a live subscriber receives
    pub fn set_kinds(&self, id: SubscriberId, kinds: EventKinds) -> bool {
        match self.shared.subscribers.lock().get_mut(&id) {
            Some(subscriber) => {
                subscriber.kinds = kinds;
                true
            }
            None => false,
        }
    }

    /// Kinds a subscriber currently receives
    pub fn kinds_of(&self, id: SubscriberId) -> Option<EventKinds> {
        self.shared.subscribers.lock().get(&id).map(|s| s.kinds)
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }

    /// Sequence id the next published event will carry
    pub fn current_sequence_id(&self) -> u64 {
        *self.shared.sequence.lock()
    }

    /// Drop every subscriber; their streams end after draining buffered events
    pub fn shutdown(&self) -> usize {
        let removed = {
            let mut subscribers = self.shared.subscribers.lock();
            let count = subscribers.len();
            subscribers.clear();
            count
        };
        info!(subscribers = removed, "Broadcaster shut down");
        removed
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

/// Receiving end of one subscriber's channel
///
/// Unsubscribes on drop.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<QueueMessage>,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event; `None` once the subscriber has been removed
    /// and its buffer is drained
    pub async fn recv(&mut self) -> Option<QueueMessage> {
        self.rx.recv().await
    }

    /// Take a buffered event without waiting
    pub fn try_recv(&mut self) -> Option<QueueMessage> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::events::{ChangeKind, EventKind};
    use crate::store::FileTicketStore;
    use crate::types::NewTicket;
    use crate::utils::current_minute;

    fn change(first: &str) -> QueueEvent {
        let ticket = Ticket::from_draft(
            1,
            NewTicket::walk_in(first, "Visitor").into_draft(current_minute(), 1),
        );
        QueueEvent::ticket_changed(ChangeKind::Created, ticket, None)
    }

    #[test]
    fn test_publish_increments_sequence() {
        let broadcaster = Broadcaster::new(8);
        assert_eq!(broadcaster.current_sequence_id(), 0);

        // No subscribers is fine
        assert_eq!(broadcaster.publish(QueueEvent::refresh(None)), 0);
        assert_eq!(broadcaster.current_sequence_id(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let broadcaster = Broadcaster::new(8);
        let mut sub = broadcaster.subscribe(EventKinds::all());

        broadcaster.publish(change("A"));
        broadcaster.publish(QueueEvent::refresh(Some("manual".into())));
        broadcaster.publish(change("B"));

        let ids: Vec<u64> = vec![
            sub.recv().await.unwrap().sequence_id,
            sub.recv().await.unwrap().sequence_id,
            sub.recv().await.unwrap().sequence_id,
        ];
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_kind_filtering() {
        let broadcaster = Broadcaster::new(8);
        let mut changes = broadcaster.subscribe(EventKinds::only(EventKind::Changes));
        let mut pings = broadcaster.subscribe(EventKinds::only(EventKind::Refresh));
        let mut silent = broadcaster.subscribe(EventKinds::none());

        assert_eq!(broadcaster.publish(change("A")), 1);
        assert_eq!(broadcaster.publish(QueueEvent::refresh(None)), 1);

        assert_eq!(changes.recv().await.unwrap().event.kind(), EventKind::Changes);
        assert_eq!(pings.recv().await.unwrap().event.kind(), EventKind::Refresh);
        assert!(changes.try_recv().is_none());
        assert!(silent.try_recv().is_none());
    }

    #[test]
    fn test_set_kinds_changes_delivery() {
        let broadcaster = Broadcaster::new(8);
        let mut sub = broadcaster.subscribe(EventKinds::none());

        broadcaster.publish(QueueEvent::refresh(None));
        assert!(sub.try_recv().is_none());

        assert!(broadcaster.set_kinds(sub.id(), EventKinds::only(EventKind::Refresh)));
        broadcaster.publish(QueueEvent::refresh(None));
        assert!(sub.try_recv().is_some());
        assert_eq!(
            broadcaster.kinds_of(sub.id()),
            Some(EventKinds::only(EventKind::Refresh))
        );
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let broadcaster = Broadcaster::new(8);
        let sub = broadcaster.subscribe(EventKinds::all());
        let id = sub.id();

        assert!(broadcaster.unsubscribe(id));
        assert!(!broadcaster.unsubscribe(id));
        assert!(!broadcaster.set_kinds(id, EventKinds::all()));

        // Dropping after an explicit unsubscribe is harmless too
        drop(sub);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let broadcaster = Broadcaster::new(8);
        let sub = broadcaster.subscribe(EventKinds::all());
        assert_eq!(broadcaster.subscriber_count(), 1);

        drop(sub);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.publish(QueueEvent::refresh(None)), 0);
    }

    #[test]
    fn test_full_buffer_drops_only_that_subscriber() {
        let broadcaster = Broadcaster::new(2);
        let mut slow = broadcaster.subscribe(EventKinds::all());
        let mut fast = broadcaster.subscribe(EventKinds::all());

        for i in 0..3 {
            broadcaster.publish(QueueEvent::refresh(Some(format!("r{}", i))));
            assert!(fast.try_recv().is_some());
        }

        assert_eq!(broadcaster.subscriber_count(), 1);
        // The slow subscriber still drains what was buffered, then ends
        assert!(slow.try_recv().is_some());
        assert!(slow.try_recv().is_some());
        assert!(slow.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_then_events() {
        let broadcaster = Broadcaster::new(8);
        let store = FileTicketStore::in_memory();
        broadcaster.publish(QueueEvent::refresh(None));

        let (snapshot, mut sub) = broadcaster
            .subscribe_with_snapshot(EventKinds::all(), &store)
            .unwrap();
        assert!(snapshot.tickets.is_empty());
        assert_eq!(snapshot.sequence_id, 1);

        broadcaster.publish(change("A"));
        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.sequence_id, snapshot.sequence_id);
    }

    #[tokio::test]
    async fn test_shutdown_ends_streams() {
        let broadcaster = Broadcaster::new(8);
        let mut sub = broadcaster.subscribe(EventKinds::all());
        broadcaster.publish(QueueEvent::refresh(None));

        assert_eq!(broadcaster.shutdown(), 1);
        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
    }
}
