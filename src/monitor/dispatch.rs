//! Process-wide event dispatch. Every thread of the instrumented program
//! reports to the same registry, so a subscriber sees all of them.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use lazy_static::lazy_static;
use parking_lot::RwLock;

use super::events::{EventKind, Frame};

/// Receives execution events. Called inline on the emitting thread.
pub trait Subscriber: Send + Sync {
    fn on_event(&self, kind: EventKind, frame: &Frame);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

lazy_static! {
    static ref SUBSCRIBERS: RwLock<Vec<(SubscriptionId, Arc<dyn Subscriber>)>> =
        RwLock::new(Vec::new());
}

pub fn subscribe(subscriber: Arc<dyn Subscriber>) -> SubscriptionId {
    let id = SubscriptionId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
    SUBSCRIBERS.write().push((id, subscriber));
    id
}

/// Removes a subscriber. Once this returns, no callback for it is running
/// and none will start. Must not be called from inside a callback.
pub fn unsubscribe(id: SubscriptionId) -> bool {
    let mut subscribers = SUBSCRIBERS.write();
    let before = subscribers.len();
    subscribers.retain(|(subscribed, _)| *subscribed != id);
    subscribers.len() != before
}

/// Delivers an event to every subscriber, in subscription order.
pub fn emit(kind: EventKind, frame: &Frame) {
    // Recursive read: a callback may itself emit.
    let subscribers = SUBSCRIBERS.read_recursive();
    for (_, subscriber) in subscribers.iter() {
        subscriber.on_event(kind, frame);
    }
}

pub fn subscriber_count() -> usize {
    SUBSCRIBERS.read().len()
}
