//! Lifecycle signals and the publish/subscribe registry
//!
//! Listeners are plain callbacks invoked synchronously, in subscription order,
//! from inside the tick that published the signal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named game signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSignal {
    /// Climb session started
    Start,
    SoundToggle,
    /// Daily rewards panel opened
    BonusOpen,
    Claim,
    Close,
    /// Endless session started
    EndlessStart,
    GameOver,
    Continue,
    /// Climb catalog exhausted
    Finish,
}

impl GameSignal {
    /// Signals that only the lifecycle may raise
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            GameSignal::Start
                | GameSignal::EndlessStart
                | GameSignal::GameOver
                | GameSignal::Continue
                | GameSignal::Finish
        )
    }
}

/// Token returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

struct Listener {
    id: SubscriptionId,
    signal: GameSignal,
    callback: Box<dyn FnMut(GameSignal)>,
}

/// Publish/subscribe registry
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    next_id: u32,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        signal: GameSignal,
        callback: impl FnMut(GameSignal) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push(Listener {
            id,
            signal,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Deliver `signal` to its listeners, returns how many were called
    pub fn publish(&mut self, signal: GameSignal) -> usize {
        let mut delivered = 0;
        for listener in self.listeners.iter_mut().filter(|l| l.signal == signal) {
            (listener.callback)(signal);
            delivered += 1;
        }
        delivered
    }

    pub fn subscriber_count(&self, signal: GameSignal) -> usize {
        self.listeners.iter().filter(|l| l.signal == signal).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delivery_in_subscription_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = log.clone();
            bus.subscribe(GameSignal::GameOver, move |_| log.borrow_mut().push(tag));
        }
        let other = log.clone();
        bus.subscribe(GameSignal::Continue, move |_| other.borrow_mut().push("continue"));

        assert_eq!(bus.publish(GameSignal::GameOver), 2);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let id = bus.subscribe(GameSignal::SoundToggle, move |_| *counter.borrow_mut() += 1);

        bus.publish(GameSignal::SoundToggle);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(GameSignal::SoundToggle);

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.subscriber_count(GameSignal::SoundToggle), 0);
    }
}
