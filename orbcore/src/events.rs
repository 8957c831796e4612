//! Typed publish/subscribe hub decoupling gameplay signals from consumers.
//!
//! Delivery is synchronous and depth-first: handlers run on the publishing
//! tick, in registration order, and may themselves publish, subscribe, or
//! unsubscribe while a publish is in flight.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;

/// Domain events emitted by the level controller.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    CollectiblePicked {
        position: Vec3,
        collected: u32,
        required: u32,
    },
    BallFell,
    LevelComplete {
        collected: u32,
    },
}

/// Subscription topic, one per `GameEvent` variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    CollectiblePicked,
    BallFell,
    LevelComplete,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::CollectiblePicked { .. } => EventKind::CollectiblePicked,
            GameEvent::BallFell => EventKind::BallFell,
            GameEvent::LevelComplete { .. } => EventKind::LevelComplete,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandlerId(u64);

type Handler = Rc<RefCell<dyn FnMut(&GameEvent)>>;

pub struct EventBus {
    handlers: RefCell<HashMap<EventKind, Vec<(HandlerId, Handler)>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// Register a handler for one event kind. Handlers fire in registration
    /// order.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.handlers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, Rc::new(RefCell::new(handler))));
        id
    }

    /// Remove a handler. Unknown ids are a no-op.
    pub fn unsubscribe(&self, kind: EventKind, id: HandlerId) {
        if let Some(list) = self.handlers.borrow_mut().get_mut(&kind) {
            list.retain(|(existing, _)| *existing != id);
        }
    }

    /// Deliver an event to every subscriber of its kind. Publishing with no
    /// subscribers is a no-op. A handler removed earlier in the same publish
    /// does not fire.
    pub fn publish(&self, event: &GameEvent) {
        let kind = event.kind();
        let snapshot: Vec<(HandlerId, Handler)> = match self.handlers.borrow().get(&kind) {
            Some(list) => list
                .iter()
                .map(|(id, h)| (*id, Rc::clone(h)))
                .collect(),
            None => return,
        };

        for (id, handler) in snapshot {
            // Re-check liveness: a prior handler may have unsubscribed this
            // one or cleared the bus.
            let alive = self
                .handlers
                .borrow()
                .get(&kind)
                .is_some_and(|list| list.iter().any(|(existing, _)| *existing == id));
            if alive {
                (handler.borrow_mut())(event);
            }
        }
    }

    /// Drop every subscription. Used on level restart so stale handlers
    /// cannot outlive the level they were wired for.
    pub fn clear(&self) {
        self.handlers.borrow_mut().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked(collected: u32) -> GameEvent {
        GameEvent::CollectiblePicked {
            position: Vec3::ZERO,
            collected,
            required: 5,
        }
    }

    #[test]
    fn calls_registered_handler_on_publish() {
        let bus = EventBus::new();
        let seen = Rc::new(Cell::new(0u32));
        let seen2 = Rc::clone(&seen);
        bus.subscribe(EventKind::CollectiblePicked, move |event| {
            if let GameEvent::CollectiblePicked { collected, .. } = event {
                seen2.set(*collected);
            }
        });
        bus.publish(&picked(3));
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn does_not_call_removed_handler() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0u32));
        let count2 = Rc::clone(&count);
        let id = bus.subscribe(EventKind::BallFell, move |_| {
            count2.set(count2.get() + 1);
        });
        bus.unsubscribe(EventKind::BallFell, id);
        bus.publish(&GameEvent::BallFell);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn multiple_handlers_fire_in_registration_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            bus.subscribe(EventKind::BallFell, move |_| {
                order.borrow_mut().push(tag);
            });
        }
        bus.publish(&GameEvent::BallFell);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::new();
        bus.publish(&GameEvent::LevelComplete { collected: 5 });
    }

    #[test]
    fn clear_removes_all_handlers() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0u32));
        let count2 = Rc::clone(&count);
        bus.subscribe(EventKind::BallFell, move |_| {
            count2.set(count2.get() + 1);
        });
        bus.clear();
        bus.publish(&GameEvent::BallFell);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn unsubscribing_an_unknown_handler_is_a_noop() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventKind::BallFell, |_| {});
        bus.unsubscribe(EventKind::LevelComplete, id);
        bus.unsubscribe(EventKind::BallFell, id);
        bus.unsubscribe(EventKind::BallFell, id);
    }

    #[test]
    fn handler_may_publish_depth_first() {
        let bus = Rc::new(EventBus::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let inner_order = Rc::clone(&order);
        bus.subscribe(EventKind::LevelComplete, move |_| {
            inner_order.borrow_mut().push("complete");
        });

        let chained_bus = Rc::clone(&bus);
        let outer_order = Rc::clone(&order);
        bus.subscribe(EventKind::CollectiblePicked, move |_| {
            outer_order.borrow_mut().push("picked:before");
            chained_bus.publish(&GameEvent::LevelComplete { collected: 5 });
            outer_order.borrow_mut().push("picked:after");
        });

        bus.publish(&picked(5));
        assert_eq!(
            *order.borrow(),
            vec!["picked:before", "complete", "picked:after"]
        );
    }

    #[test]
    fn handler_removed_mid_publish_does_not_fire() {
        let bus = Rc::new(EventBus::new());
        let count = Rc::new(Cell::new(0u32));

        // The second handler's id is known before the first one runs because
        // ids are assigned sequentially starting at 1.
        let remover_bus = Rc::clone(&bus);
        bus.subscribe(EventKind::BallFell, move |_| {
            remover_bus.unsubscribe(EventKind::BallFell, HandlerId(2));
        });
        let count2 = Rc::clone(&count);
        bus.subscribe(EventKind::BallFell, move |_| {
            count2.set(count2.get() + 1);
        });

        bus.publish(&GameEvent::BallFell);
        assert_eq!(count.get(), 0);
    }
}
