use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::trace;

pub type Callback<T> = Rc<dyn Fn(&T)>;
pub type SubscriptionId = u64;

/// Receives events delivered through an [`EventObserver`].
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}

struct Listeners<T> {
    entries: RefCell<Vec<(SubscriptionId, Callback<T>)>>,
    next_id: Cell<SubscriptionId>,
}

/// Single-threaded fan-out of events to subscribers, in subscription order.
pub struct Channel<T: std::fmt::Debug> {
    listeners: Rc<Listeners<T>>,
}

impl<T: std::fmt::Debug> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

pub struct EventEmitter<T: std::fmt::Debug> {
    channel: Channel<T>,
}

impl<T: std::fmt::Debug> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

pub struct EventObserver<T: std::fmt::Debug> {
    channel: Channel<T>,
}

impl<T: std::fmt::Debug> Clone for EventObserver<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

/// Handle that removes one subscription when consumed.
pub struct Unsubscriber<T: std::fmt::Debug> {
    channel: Channel<T>,
    id: SubscriptionId,
}

impl<T: std::fmt::Debug> Unsubscriber<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn unsubscribe(self) -> bool {
        self.channel.unsubscribe(self.id)
    }
}

impl<T: std::fmt::Debug> Channel<T> {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventEmitter<T>, EventObserver<T>) {
        let channel = Channel {
            listeners: Rc::new(Listeners {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        };
        (
            EventEmitter {
                channel: channel.clone(),
            },
            EventObserver { channel },
        )
    }

    fn subscribe<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id + 1);
        self.listeners
            .entries
            .borrow_mut()
            .push((id, Rc::new(callback)));
        Unsubscriber {
            channel: self.clone(),
            id,
        }
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.listeners.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    fn emit(&self, data: &T) {
        // Snapshot so listeners may subscribe or unsubscribe while handling.
        let listeners: Vec<Callback<T>> = self
            .listeners
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        trace!(target: "events", "Emitting event to {} listeners: {:?}", listeners.len(), data);
        for listener in listeners {
            listener(data);
        }
    }

    fn listener_count(&self) -> usize {
        self.listeners.entries.borrow().len()
    }
}

impl<T: std::fmt::Debug> EventEmitter<T> {
    pub fn emit(&self, data: T) {
        self.channel.emit(&data);
    }

    pub fn listener_count(&self) -> usize {
        self.channel.listener_count()
    }
}

impl<T: std::fmt::Debug + 'static> EventObserver<T> {
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        self.channel.subscribe(callback)
    }

    /// Routes events to a shared handler. Holds the handler weakly, so the
    /// subscription goes quiet once the handler is dropped.
    pub fn subscribe_handler<H>(&self, handler: &Rc<RefCell<H>>) -> Unsubscriber<T>
    where
        H: EventHandler<T> + 'static,
    {
        let weak: Weak<RefCell<H>> = Rc::downgrade(handler);
        self.channel.subscribe(move |event| {
            if let Some(handler) = weak.upgrade() {
                handler.borrow_mut().handle_event(event);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let (emitter, observer) = Channel::<i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        observer.subscribe(move |data: &i32| first.borrow_mut().push(("first", *data)));
        let second = seen.clone();
        observer.subscribe(move |data: &i32| second.borrow_mut().push(("second", *data)));

        emitter.emit(7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (emitter, observer) = Channel::<i32>::new();
        let calls = Rc::new(Cell::new(0));
        let calls_seen = calls.clone();

        let subscription = observer.subscribe(move |_data: &i32| {
            calls_seen.set(calls_seen.get() + 1);
        });
        emitter.emit(1);
        assert_eq!(calls.get(), 1);

        assert!(subscription.unsubscribe());
        emitter.emit(1);
        assert_eq!(calls.get(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_subscribe_while_handling() {
        let (emitter, observer) = Channel::<i32>::new();
        let nested_observer = observer.clone();
        let calls = Rc::new(Cell::new(0));
        let calls_seen = calls.clone();

        observer.subscribe(move |_data: &i32| {
            let inner_calls = calls_seen.clone();
            nested_observer.subscribe(move |_data: &i32| {
                inner_calls.set(inner_calls.get() + 1);
            });
        });

        emitter.emit(1);
        assert_eq!(calls.get(), 0);
        emitter.emit(1);
        assert_eq!(calls.get(), 1);
    }

    struct Summer {
        total: i32,
    }

    impl EventHandler<i32> for Summer {
        fn handle_event(&mut self, event: &i32) {
            self.total += event;
        }
    }

    #[test]
    fn test_handler_subscription_is_weak() {
        let (emitter, observer) = Channel::<i32>::new();
        let summer = Rc::new(RefCell::new(Summer { total: 0 }));
        let _subscription = observer.subscribe_handler(&summer);

        emitter.emit(2);
        emitter.emit(3);
        assert_eq!(summer.borrow().total, 5);

        drop(summer);
        emitter.emit(4);
    }
}
