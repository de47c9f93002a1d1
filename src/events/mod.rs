mod channel;

pub use channel::{
    Callback, Channel, EventEmitter, EventHandler, EventObserver, SubscriptionId, Unsubscriber,
};
