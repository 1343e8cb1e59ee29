use crate::{
    broadcast::{IntoListener, ListenerGuard},
    erased::{AnyConsumer, AnyProducer},
    signal::Payload,
    traits::{Consumer, Producer},
    wire::Wire,
};

/// Subscription helpers for every producer
pub trait Subscribe<T: Payload>: Producer<T> {
    /// Registers a closure or channel sender. The registration lasts as long as the guard, but the
    /// guard does not keep the producer alive; use [`Subscribe::connect`] for that.
    fn subscribe<L>(&self, listener: L) -> ListenerGuard<T>
    where L: IntoListener<T> {
        self.upon(listener.into_listener())
    }

    /// Binds this producer to `consumer` through an explicit [`Wire`]
    fn connect<C>(&self, consumer: C) -> Wire
    where
        Self: Clone + Sized + 'static,
        C: Consumer<T> + 'static,
    {
        Wire::connect(AnyProducer::new(self.clone()), AnyConsumer::new(consumer))
    }

    /// Bridges this producer into async code: every signal is pushed into an unbounded channel
    #[cfg(feature = "tokio")]
    fn receiver(&self) -> (tokio::sync::mpsc::UnboundedReceiver<crate::Signal<T>>, ListenerGuard<T>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let guard = self.subscribe(tx);
        (rx, guard)
    }
}

impl<T: Payload, P> Subscribe<T> for P where P: Producer<T> + ?Sized {}
