use crate::{
    broadcast::{Listener, ListenerGuard},
    context::Context,
    graph::Graph,
    signal::Signal,
};

/// Something that will, at unspecified future times, deliver signals to registered listeners:
/// zero or more `Next`, then optionally one terminal `Stop`.
///
/// Producers expose subscription only; there is no way to cancel a producer's own work.
/// Must be dyn object safe.
pub trait Producer<T>: Send + Sync {
    /// Registers a listener. Never blocks, and is allowed after the producer has terminated, in
    /// which case the listener is simply never called. The registration lasts as long as the
    /// returned guard.
    fn upon(&self, listener: Listener<T>) -> ListenerGuard<T>;

    /// The configuration this producer (and everything chained from it) belongs to
    fn graph(&self) -> &Graph;

    /// The context listeners are called on
    fn production_context(&self) -> Context;

    /// A transformation context this producer asks downstream combinators to use, if any
    fn transformation_context(&self) -> Option<Context> { None }
}

/// Something that accepts pushed signals
pub trait Consumer<T>: Send + Sync {
    fn consume(&self, signal: Signal<T>);
}
