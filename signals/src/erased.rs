use std::sync::Arc;

use crate::{
    broadcast::{Listener, ListenerGuard},
    context::Context,
    graph::Graph,
    signal::Signal,
    traits::{Consumer, Producer},
};

/// A shared, type-erased handle to some producer of `T`.
/// Used wherever a combinator holds roots or children without knowing their concrete type.
pub struct AnyProducer<T>(Arc<dyn Producer<T>>);

impl<T> Clone for AnyProducer<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> AnyProducer<T> {
    pub fn new<P>(producer: P) -> Self
    where P: Producer<T> + 'static {
        Self(Arc::new(producer))
    }
}

impl<T> Producer<T> for AnyProducer<T> {
    fn upon(&self, listener: Listener<T>) -> ListenerGuard<T> { self.0.upon(listener) }

    fn graph(&self) -> &Graph { self.0.graph() }

    fn production_context(&self) -> Context { self.0.production_context() }

    fn transformation_context(&self) -> Option<Context> { self.0.transformation_context() }
}

impl<T> std::fmt::Debug for AnyProducer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyProducer").field("graph", &self.0.graph().name()).field("production", &self.0.production_context().name()).finish()
    }
}

/// A shared, type-erased handle to some consumer of `T`
pub struct AnyConsumer<T>(Arc<dyn Consumer<T>>);

impl<T> Clone for AnyConsumer<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> AnyConsumer<T> {
    pub fn new<C>(consumer: C) -> Self
    where C: Consumer<T> + 'static {
        Self(Arc::new(consumer))
    }
}

impl<T> Consumer<T> for AnyConsumer<T> {
    fn consume(&self, signal: Signal<T>) { self.0.consume(signal) }
}

impl<T: 'static> From<Listener<T>> for AnyConsumer<T> {
    fn from(listener: Listener<T>) -> Self { Self::new(listener) }
}

impl<T> std::fmt::Debug for AnyConsumer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("AnyConsumer") }
}
