use std::time::Duration;

use crate::{
    erased::AnyProducer,
    graph::{Contexts, Placement},
    operator::{Cached, Debounce, FlatMap, Filter, Map, Passthrough, SideEffect, merge},
    signal::{Payload, Signal},
    traits::Producer,
    transformer::{Transform, Transformer},
};

/// Combinator chaining for every cloneable producer.
///
/// Each method returns a new producer holding this one as its root. Nothing runs until the root
/// emits; building a chain only registers upward.
pub trait ProducerExt<T: Payload>: Producer<T> + Clone + Sized + 'static {
    /// A type-erased handle sharing this producer
    fn erase(&self) -> AnyProducer<T> { AnyProducer::new(self.clone()) }

    /// Chains a custom combinator
    fn transform_with<U, X>(&self, transform: X, placement: &Placement) -> Transformer<T, U>
    where
        U: Payload,
        X: Transform<T, U>,
    {
        Transformer::attach(self.erase(), transform, placement)
    }

    fn map<U, F>(&self, f: F) -> Transformer<T, U>
    where
        U: Payload,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.transform_with(Map::new(f), &Placement::default())
    }

    fn filter<P>(&self, predicate: P) -> Transformer<T, T>
    where P: Fn(&T) -> bool + Send + Sync + 'static {
        self.transform_with(Filter::new(predicate), &Placement::default())
    }

    /// Spawns a child producer per value; see [`FlatMap`]
    fn flat_map<U, P, F>(&self, project: F) -> Transformer<T, U>
    where
        U: Payload,
        P: Producer<U> + 'static,
        F: Fn(T) -> P + Send + Sync + 'static,
    {
        self.transform_with(FlatMap::<U, F>::new(project), &Placement::default())
    }

    fn debounce(&self, delay: Duration) -> Transformer<T, T> { self.transform_with(Debounce::new(delay), &Placement::default()) }

    /// Replays the latest value to late subscribers; see [`Cached`]
    fn cached(&self) -> Transformer<T, T> { self.transform_with(Cached::new(), &Placement::default()) }

    fn side_effect<F>(&self, observer: F) -> Transformer<T, T>
    where F: Fn(&Signal<T>) + Send + Sync + 'static {
        self.transform_with(SideEffect::new(observer), &Placement::default())
    }

    fn on_next<F>(&self, observer: F) -> Transformer<T, T>
    where F: Fn(&T) + Send + Sync + 'static {
        self.transform_with(SideEffect::on_next(observer), &Placement::default())
    }

    fn on_stop<F>(&self, observer: F) -> Transformer<T, T>
    where F: Fn() + Send + Sync + 'static {
        self.transform_with(SideEffect::on_stop(observer), &Placement::default())
    }

    /// Moves the work of the next combinator onto the contexts in `placement`.
    /// Values pass through unchanged.
    fn switch_context(&self, placement: Placement) -> Transformer<T, T> {
        let root = self.erase();
        let contexts: Contexts = placement.resolve(&root);
        Transformer::exporting(vec![root], Passthrough, contexts)
    }

    /// Interleaves this producer with `other`; see [`merge`]
    fn merge<P>(&self, other: &P) -> Transformer<T, T>
    where P: Producer<T> + Clone + 'static {
        merge(self.erase(), AnyProducer::new(other.clone()))
    }
}

impl<T: Payload, P> ProducerExt<T> for P where P: Producer<T> + Clone + Sized + 'static {}
