//! The engine shared by every combinator.
//!
//! A [`Transformer`] listens to one or more roots. Each incoming signal hops onto the
//! transformation context, where the combinator's [`Transform`] hook decides what (if anything) to
//! emit through its [`Continuation`]. Emitted signals are delivered to subscribers on the production
//! context by the transformer's [`Talker`].

use std::sync::{Arc, Mutex, Weak};

use tracing::trace;

use crate::{
    broadcast::{Listener, ListenerGuard, Talker},
    context::Context,
    erased::AnyProducer,
    graph::{Contexts, Graph, Placement},
    signal::{Payload, Signal},
    traits::Producer,
};

/// The combinator-specific half of a transformer.
///
/// `transform` always runs on the transformation context, which makes that context the only place
/// combinator state may be mutated.
pub trait Transform<S, T>: Send + Sync + 'static {
    /// Handles one upstream signal. Calling the continuation zero times means no output for this
    /// input; every call delivers one signal downstream, now or later.
    fn transform(&self, signal: Signal<S>, continuation: &Continuation<T>);

    /// Called on the subscribing thread for every new listener. `register` adds the listener to the
    /// subscribers and must be called exactly once; combinators may wrap it in their own lock.
    fn on_subscribe(&self, _listener: &Listener<T>, register: &mut dyn FnMut()) { register() }

    /// Name used in log output
    fn name(&self) -> &'static str { "transform" }
}

/// The channel through which a combinator reports its output.
/// Cloneable so that results can be produced from timers or child subscriptions.
pub struct Continuation<T> {
    talker: Talker<T>,
    context: Context,
}

impl<T> Clone for Continuation<T> {
    fn clone(&self) -> Self { Self { talker: self.talker.clone(), context: self.context.clone() } }
}

impl<T: Payload> Continuation<T> {
    /// Hands `signal` to the subscribers. Anything sent after a `Stop` is dropped.
    pub fn send(&self, signal: Signal<T>) { self.talker.talk(signal) }

    pub fn next(&self, value: T) { self.send(Signal::Next(value)) }

    pub fn stop(&self) { self.send(Signal::Stop) }

    /// The transformation context, for combinators that schedule follow-up work
    pub fn context(&self) -> &Context { &self.context }

    pub fn is_stopped(&self) -> bool { self.talker.is_stopped() }
}

/// A producer of `T` driven by signals of `S` from its roots
pub struct Transformer<S, T>(Arc<Inner<S, T>>);

impl<S, T> Clone for Transformer<S, T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

struct Inner<S, T> {
    graph: Graph,
    roots: Vec<AnyProducer<S>>,
    root_guards: Mutex<Vec<ListenerGuard<S>>>,
    transform: Box<dyn Transform<S, T>>,
    continuation: Continuation<T>,
    // advertised to downstream combinators, see SwitchContext
    exported_transformation: Option<Context>,
}

impl<S: Payload, T: Payload> Transformer<S, T> {
    /// Chains `transform` onto a single root, resolving contexts through `placement`
    pub fn attach<X>(root: AnyProducer<S>, transform: X, placement: &Placement) -> Self
    where X: Transform<S, T> {
        let contexts = placement.resolve(&root);
        Self::new(vec![root], transform, contexts)
    }

    /// Panics if `roots` is empty.
    pub fn new<X>(roots: Vec<AnyProducer<S>>, transform: X, contexts: Contexts) -> Self
    where X: Transform<S, T> {
        Self::build(roots, Box::new(transform), contexts, None)
    }

    /// Like `new`, but downstream combinators inherit this transformer's transformation context
    pub(crate) fn exporting<X>(roots: Vec<AnyProducer<S>>, transform: X, contexts: Contexts) -> Self
    where X: Transform<S, T> {
        let exported = contexts.transformation.clone();
        Self::build(roots, Box::new(transform), contexts, Some(exported))
    }

    fn build(roots: Vec<AnyProducer<S>>, transform: Box<dyn Transform<S, T>>, contexts: Contexts, exported_transformation: Option<Context>) -> Self {
        assert!(!roots.is_empty(), "a transformer needs at least one root");
        let graph = roots[0].graph().clone();
        let continuation = Continuation { talker: Talker::new(contexts.production), context: contexts.transformation };
        let inner = Arc::new(Inner { graph, roots, root_guards: Mutex::new(Vec::new()), transform, continuation, exported_transformation });

        // Roots only hold a weak reference back, so the transformer lives exactly as long as its handles
        let guards: Vec<ListenerGuard<S>> = inner
            .roots
            .iter()
            .map(|root| {
                let weak = Arc::downgrade(&inner);
                root.upon(Listener::new(move |signal| {
                    if let Some(inner) = weak.upgrade() {
                        inner.receive(signal);
                    }
                }))
            })
            .collect();
        *inner.root_guards.lock().expect("root guard lock is poisoned") = guards;

        Self(inner)
    }

    pub fn is_stopped(&self) -> bool { self.0.continuation.is_stopped() }

    pub fn subscriber_count(&self) -> usize { self.0.continuation.talker.listener_count() }
}

impl<S: Payload, T: Payload> Inner<S, T> {
    fn receive(self: Arc<Self>, signal: Signal<S>) {
        trace!(transform = self.transform.name(), stop = signal.is_stop(), "signal received");
        let weak: Weak<Self> = Arc::downgrade(&self);
        self.continuation.context.run(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.transform.transform(signal, &inner.continuation);
            }
        }));
    }
}

impl<S: Payload, T: Payload> Producer<T> for Transformer<S, T> {
    fn upon(&self, listener: Listener<T>) -> ListenerGuard<T> {
        let talker = &self.0.continuation.talker;
        let mut guard = None;
        self.0.transform.on_subscribe(&listener, &mut || guard = Some(talker.listen(listener.clone())));
        guard.unwrap_or_else(ListenerGuard::inert)
    }

    fn graph(&self) -> &Graph { &self.0.graph }

    fn production_context(&self) -> Context { self.0.continuation.talker.context().clone() }

    fn transformation_context(&self) -> Option<Context> { self.0.exported_transformation.clone() }
}

impl<S: 'static, T: 'static> std::fmt::Debug for Transformer<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("transform", &self.0.transform.name())
            .field("roots", &self.0.roots.len())
            .field("transformation", &self.0.continuation.context.name())
            .field("talker", &self.0.continuation.talker)
            .finish()
    }
}
