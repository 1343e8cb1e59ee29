use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    broadcast::{Listener, ListenerGuard, Talker},
    context::{Context, ExecutionContext},
    graph::Graph,
    signal::{Payload, Signal},
    traits::Producer,
};

/// A root producer fed by hand: every `send` is broadcast to the current subscribers.
/// Cloning a `Source` gives another handle to the same stream.
pub struct Source<T> {
    graph: Graph,
    talker: Talker<T>,
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self { Self { graph: self.graph.clone(), talker: self.talker.clone() } }
}

impl<T: Payload> Source<T> {
    /// A source producing on the graph's default context
    pub fn new(graph: &Graph) -> Self { Self::with_context(graph, graph.default_context()) }

    pub fn on(graph: &Graph, context: impl ExecutionContext) -> Self { Self::with_context(graph, Arc::new(context)) }

    pub fn with_context(graph: &Graph, context: Context) -> Self { Self { graph: graph.clone(), talker: Talker::new(context) } }

    pub fn send(&self, value: T) { self.talker.talk(Signal::Next(value)) }

    /// Terminates the stream. Later sends are ignored.
    pub fn stop(&self) { self.talker.talk(Signal::Stop) }

    pub fn emit(&self, signal: Signal<T>) { self.talker.talk(signal) }

    pub fn is_stopped(&self) -> bool { self.talker.is_stopped() }

    pub fn subscriber_count(&self) -> usize { self.talker.listener_count() }
}

impl<T: Payload> Producer<T> for Source<T> {
    fn upon(&self, listener: Listener<T>) -> ListenerGuard<T> { self.talker.listen(listener) }

    fn graph(&self) -> &Graph { &self.graph }

    fn production_context(&self) -> Context { self.talker.context().clone() }
}

impl<T> std::fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source").field("graph", &self.graph.name()).field("talker", &self.talker).finish()
    }
}

/// A root producer holding one value. Each subscriber independently receives `Next(value)`
/// followed by `Stop`, scheduled on the production context at registration time.
pub struct Just<T> {
    graph: Graph,
    context: Context,
    value: T,
}

impl<T: Clone> Clone for Just<T> {
    fn clone(&self) -> Self { Self { graph: self.graph.clone(), context: self.context.clone(), value: self.value.clone() } }
}

impl<T: Payload> Just<T> {
    pub fn new(graph: &Graph, value: T) -> Self { Self { graph: graph.clone(), context: graph.default_context(), value } }

    pub fn on(graph: &Graph, context: impl ExecutionContext, value: T) -> Self {
        Self { graph: graph.clone(), context: Arc::new(context), value }
    }
}

impl<T: Payload> Producer<T> for Just<T> {
    fn upon(&self, listener: Listener<T>) -> ListenerGuard<T> {
        let live = Arc::new(AtomicBool::new(true));
        let value = self.value.clone();
        {
            let live = live.clone();
            self.context.run(Box::new(move || {
                if live.load(Ordering::SeqCst) {
                    listener.call(Signal::Next(value));
                }
                if live.load(Ordering::SeqCst) {
                    listener.call(Signal::Stop);
                }
            }));
        }
        ListenerGuard::clear_on_drop(live)
    }

    fn graph(&self) -> &Graph { &self.graph }

    fn production_context(&self) -> Context { self.context.clone() }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Just<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_tuple("Just").field(&self.value).finish() }
}
