use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::{
    broadcast::{Listener, ListenerGuard},
    erased::AnyProducer,
    signal::{Payload, Signal},
    traits::Producer,
    transformer::{Continuation, Transform},
};

/// Spawns a child producer for every upstream value and forwards the values of all live children.
///
/// Children end independently: a child's `Stop` only releases that child. The flattened stream ends
/// when the upstream itself stops, at which point every remaining child is released.
pub struct FlatMap<T, F> {
    project: F,
    children: Arc<Mutex<BTreeMap<u64, Child<T>>>>,
    next_index: AtomicU64,
}

/// A table entry owns the child and both of its registrations
struct Child<T> {
    _producer: AnyProducer<T>,
    _forward: ListenerGuard<T>,
    _release: ListenerGuard<T>,
}

impl<T, F> FlatMap<T, F> {
    pub fn new(project: F) -> Self { Self { project, children: Arc::new(Mutex::new(BTreeMap::new())), next_index: AtomicU64::new(0) } }

    fn children(&self) -> MutexGuard<'_, BTreeMap<u64, Child<T>>> { self.children.lock().expect("flat_map child table lock is poisoned") }
}

impl<S, T, P, F> Transform<S, T> for FlatMap<T, F>
where
    S: Payload,
    T: Payload,
    P: Producer<T> + 'static,
    F: Fn(S) -> P + Send + Sync + 'static,
{
    fn transform(&self, signal: Signal<S>, continuation: &Continuation<T>) {
        match signal {
            Signal::Next(value) => {
                let index = self.next_index.fetch_add(1, Ordering::Relaxed);
                let child = AnyProducer::new((self.project)(value));

                let forward = {
                    let continuation = continuation.clone();
                    child.upon(Listener::new(move |signal| {
                        if let Signal::Next(value) = signal {
                            continuation.next(value);
                        }
                    }))
                };

                // the table is only touched from the transformation context, so removal hops back onto it
                let release = {
                    let children = Arc::downgrade(&self.children);
                    let context = continuation.context().clone();
                    child.upon(Listener::new(move |signal: Signal<T>| {
                        if !signal.is_stop() {
                            return;
                        }
                        let children = children.clone();
                        context.run(Box::new(move || {
                            let Some(children) = children.upgrade() else { return };
                            let released = children.lock().expect("flat_map child table lock is poisoned").remove(&index);
                            if released.is_some() {
                                debug!(index, "flat_map child released");
                            }
                        }));
                    }))
                };

                debug!(index, "flat_map child spawned");
                self.children().insert(index, Child { _producer: child, _forward: forward, _release: release });
            }
            Signal::Stop => {
                let released = std::mem::take(&mut *self.children());
                debug!(count = released.len(), "flat_map upstream stopped, releasing children");
                drop(released);
                continuation.stop();
            }
        }
    }

    fn name(&self) -> &'static str { "flat_map" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::ManualContext,
        graph::{Contexts, Graph},
        source::Source,
        transformer::Transformer,
    };
    use std::sync::mpsc;

    #[test]
    fn test_child_table_tracks_live_children() {
        let context = ManualContext::new("main");
        let graph = Graph::new(context.clone());
        let children: Arc<Mutex<Vec<Source<String>>>> = Arc::new(Mutex::new(Vec::new()));

        let flat_map = {
            let graph = graph.clone();
            let children = children.clone();
            FlatMap::<String, _>::new(move |_: u32| {
                let child = graph.source::<String>();
                children.lock().unwrap().push(child.clone());
                child
            })
        };
        let table = flat_map.children.clone();
        let parent = graph.source::<u32>();
        let contexts = Contexts { transformation: graph.default_context(), production: graph.default_context() };
        let flattened = Transformer::new(vec![AnyProducer::new(parent.clone())], flat_map, contexts);
        let (tx, rx) = mpsc::channel();
        let _guard = flattened.upon(Listener::new(move |signal| {
            let _ = tx.send(signal);
        }));

        parent.send(1);
        parent.send(2);
        context.run_until_idle();
        assert_eq!(table.lock().unwrap().len(), 2);

        let (first, second) = {
            let children = children.lock().unwrap();
            (children[0].clone(), children[1].clone())
        };
        first.send("a".into());
        first.stop();
        second.send("b".into());
        context.run_until_idle();
        assert_eq!(table.lock().unwrap().keys().copied().collect::<Vec<_>>(), [1]);

        // indices are never reused
        parent.send(3);
        context.run_until_idle();
        assert_eq!(table.lock().unwrap().keys().copied().collect::<Vec<_>>(), [1, 2]);

        parent.stop();
        context.run_until_idle();
        assert!(table.lock().unwrap().is_empty());
        // the released child no longer reaches the flattened stream
        second.send("late".into());
        context.run_until_idle();
        assert_eq!(second.subscriber_count(), 0);

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [Signal::Next("a".to_string()), Signal::Next("b".to_string()), Signal::Stop]);
    }
}
