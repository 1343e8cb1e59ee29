use std::sync::{
    Arc, Mutex, Weak,
    atomic::{AtomicBool, Ordering},
};

use tracing::debug;

use crate::{
    broadcast::{Listener, ListenerGuard},
    erased::{AnyConsumer, AnyProducer},
    signal::{Payload, Signal},
    traits::{Consumer, Producer},
};

/// An explicit subscription binding one producer to one consumer.
///
/// While connected the wire shares ownership of both ends. `disconnect` is idempotent: it releases
/// both ends and clears a flag that is checked before every delivery, so a delivery that was already
/// scheduled when the wire was disconnected is silently skipped. Dropping the last handle to a wire
/// disconnects it.
#[derive(Clone)]
pub struct Wire(Arc<dyn Link>);

trait Link: Send + Sync {
    fn disconnect(&self);
    fn is_connected(&self) -> bool;
}

struct Inner<T> {
    connected: AtomicBool,
    // set before registering upstream so that a synchronous replay during registration is delivered
    consumer: Mutex<Option<AnyConsumer<T>>>,
    upstream: Mutex<Option<(AnyProducer<T>, ListenerGuard<T>)>>,
}

impl<T: Payload> Inner<T> {
    fn deliver(&self, signal: Signal<T>) {
        if !self.connected.load(Ordering::SeqCst) {
            return;
        }
        let consumer = self.consumer.lock().expect("wire consumer lock is poisoned").clone();
        if let Some(consumer) = consumer {
            consumer.consume(signal);
        }
    }
}

impl<T: Payload> Link for Inner<T> {
    fn disconnect(&self) {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return;
        }
        let consumer = self.consumer.lock().expect("wire consumer lock is poisoned").take();
        let upstream = self.upstream.lock().expect("wire upstream lock is poisoned").take();
        debug!("wire disconnected");
        // released outside the locks, dropping the guard unregisters from the producer
        drop(upstream);
        drop(consumer);
    }

    fn is_connected(&self) -> bool { self.connected.load(Ordering::SeqCst) }
}

impl Wire {
    pub fn connect<T: Payload>(producer: AnyProducer<T>, consumer: AnyConsumer<T>) -> Self {
        let inner = Arc::new(Inner { connected: AtomicBool::new(true), consumer: Mutex::new(Some(consumer)), upstream: Mutex::new(None) });

        let weak: Weak<Inner<T>> = Arc::downgrade(&inner);
        let guard = producer.upon(Listener::new(move |signal| {
            if let Some(inner) = weak.upgrade() {
                inner.deliver(signal);
            }
        }));
        *inner.upstream.lock().expect("wire upstream lock is poisoned") = Some((producer, guard));

        Wire(inner)
    }

    pub fn disconnect(&self) { self.0.disconnect() }

    pub fn is_connected(&self) -> bool { self.0.is_connected() }
}

impl std::fmt::Debug for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Wire").field("connected", &self.is_connected()).finish() }
}

/// Disconnects a batch of wires together, explicitly or when the group is dropped
#[derive(Default)]
pub struct WireGroup {
    wires: Mutex<Vec<Wire>>,
}

impl WireGroup {
    pub fn new() -> Self { Self::default() }

    pub fn add(&self, wire: Wire) { self.wires.lock().expect("wire group lock is poisoned").push(wire); }

    pub fn len(&self) -> usize { self.wires.lock().expect("wire group lock is poisoned").len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Disconnects and forgets every wire in the group
    pub fn disconnect(&self) {
        let wires = std::mem::take(&mut *self.wires.lock().expect("wire group lock is poisoned"));
        for wire in &wires {
            wire.disconnect();
        }
    }
}

impl Extend<Wire> for WireGroup {
    fn extend<I: IntoIterator<Item = Wire>>(&mut self, iter: I) {
        self.wires.get_mut().expect("wire group lock is poisoned").extend(iter);
    }
}

impl FromIterator<Wire> for WireGroup {
    fn from_iter<I: IntoIterator<Item = Wire>>(iter: I) -> Self { Self { wires: Mutex::new(iter.into_iter().collect()) } }
}

impl Drop for WireGroup {
    fn drop(&mut self) { self.disconnect(); }
}

impl std::fmt::Debug for WireGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("WireGroup").field("wires", &self.len()).finish() }
}
