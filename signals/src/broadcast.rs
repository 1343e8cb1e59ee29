use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, trace};

use crate::{
    context::Context,
    signal::{Payload, Signal},
    traits::Consumer,
};

/// Identifies one registration on a [`Talker`]. Ids are never reused by the same talker.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// A single callback receiving every signal of one subscription
pub struct Listener<T>(Arc<dyn Fn(Signal<T>) + Send + Sync + 'static>);

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Listener<T> {
    pub fn new<F>(callback: F) -> Self
    where F: Fn(Signal<T>) + Send + Sync + 'static {
        Self(Arc::new(callback))
    }

    pub fn call(&self, signal: Signal<T>) { (self.0)(signal) }
}

impl<T> Consumer<T> for Listener<T> {
    fn consume(&self, signal: Signal<T>) { self.call(signal) }
}

/// Trait for types that can be converted into listeners.
pub trait IntoListener<T> {
    fn into_listener(self) -> Listener<T>;
}

impl<F, T> IntoListener<T> for F
where F: Fn(Signal<T>) + Send + Sync + 'static
{
    fn into_listener(self) -> Listener<T> { Listener::new(self) }
}

impl<T> IntoListener<T> for Listener<T> {
    fn into_listener(self) -> Listener<T> { self }
}

#[cfg(feature = "tokio")]
impl<T> IntoListener<T> for tokio::sync::mpsc::UnboundedSender<Signal<T>>
where T: Send + 'static
{
    fn into_listener(self) -> Listener<T> {
        Listener::new(move |signal| {
            let _ = self.send(signal); // receiver gone
        })
    }
}

impl<T> IntoListener<T> for std::sync::mpsc::Sender<Signal<T>>
where T: Send + 'static
{
    fn into_listener(self) -> Listener<T> {
        Listener::new(move |signal| {
            let _ = self.send(signal); // receiver gone
        })
    }
}

/// A multicast emitter. Every signal handed to [`Talker::talk`] is delivered, on the talker's
/// production context, to the listeners registered at the time of the call.
///
/// `Stop` is terminal: it is delivered like any other signal, then the listener set is cleared and
/// every later signal or registration is silently ignored.
pub struct Talker<T>(Arc<Inner<T>>);

impl<T> Clone for Talker<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

struct Inner<T> {
    context: Context,
    state: Mutex<State<T>>,
    next_id: AtomicU64,
}

struct State<T> {
    listeners: BTreeMap<ListenerId, Listener<T>>,
    stopped: bool,
}

impl<T> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> { self.state.lock().expect("talker state lock is poisoned") }
}

impl<T> std::fmt::Debug for Talker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.lock();
        f.debug_struct("Talker")
            .field("context", &self.0.context.name())
            .field("listeners", &state.listeners.len())
            .field("stopped", &state.stopped)
            .finish()
    }
}

impl<T: Payload> Talker<T> {
    pub fn new(context: Context) -> Self {
        Self(Arc::new(Inner {
            context,
            state: Mutex::new(State { listeners: BTreeMap::new(), stopped: false }),
            next_id: AtomicU64::new(0),
        }))
    }

    /// The production context signals are delivered on
    pub fn context(&self) -> &Context { &self.0.context }

    pub fn is_stopped(&self) -> bool { self.0.lock().stopped }

    pub fn listener_count(&self) -> usize { self.0.lock().listeners.len() }

    /// Registers a listener. Registering on a stopped talker returns an inert guard.
    pub fn listen<L>(&self, listener: L) -> ListenerGuard<T>
    where L: IntoListener<T> {
        let mut state = self.0.lock();
        if state.stopped {
            trace!("listener registered after stop will never fire");
            return ListenerGuard::inert();
        }
        let id = ListenerId(self.0.next_id.fetch_add(1, Ordering::Relaxed));
        state.listeners.insert(id, listener.into_listener());
        ListenerGuard(Slot::Registered { talker: Arc::downgrade(&self.0), id })
    }

    /// Schedules delivery of `signal` to all current listeners
    pub fn talk(&self, signal: Signal<T>) {
        // Copy the listeners so delivery never runs under the lock; a listener may register or
        // drop guards on this very talker while it is being called
        let listeners: Vec<Listener<T>> = {
            let mut state = self.0.lock();
            if state.stopped {
                trace!("signal after stop dropped");
                return;
            }
            if signal.is_stop() {
                state.stopped = true;
                debug!(context = %self.0.context.name(), listeners = state.listeners.len(), "talker stopped");
                std::mem::take(&mut state.listeners).into_values().collect()
            } else {
                state.listeners.values().cloned().collect()
            }
        };
        if listeners.is_empty() {
            return;
        }

        self.0.context.run(Box::new(move || deliver(listeners, signal)));
    }
}

fn deliver<T: Clone>(listeners: Vec<Listener<T>>, signal: Signal<T>) {
    // clone the signal for each listener except the last one
    if let Some((last, rest)) = listeners.split_last() {
        for listener in rest {
            listener.call(signal.clone());
        }
        last.call(signal);
    }
}

/// Keeps a registration alive. Dropping the guard removes the callback from its producer.
#[must_use = "dropping a ListenerGuard unsubscribes immediately"]
pub struct ListenerGuard<T>(Slot<T>);

enum Slot<T> {
    Registered { talker: Weak<Inner<T>>, id: ListenerId },
    Flag(Arc<AtomicBool>),
    Inert,
}

impl<T> ListenerGuard<T> {
    /// A guard for a registration that will never fire
    pub fn inert() -> Self { Self(Slot::Inert) }

    /// A guard that clears `live` when dropped. Producers that deliver from their own scheduled
    /// tasks check the flag before each call.
    pub fn clear_on_drop(live: Arc<AtomicBool>) -> Self { Self(Slot::Flag(live)) }

    pub fn is_inert(&self) -> bool { matches!(self.0, Slot::Inert) }
}

impl<T> Drop for ListenerGuard<T> {
    fn drop(&mut self) {
        match &self.0 {
            Slot::Registered { talker, id } => {
                // the talker may already be gone, in which case there is nothing to remove
                if let Some(talker) = talker.upgrade() {
                    let removed = talker.lock().listeners.remove(id);
                    drop(removed);
                }
            }
            Slot::Flag(live) => live.store(false, Ordering::SeqCst),
            Slot::Inert => {}
        }
    }
}

impl<T> std::fmt::Debug for ListenerGuard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Slot::Registered { id, .. } => write!(f, "ListenerGuard({id})"),
            Slot::Flag(live) => write!(f, "ListenerGuard(live: {})", live.load(Ordering::SeqCst)),
            Slot::Inert => write!(f, "ListenerGuard(inert)"),
        }
    }
}
