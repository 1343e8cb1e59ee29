use std::sync::{Mutex, MutexGuard};

use crate::{
    broadcast::Listener,
    signal::{Payload, Signal},
    transformer::{Continuation, Transform},
};

/// Forwards every signal unchanged and remembers the latest value.
///
/// A subscriber registering while a value is held is handed that value synchronously, before any
/// live signal. `Stop` forgets the held value.
pub struct Cached<T> {
    latest: Mutex<Option<T>>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self { Self { latest: Mutex::new(None) } }
}

impl<T: Payload> Cached<T> {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> MutexGuard<'_, Option<T>> { self.latest.lock().expect("cached value lock is poisoned") }
}

impl<T: Payload> Transform<T, T> for Cached<T> {
    fn transform(&self, signal: Signal<T>, continuation: &Continuation<T>) {
        // updating and handing off under one lock keeps registration from landing between the two
        let mut latest = self.lock();
        *latest = match &signal {
            Signal::Next(value) => Some(value.clone()),
            Signal::Stop => None,
        };
        continuation.send(signal);
    }

    fn on_subscribe(&self, listener: &Listener<T>, register: &mut dyn FnMut()) {
        // every value stored after the registration is delivered live, so only the one held now is replayed
        let held = {
            let latest = self.lock();
            register();
            (*latest).clone()
        };
        // replayed outside the lock so the listener may feed the stream again
        if let Some(value) = held {
            listener.call(Signal::Next(value));
        }
    }

    fn name(&self) -> &'static str { "cached" }
}
