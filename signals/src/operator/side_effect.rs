use std::marker::PhantomData;

use crate::{
    signal::{Payload, Signal},
    transformer::{Continuation, Transform},
};

/// Passes every signal through unchanged after showing it to an observer
pub struct SideEffect<T, F> {
    observer: F,
    _payload: PhantomData<fn(&Signal<T>)>,
}

impl<T, F> SideEffect<T, F>
where F: Fn(&Signal<T>) + Send + Sync + 'static
{
    pub fn new(observer: F) -> Self { Self { observer, _payload: PhantomData } }
}

impl<T: 'static> SideEffect<T, ()> {
    /// Observes `Next` payloads only
    pub fn on_next(observer: impl Fn(&T) + Send + Sync + 'static) -> SideEffect<T, impl Fn(&Signal<T>) + Send + Sync + 'static> {
        SideEffect::new(move |signal: &Signal<T>| {
            if let Signal::Next(value) = signal {
                observer(value);
            }
        })
    }

    /// Observes termination only
    pub fn on_stop(observer: impl Fn() + Send + Sync + 'static) -> SideEffect<T, impl Fn(&Signal<T>) + Send + Sync + 'static> {
        SideEffect::new(move |signal: &Signal<T>| {
            if signal.is_stop() {
                observer();
            }
        })
    }
}

impl<T, F> Transform<T, T> for SideEffect<T, F>
where
    T: Payload,
    F: Fn(&Signal<T>) + Send + Sync + 'static,
{
    fn transform(&self, signal: Signal<T>, continuation: &Continuation<T>) {
        (self.observer)(&signal);
        continuation.send(signal);
    }

    fn name(&self) -> &'static str { "side_effect" }
}
