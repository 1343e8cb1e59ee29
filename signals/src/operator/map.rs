use crate::{
    signal::{Payload, Signal},
    transformer::{Continuation, Transform},
};

/// Applies a function to every `Next` payload
pub struct Map<F>(F);

impl<F> Map<F> {
    pub fn new(f: F) -> Self { Self(f) }
}

impl<S, T, F> Transform<S, T> for Map<F>
where
    S: Payload,
    T: Payload,
    F: Fn(S) -> T + Send + Sync + 'static,
{
    fn transform(&self, signal: Signal<S>, continuation: &Continuation<T>) { continuation.send(signal.map(&self.0)) }

    fn name(&self) -> &'static str { "map" }
}
