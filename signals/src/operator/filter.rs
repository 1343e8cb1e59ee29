use crate::{
    signal::{Payload, Signal},
    transformer::{Continuation, Transform},
};

/// Forwards the `Next` payloads matching a predicate. Rejected values produce no signal at all.
pub struct Filter<P>(P);

impl<P> Filter<P> {
    pub fn new(predicate: P) -> Self { Self(predicate) }
}

impl<T, P> Transform<T, T> for Filter<P>
where
    T: Payload,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn transform(&self, signal: Signal<T>, continuation: &Continuation<T>) {
        match signal {
            Signal::Next(value) if !(self.0)(&value) => {}
            signal => continuation.send(signal),
        }
    }

    fn name(&self) -> &'static str { "filter" }
}
