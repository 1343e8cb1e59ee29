use crate::{
    signal::{Payload, Signal},
    transformer::{Continuation, Transform},
};

/// Forwards every signal unchanged.
///
/// Chained through `switch_context` its only job is to move the work of whatever comes next onto
/// different execution contexts: the transformer advertises its transformation context to the next
/// combinator and delivers on its own production context.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl<T: Payload> Transform<T, T> for Passthrough {
    fn transform(&self, signal: Signal<T>, continuation: &Continuation<T>) { continuation.send(signal) }

    fn name(&self) -> &'static str { "passthrough" }
}
