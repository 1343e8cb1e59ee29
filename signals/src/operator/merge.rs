use crate::{
    erased::AnyProducer,
    graph::{Contexts, Placement},
    operator::Passthrough,
    signal::Payload,
    traits::Producer,
    transformer::Transformer,
};

/// Fans two roots of the same type into one stream.
///
/// Signals are forwarded in whatever order they arrive, with no coordination between the roots.
/// The first `Stop` from either root ends the merged stream. Replies are produced on the graph's
/// default context whatever the roots' own production contexts are.
pub fn merge<T: Payload>(first: AnyProducer<T>, second: AnyProducer<T>) -> Transformer<T, T> {
    let Contexts { transformation, .. } = Placement::default().resolve(&first);
    let production = first.graph().default_context();
    Transformer::new(vec![first, second], Passthrough, Contexts { transformation, production })
}
