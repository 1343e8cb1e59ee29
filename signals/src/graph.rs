use std::sync::Arc;

use crate::{
    context::{Context, ExecutionContext},
    signal::Payload,
    source::{Just, Source},
    traits::Producer,
};

/// Configuration shared by every producer chained from the same roots.
///
/// There is no process-wide scheduler: the default context is whatever the graph was built with,
/// and every root producer is created from a graph.
#[derive(Clone)]
pub struct Graph(Arc<Inner>);

struct Inner {
    name: String,
    default_context: Context,
}

impl Graph {
    pub fn new(default_context: impl ExecutionContext) -> Self { Self::with_context(Arc::new(default_context)) }

    pub fn with_context(default_context: Context) -> Self { Self(Arc::new(Inner { name: "main".to_string(), default_context })) }

    /// A graph whose default context is a [`TokioContext`](crate::TokioContext) on the current runtime
    #[cfg(feature = "tokio")]
    pub fn tokio() -> Result<Self, crate::ContextError> { Ok(Self::new(crate::context::TokioContext::new("main")?)) }

    pub fn named(self, name: impl Into<String>) -> Self {
        Self(Arc::new(Inner { name: name.into(), default_context: self.0.default_context.clone() }))
    }

    pub fn name(&self) -> &str { &self.0.name }

    /// Used for transformations without a more specific context, and for every merge's production
    pub fn default_context(&self) -> Context { self.0.default_context.clone() }

    /// A root producer emitting on the default context
    pub fn source<T: Payload>(&self) -> Source<T> { Source::new(self) }

    /// A root producer giving each subscriber `value` followed by `Stop`
    pub fn just<T: Payload>(&self, value: T) -> Just<T> { Just::new(self, value) }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph").field("name", &self.0.name).field("default_context", &self.0.default_context.name()).finish()
    }
}

/// Per-combinator context overrides. Unset fields fall back to the upstream's choice.
#[derive(Clone, Default)]
pub struct Placement {
    pub transformation: Option<Context>,
    pub production: Option<Context>,
}

impl Placement {
    pub fn transform_on(mut self, context: impl ExecutionContext) -> Self {
        self.transformation = Some(Arc::new(context));
        self
    }

    pub fn produce_on(mut self, context: impl ExecutionContext) -> Self {
        self.production = Some(Arc::new(context));
        self
    }

    /// Picks the transformation and production contexts for a combinator chained onto `root`.
    ///
    /// Transformation: this placement, else the root's declared transformation context, else the
    /// graph default. Production: this placement, else the root's production context.
    pub fn resolve<T>(&self, root: &dyn Producer<T>) -> Contexts {
        let transformation = self
            .transformation
            .clone()
            .or_else(|| root.transformation_context())
            .unwrap_or_else(|| root.graph().default_context());
        let production = self.production.clone().unwrap_or_else(|| root.production_context());
        Contexts { transformation, production }
    }
}

impl std::fmt::Debug for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placement")
            .field("transformation", &self.transformation.as_ref().map(|c| c.name().to_string()))
            .field("production", &self.production.as_ref().map(|c| c.name().to_string()))
            .finish()
    }
}

/// The pair of contexts a transformer runs on
#[derive(Clone)]
pub struct Contexts {
    /// Runs the combinator's logic and owns its private state
    pub transformation: Context,
    /// Runs subscriber callbacks
    pub production: Context,
}
