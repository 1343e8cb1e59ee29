use std::{sync::Arc, time::Duration};

mod manual;
#[cfg(feature = "tokio")]
mod tokio_context;

pub use manual::*;
#[cfg(feature = "tokio")]
pub use tokio_context::*;

/// A unit of work submitted to an execution context
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A place where work runs, either as soon as possible or after a delay.
///
/// Tasks submitted to the same context instance run in submission order. Every ordering
/// guarantee in this crate assumes that property; a context which runs tasks concurrently is
/// allowed, but signals passing through it may be reordered.
pub trait ExecutionContext: Send + Sync + 'static {
    /// Name used in log output
    fn name(&self) -> &str;

    /// Runs the task at the soonest available slot
    fn run(&self, task: Task);

    /// Runs the task once `delay` has elapsed
    fn run_after(&self, delay: Duration, task: Task);
}

/// Shared handle to an execution context
pub type Context = Arc<dyn ExecutionContext>;

impl<C> ExecutionContext for Arc<C>
where C: ExecutionContext + ?Sized
{
    fn name(&self) -> &str { (**self).name() }

    fn run(&self, task: Task) { (**self).run(task) }

    fn run_after(&self, delay: Duration, task: Task) { (**self).run_after(delay, task) }
}
