use std::{sync::Arc, time::Duration};

use tokio::{runtime::Handle, sync::mpsc};
use tracing::{trace, warn};

use super::{ExecutionContext, Task};
use crate::error::ContextError;

/// A serial execution context backed by a tokio runtime.
///
/// Tasks are queued on an unbounded channel and drained, in order, by a single spawned worker.
/// Delayed tasks sleep on the runtime timer and then join the same queue.
#[derive(Clone)]
pub struct TokioContext(Arc<Inner>);

struct Inner {
    name: String,
    queue: mpsc::UnboundedSender<Task>,
    handle: Handle,
}

impl TokioContext {
    /// Creates a context on the runtime of the calling task
    pub fn new(name: impl Into<String>) -> Result<Self, ContextError> {
        let handle = Handle::try_current()?;
        Ok(Self::with_handle(name, handle))
    }

    pub fn with_handle(name: impl Into<String>, handle: Handle) -> Self {
        let name = name.into();
        let (queue, mut rx) = mpsc::unbounded_channel::<Task>();
        let worker_name = name.clone();
        handle.spawn(async move {
            while let Some(task) = rx.recv().await {
                task();
            }
            trace!(context = %worker_name, "worker finished");
        });
        Self(Arc::new(Inner { name, queue, handle }))
    }

    pub fn try_run(&self, task: Task) -> Result<(), ContextError> {
        self.0.queue.send(task).map_err(|_| ContextError::Closed(self.0.name.clone()))
    }
}

impl ExecutionContext for TokioContext {
    fn name(&self) -> &str { &self.0.name }

    fn run(&self, task: Task) {
        if let Err(e) = self.try_run(task) {
            warn!(context = %self.0.name, "dropping task: {e}");
        }
    }

    fn run_after(&self, delay: Duration, task: Task) {
        let queue = self.0.queue.clone();
        let name = self.0.name.clone();
        self.0.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if queue.send(task).is_err() {
                warn!(context = %name, "dropping delayed task: context is closed");
            }
        });
    }
}

impl std::fmt::Debug for TokioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_tuple("TokioContext").field(&self.0.name).finish() }
}
