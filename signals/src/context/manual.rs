use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tracing::warn;

use super::{ExecutionContext, Task};
use crate::error::ContextError;

/// A serial execution context driven explicitly by its owner, with a virtual clock.
///
/// Nothing runs until [`ManualContext::run_until_idle`] or [`ManualContext::advance`] is called,
/// which makes it the context of choice for deterministic tests and for hosts which already own
/// an event loop and want to pump the graph from it.
#[derive(Clone)]
pub struct ManualContext(Arc<Inner>);

struct Inner {
    name: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    now: Duration,
    sequence: u64,
    ready: VecDeque<Task>,
    // keyed by (deadline, submission sequence) so that equal deadlines keep submission order
    delayed: BTreeMap<(Duration, u64), Task>,
    closed: bool,
}

impl State {
    fn promote_due(&mut self) {
        while let Some(entry) = self.delayed.first_entry() {
            if entry.key().0 > self.now {
                break;
            }
            self.ready.push_back(entry.remove());
        }
    }
}

impl ManualContext {
    pub fn new(name: impl Into<String>) -> Self { Self(Arc::new(Inner { name: name.into(), state: Mutex::new(State::default()) })) }

    fn lock(&self) -> MutexGuard<'_, State> { self.0.state.lock().expect("manual context state lock is poisoned") }

    /// Current virtual time, starting at zero
    pub fn now(&self) -> Duration { self.lock().now }

    /// Number of tasks waiting to run, delayed or not
    pub fn pending(&self) -> usize {
        let state = self.lock();
        state.ready.len() + state.delayed.len()
    }

    pub fn try_run(&self, task: Task) -> Result<(), ContextError> {
        let mut state = self.lock();
        if state.closed {
            return Err(ContextError::Closed(self.0.name.clone()));
        }
        state.ready.push_back(task);
        Ok(())
    }

    /// Drops every pending task and rejects future submissions
    pub fn close(&self) {
        let dropped = {
            let mut state = self.lock();
            state.closed = true;
            (std::mem::take(&mut state.ready), std::mem::take(&mut state.delayed))
        };
        drop(dropped);
    }

    /// Runs ready tasks (including tasks they submit) until the queue is empty.
    /// Delayed tasks only run once the virtual clock has reached their deadline.
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = {
                let mut state = self.lock();
                if state.ready.is_empty() {
                    state.promote_due();
                }
                state.ready.pop_front()
            };
            match task {
                // the lock is released while the task runs so it can submit more work
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Moves the virtual clock forward by `duration`, running every task that becomes due on the way
    /// at its own deadline. Returns the number of tasks run.
    pub fn advance(&self, duration: Duration) -> usize {
        let target = self.now() + duration;
        let mut ran = self.run_until_idle();
        loop {
            {
                let mut state = self.lock();
                match state.delayed.keys().next() {
                    Some(&(deadline, _)) if deadline <= target => state.now = state.now.max(deadline),
                    _ => {
                        state.now = target;
                        break;
                    }
                }
            }
            ran += self.run_until_idle();
        }
        ran + self.run_until_idle()
    }
}

impl ExecutionContext for ManualContext {
    fn name(&self) -> &str { &self.0.name }

    fn run(&self, task: Task) {
        if let Err(e) = self.try_run(task) {
            warn!(context = %self.0.name, "dropping task: {e}");
        }
    }

    fn run_after(&self, delay: Duration, task: Task) {
        let mut state = self.lock();
        if state.closed {
            warn!(context = %self.0.name, "dropping delayed task: context is closed");
            return;
        }
        let deadline = state.now + delay;
        state.sequence += 1;
        let sequence = state.sequence;
        state.delayed.insert((deadline, sequence), task);
    }
}

impl std::fmt::Debug for ManualContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualContext")
            .field("name", &self.0.name)
            .field("now", &state.now)
            .field("ready", &state.ready.len())
            .field("delayed", &state.delayed.len())
            .finish()
    }
}
