use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use tracing::trace;

use crate::{
    signal::{Payload, Signal},
    transformer::{Continuation, Transform},
};

/// Forwards a value only once `delay` has passed without a newer value arriving.
///
/// Every `Next` bumps an epoch and schedules a delayed delivery that captured it. When the timer
/// fires it delivers only if the epoch is unchanged; superseded timers are never cancelled, they
/// simply find a newer epoch and do nothing. `Stop` is forwarded at once.
pub struct Debounce {
    delay: Duration,
    epoch: Arc<AtomicU64>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self { Self { delay, epoch: Arc::new(AtomicU64::new(0)) } }
}

impl<T: Payload> Transform<T, T> for Debounce {
    fn transform(&self, signal: Signal<T>, continuation: &Continuation<T>) {
        match signal {
            Signal::Next(value) => {
                let expected = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
                let epoch = self.epoch.clone();
                let delayed = continuation.clone();
                continuation.context().run_after(
                    self.delay,
                    Box::new(move || {
                        if epoch.load(Ordering::SeqCst) == expected {
                            delayed.next(value);
                        } else {
                            trace!(expected, "debounced value superseded");
                        }
                    }),
                );
            }
            Signal::Stop => continuation.stop(),
        }
    }

    fn name(&self) -> &'static str { "debounce" }
}
