/*!
Asynchronous signal composition.

A graph is built from root producers ([`Source`], [`Just`]) and combinators chained through
[`ProducerExt`]: `map`, `filter`, `flat_map`, `merge`, `debounce`, `cached`, `side_effect` and
`switch_context`. Every combinator is a [`Transformer`]: incoming signals hop onto a transformation
context where the combinator runs, and its output is delivered to subscribers on a production
context. No component owns a thread; all work runs on the [`ExecutionContext`]s the graph is
configured with.

# Design requirements:
- Producers only expose subscription. Termination is a signal ([`Signal::Stop`]), not an error.
- Subscribers are independent: none can block another, and delivery never runs under a lock.
- Timing races (late subscription, disconnected wires, stale timers) are silent no-ops.
- There is no global scheduler. The default context is part of the [`Graph`] a chain is built from.

# Basic usage

```rust
use conduit_signals::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

let context = ManualContext::new("main");
let graph = Graph::new(context.clone());

let clicks = graph.source::<u32>();
// the caller owns the end of the chain, which keeps every upstream combinator alive
let settled = clicks.map(|n| n * 10).filter(|n| *n > 10).debounce(Duration::from_millis(50));

let seen = Arc::new(Mutex::new(Vec::new()));
let _guard = {
    let seen = seen.clone();
    settled.subscribe(move |signal: Signal<u32>| seen.lock().unwrap().push(signal))
};

clicks.send(1);
clicks.send(2);
clicks.send(3);
context.run_until_idle();
context.advance(Duration::from_millis(50));

// only the last value survives the debounce
assert_eq!(*seen.lock().unwrap(), [Signal::Next(30)]);
```

# Wires

```rust
use conduit_signals::*;

let context = ManualContext::new("main");
let graph = Graph::new(context.clone());
let names = graph.source::<String>();
let latest = names.cached();

names.send("Buffy".to_string());
context.run_until_idle();

// a late subscriber to a cached producer is replayed the latest value immediately
let (tx, rx) = std::sync::mpsc::channel();
let wire = latest.connect(Listener::new(move |signal| {
    let _ = tx.send(signal);
}));
assert_eq!(rx.try_recv().ok(), Some(Signal::Next("Buffy".to_string())));

wire.disconnect();
names.send("Willow".to_string());
context.run_until_idle();
assert!(rx.try_recv().is_err());
```
*/

mod broadcast;
mod context;
mod erased;
mod error;
mod graph;
pub mod operator;
mod porcelain;
mod signal;
mod source;
mod traits;
mod transformer;
mod wire;

pub use broadcast::*;
pub use context::*;
pub use erased::*;
pub use error::*;
pub use graph::*;
pub use porcelain::*;
pub use signal::*;
pub use source::*;
pub use traits::*;
pub use transformer::*;
pub use wire::*;
