use conduit_signals::{Graph, Listener, ManualContext, Signal};
use std::sync::{Arc, Mutex};

/// Returns a listener recording every signal and a closure draining what was recorded so far
#[allow(unused)]
pub fn watcher<T: Send + 'static>() -> (Listener<T>, Box<dyn Fn() -> Vec<Signal<T>> + Send + Sync>) {
    let signals = Arc::new(Mutex::new(Vec::new()));
    let listener = {
        let signals = signals.clone();
        Listener::new(move |signal: Signal<T>| {
            signals.lock().unwrap().push(signal);
        })
    };

    let check = Box::new(move || {
        let signals: Vec<Signal<T>> = signals.lock().unwrap().drain(..).collect();
        signals
    });

    (listener, check)
}

#[allow(unused)]
pub fn manual_graph() -> (ManualContext, Graph) {
    init_tracing();
    let context = ManualContext::new("main");
    let graph = Graph::new(context.clone());
    (context, graph)
}

/// Pumps every context until none of them has ready work left
#[allow(unused)]
pub fn settle(contexts: &[&ManualContext]) {
    while contexts.iter().map(|context| context.run_until_idle()).sum::<usize>() > 0 {}
}

#[allow(unused)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG).try_init();
}
