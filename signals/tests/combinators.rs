mod common;
use common::{manual_graph, settle, watcher};
use conduit_signals::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[test]
fn test_map_preserves_order() {
    let (context, graph) = manual_graph();
    let numbers = graph.source::<i32>();
    let doubled = numbers.map(|n| n * 2);
    let (listener, check) = watcher();
    let _guard = doubled.subscribe(listener);

    for n in 1..=5 {
        numbers.send(n);
    }
    numbers.stop();
    context.run_until_idle();

    assert_eq!(check(), [Signal::Next(2), Signal::Next(4), Signal::Next(6), Signal::Next(8), Signal::Next(10), Signal::Stop]);
}

#[test]
fn test_map_changes_the_payload_type() {
    let (context, graph) = manual_graph();
    let numbers = graph.source::<u8>();
    let labels = numbers.map(|n| format!("#{n}"));
    let (listener, check) = watcher();
    let _guard = labels.subscribe(listener);

    numbers.send(7);
    context.run_until_idle();
    assert_eq!(check(), [Signal::Next("#7".to_string())]);
}

#[test]
fn test_filter_yields_matching_subsequence() {
    let (context, graph) = manual_graph();
    let numbers = graph.source::<i32>();
    let even = numbers.filter(|n| n % 2 == 0);
    let (listener, check) = watcher();
    let _guard = even.subscribe(listener);

    for n in [1, 2, 3, 4, 5, 6] {
        numbers.send(n);
    }
    context.run_until_idle();
    assert_eq!(check(), [Signal::Next(2), Signal::Next(4), Signal::Next(6)]);

    // a rejected value is not a Stop; Stop always passes
    numbers.send(7);
    numbers.stop();
    context.run_until_idle();
    assert_eq!(check(), [Signal::Stop]);
}

#[test]
fn test_nothing_after_stop() {
    let (context, graph) = manual_graph();
    let numbers = graph.source::<i32>();
    let chain = numbers.map(|n| n + 1).filter(|_| true);
    let (listener, check) = watcher();
    let _guard = chain.subscribe(listener);

    numbers.send(1);
    numbers.stop();
    numbers.send(2);
    numbers.stop();
    context.run_until_idle();

    assert_eq!(check(), [Signal::Next(2), Signal::Stop]);
    assert!(chain.is_stopped());
}

#[test]
fn test_debounce_delivers_only_the_settled_value() {
    let (context, graph) = manual_graph();
    let delay = Duration::from_millis(100);
    let keystrokes = graph.source::<i32>();
    let settled = keystrokes.debounce(delay);
    let (listener, check) = watcher();
    let _guard = settled.subscribe(listener);

    keystrokes.send(1);
    context.run_until_idle();
    context.advance(delay / 2);
    keystrokes.send(2);
    context.run_until_idle();

    // the timer for 1 fires at t=d and finds a newer epoch
    context.advance(delay / 2);
    assert_eq!(check(), []);

    context.advance(delay / 2 - Duration::from_millis(1));
    assert_eq!(check(), []);
    context.advance(Duration::from_millis(1));
    assert_eq!(context.now(), delay / 2 + delay);
    assert_eq!(check(), [Signal::Next(2)]);

    context.advance(delay * 10);
    assert_eq!(check(), []);
}

#[test]
fn test_debounce_forwards_stop_immediately() {
    let (context, graph) = manual_graph();
    let keystrokes = graph.source::<i32>();
    let settled = keystrokes.debounce(Duration::from_millis(100));
    let (listener, check) = watcher();
    let _guard = settled.subscribe(listener);

    keystrokes.send(1);
    keystrokes.stop();
    context.run_until_idle();
    assert_eq!(check(), [Signal::Stop]);

    // the pending timer still fires but has nowhere to deliver
    context.advance(Duration::from_millis(100));
    assert_eq!(check(), []);
}

#[test]
fn test_cached_replays_latest_value_synchronously() {
    let (context, graph) = manual_graph();
    let names = graph.source::<&'static str>();
    let latest = names.cached();
    let (early, check_early) = watcher();
    let _early = latest.subscribe(early);

    names.send("w");
    names.send("x");
    context.run_until_idle();
    assert_eq!(check_early(), [Signal::Next("w"), Signal::Next("x")]);

    let (late, check_late) = watcher();
    let _late = latest.subscribe(late);
    // replayed before any context has run
    assert_eq!(check_late(), [Signal::Next("x")]);

    names.send("y");
    context.run_until_idle();
    assert_eq!(check_late(), [Signal::Next("y")]);
    assert_eq!(check_early(), [Signal::Next("y")]);

    names.stop();
    context.run_until_idle();
    assert_eq!(check_late(), [Signal::Stop]);

    // nothing is held once the stream has stopped
    let (after, check_after) = watcher();
    let _after = latest.subscribe(after);
    context.run_until_idle();
    assert_eq!(check_after(), []);
}

#[test]
fn test_cached_value_stored_during_replay_reaches_the_new_subscriber() {
    let (context, graph) = manual_graph();
    let names = graph.source::<&'static str>();
    let latest = names.cached();
    let _anchor = latest.subscribe(|_: Signal<&'static str>| {});
    names.send("x");
    context.run_until_idle();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let _late = {
        let seen = seen.clone();
        let names = names.clone();
        let context = context.clone();
        // the replay itself pushes a newer value through the whole chain
        latest.subscribe(move |signal: Signal<&'static str>| {
            let first = {
                let mut seen = seen.lock().unwrap();
                seen.push(signal);
                seen.len() == 1
            };
            if first {
                names.send("y");
                context.run_until_idle();
            }
        })
    };

    assert_eq!(*seen.lock().unwrap(), [Signal::Next("x"), Signal::Next("y")]);

    // a later subscriber is replayed the newer value, once
    let (after, check_after) = watcher();
    let _after = latest.subscribe(after);
    context.run_until_idle();
    assert_eq!(check_after(), [Signal::Next("y")]);
}

#[test]
fn test_cached_without_a_value_does_not_replay() {
    let (context, graph) = manual_graph();
    let names = graph.source::<&'static str>();
    let latest = names.cached();
    let (listener, check) = watcher();
    let _guard = latest.subscribe(listener);
    context.run_until_idle();
    assert_eq!(check(), []);
}

#[test]
fn test_flat_map_children_end_independently() {
    let (context, graph) = manual_graph();
    let requests = graph.source::<u32>();
    let children: Arc<Mutex<Vec<Source<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let responses = {
        let graph = graph.clone();
        let children = children.clone();
        requests.flat_map(move |_id: u32| {
            let child = graph.source::<String>();
            children.lock().unwrap().push(child.clone());
            child
        })
    };
    let (listener, check) = watcher();
    let _guard = responses.subscribe(listener);

    requests.send(1);
    requests.send(2);
    context.run_until_idle();
    let (c1, c2) = {
        let children = children.lock().unwrap();
        (children[0].clone(), children[1].clone())
    };

    c1.send("one".to_string());
    c1.stop();
    c2.send("two".to_string());
    context.run_until_idle();

    // C1 stopped, the flattened stream did not
    assert_eq!(check(), [Signal::Next("one".to_string()), Signal::Next("two".to_string())]);
    assert!(!responses.is_stopped());
    assert_eq!(c1.subscriber_count(), 0);
    assert_eq!(c2.subscriber_count(), 2);

    requests.stop();
    context.run_until_idle();
    assert_eq!(check(), [Signal::Stop]);
    // every child has been released
    assert_eq!(c2.subscriber_count(), 0);

    c2.send("too late".to_string());
    context.run_until_idle();
    assert_eq!(check(), []);
}

#[test]
fn test_flat_map_over_finite_children() {
    let (context, graph) = manual_graph();
    let ids = graph.source::<u32>();
    let fetched = {
        let graph = graph.clone();
        ids.flat_map(move |id| graph.just(id * 100))
    };
    let (listener, check) = watcher();
    let _guard = fetched.subscribe(listener);

    ids.send(1);
    ids.send(2);
    context.run_until_idle();
    assert_eq!(check(), [Signal::Next(100), Signal::Next(200)]);

    ids.stop();
    context.run_until_idle();
    assert_eq!(check(), [Signal::Stop]);
}

#[test]
fn test_merge_ends_on_first_stop() {
    let (main, graph) = manual_graph();
    let a_context = ManualContext::new("a");
    let b_context = ManualContext::new("b");
    let a = Source::on(&graph, a_context.clone());
    let b = Source::on(&graph, b_context.clone());
    let merged = a.merge(&b);
    assert_eq!(merged.production_context().name(), "main");

    let (listener, check) = watcher();
    let _guard = merged.subscribe(listener);

    a.send("a1");
    b.send("b1");
    settle(&[&main, &a_context, &b_context]);
    let mut seen = check();
    seen.sort_by_key(|signal| format!("{signal:?}"));
    assert_eq!(seen, [Signal::Next("a1"), Signal::Next("b1")]);

    a.stop();
    settle(&[&main, &a_context, &b_context]);
    assert_eq!(check(), [Signal::Stop]);

    b.send("b2");
    b.stop();
    settle(&[&main, &a_context, &b_context]);
    assert_eq!(check(), []);
}

#[test]
fn test_side_effects_observe_without_altering() {
    let (context, graph) = manual_graph();
    let numbers = graph.source::<i32>();
    let log = Arc::new(Mutex::new(Vec::new()));

    let observed = {
        let all = log.clone();
        let nexts = log.clone();
        let stops = log.clone();
        numbers
            .side_effect(move |signal: &Signal<i32>| all.lock().unwrap().push(format!("signal {signal:?}")))
            .on_next(move |n: &i32| nexts.lock().unwrap().push(format!("next {n}")))
            .on_stop(move || stops.lock().unwrap().push("stop".to_string()))
    };
    let (listener, check) = watcher();
    let _guard = observed.subscribe(listener);

    // each stage runs as its own task, so settle between signals to keep the log readable
    numbers.send(5);
    context.run_until_idle();
    numbers.stop();
    context.run_until_idle();

    assert_eq!(check(), [Signal::Next(5), Signal::Stop]);
    assert_eq!(*log.lock().unwrap(), ["signal Next(5)", "next 5", "signal Stop", "stop"]);
}

#[test]
fn test_switch_context_rehomes_the_next_combinator() {
    let (main, graph) = manual_graph();
    let worker = ManualContext::new("worker");
    let numbers = graph.source::<i32>();
    let switched = numbers.switch_context(Placement::default().transform_on(worker.clone()));
    assert_eq!(switched.transformation_context().map(|c| c.name().to_string()).as_deref(), Some("worker"));

    let on_worker = Arc::new(Mutex::new(Vec::new()));
    let mapped = {
        let on_worker = on_worker.clone();
        let worker = worker.clone();
        switched.map(move |n| {
            // the map runs while the worker is being pumped
            on_worker.lock().unwrap().push(worker.pending());
            n * 3
        })
    };
    let (listener, check) = watcher();
    let _guard = mapped.subscribe(listener);

    numbers.send(2);
    main.run_until_idle();
    assert_eq!(worker.pending(), 1);
    assert_eq!(check(), []);

    worker.run_until_idle();
    main.run_until_idle();
    // delivery to the map happened on main, the map itself waits for the worker
    assert_eq!(worker.pending(), 1);
    assert!(on_worker.lock().unwrap().is_empty());

    worker.run_until_idle();
    assert_eq!(on_worker.lock().unwrap().len(), 1);
    main.run_until_idle();
    assert_eq!(check(), [Signal::Next(6)]);
}
