//! Tests for `EventEmitter::emit` fan-out.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use typed_emitter::{EventEmitter, Listener};

/// Helper: create a shared call-log that listeners append to.
fn make_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Helper: a listener that logs `tag` followed by its string arguments.
fn logging(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Listener<[Value]> {
    let log = Arc::clone(log);
    Listener::new(move |args: &[Value]| {
        let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        log.lock().unwrap().push(format!("{tag}({})", rendered.join(",")));
    })
}

// ============================================================================
// Basic dispatch
// ============================================================================

#[test]
fn emit_without_listeners_returns_false() {
    let emitter: EventEmitter = EventEmitter::new();
    assert!(!emitter.emit("nobody", &[json!(1)]));
    assert!(emitter.event_names().is_empty());
    assert_eq!(emitter.listener_count("nobody"), 0);
}

#[test]
fn emit_calls_listener_once_with_arguments() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("pair", logging(&log, "f"));
    let delivered = emitter.emit("pair", &[json!("a"), json!(2)]);

    assert!(delivered);
    assert_eq!(*log.lock().unwrap(), vec![r#"f("a",2)"#]);
}

#[test]
fn emit_with_no_arguments() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("tick", logging(&log, "t"));
    assert!(emitter.emit("tick", &[]));

    assert_eq!(*log.lock().unwrap(), vec!["t()"]);
}

#[test]
fn login_listeners_run_in_registration_order() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter
        .on("login", logging(&log, "f"))
        .on("login", logging(&log, "g"));

    assert!(emitter.emit("login", &[json!("alice")]));
    assert_eq!(*log.lock().unwrap(), vec![r#"f("alice")"#, r#"g("alice")"#]);
}

#[test]
fn same_listener_registered_twice_runs_twice() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();
    let f = logging(&log, "f");

    emitter.on("e", f.clone()).on("e", f.clone());
    emitter.emit("e", &[]);

    assert_eq!(log.lock().unwrap().len(), 2);
    assert_eq!(emitter.listener_count("e"), 2);
}

#[test]
fn emit_only_reaches_listeners_of_that_event() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("a", logging(&log, "a")).on("b", logging(&log, "b"));
    emitter.emit("b", &[]);

    assert_eq!(*log.lock().unwrap(), vec!["b()"]);
}

#[test]
fn add_listener_is_an_alias_of_on() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.add_listener("e", logging(&log, "x"));
    emitter.emit("e", &[]);

    assert_eq!(*log.lock().unwrap(), vec!["x()"]);
}

#[test]
fn custom_payload_type() {
    let emitter: EventEmitter<i32> = EventEmitter::new();
    let total = Arc::new(Mutex::new(0));
    let total_clone = Arc::clone(&total);

    emitter.on("add", Listener::new(move |n: &i32| *total_clone.lock().unwrap() += *n));
    emitter.emit("add", &2);
    emitter.emit("add", &3);

    assert_eq!(*total.lock().unwrap(), 5);
}

// ============================================================================
// Snapshot semantics during emit
// ============================================================================

#[test]
fn listener_added_during_emit_is_not_called_in_current_emission() {
    let emitter: Arc<EventEmitter> = Arc::new(EventEmitter::new());
    let log = make_log();

    {
        let emitter_clone = Arc::clone(&emitter);
        let log_clone = Arc::clone(&log);
        emitter.on(
            "e",
            Listener::new(move |_: &[Value]| {
                log_clone.lock().unwrap().push("first".to_string());
                emitter_clone.on("e", logging(&log_clone, "second"));
            }),
        );
    }

    emitter.emit("e", &[]);
    assert_eq!(*log.lock().unwrap(), vec!["first"]);

    // The added listener takes part from the next emission on.
    emitter.emit("e", &[]);
    assert_eq!(*log.lock().unwrap(), vec!["first", "first", "second()"]);
}

#[test]
fn listener_removed_during_emit_is_still_called_snapshot_semantics() {
    let emitter: Arc<EventEmitter> = Arc::new(EventEmitter::new());
    let log = make_log();
    let victim = logging(&log, "victim");

    {
        let emitter_clone = Arc::clone(&emitter);
        let victim_clone = victim.clone();
        let log_clone = Arc::clone(&log);
        emitter.on(
            "e",
            Listener::new(move |_: &[Value]| {
                log_clone.lock().unwrap().push("remover".to_string());
                emitter_clone.off("e", &victim_clone);
            }),
        );
    }
    emitter.on("e", victim.clone());

    emitter.emit("e", &[]);
    assert_eq!(*log.lock().unwrap(), vec!["remover", "victim()"]);

    // Removal takes effect for the next emission.
    emitter.emit("e", &[]);
    assert_eq!(*log.lock().unwrap(), vec!["remover", "victim()", "remover"]);
}

#[test]
fn listener_can_emit_reentrantly() {
    let emitter: Arc<EventEmitter> = Arc::new(EventEmitter::new());
    let log = make_log();

    {
        let emitter_clone = Arc::clone(&emitter);
        emitter.on(
            "outer",
            Listener::new(move |_: &[Value]| {
                emitter_clone.emit("inner", &[json!(true)]);
            }),
        );
    }
    emitter.on("inner", logging(&log, "inner"));

    assert!(emitter.emit("outer", &[]));
    assert_eq!(*log.lock().unwrap(), vec!["inner(true)"]);
}

// ============================================================================
// Panics propagate — no error isolation between listeners
// ============================================================================

#[test]
fn panicking_listener_propagates_and_prevents_subsequent_calls() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("e", Listener::new(|_: &[Value]| panic!("first panics")));
    emitter.on("e", logging(&log, "second"));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        emitter.emit("e", &[]);
    }));

    assert!(result.is_err(), "emit should propagate panics from listeners");
    assert!(
        log.lock().unwrap().is_empty(),
        "second listener should not be called after first panics"
    );

    // The registry is untouched by the unwind.
    assert_eq!(emitter.listener_count("e"), 2);
}
