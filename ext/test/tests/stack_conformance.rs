//! Stack conformance: transition invariants, redirect method
//! preservation, pop results, and persistence round-trips.

use std::sync::{Arc, Mutex};

use waypoint::prelude::*;
use waypoint_test::fixture::RouterFixture;

#[test]
fn replace_all_always_leaves_one_entry() {
    let fixture = RouterFixture::screens();
    let r = &fixture.router;

    for _ in 0..3 {
        r.push("/a", Parameters::new()).unwrap();
        r.push("/b", Parameters::new()).unwrap();
        r.replace_all("/home", Parameters::new()).unwrap();
        fixture.spawner.drain();
        assert_eq!(r.stack_len(), 1);
        assert_eq!(r.stack_top().unwrap().uri(), "/home");
    }
}

#[test]
fn pop_never_drops_below_one() {
    let fixture = RouterFixture::screens();
    let r = &fixture.router;

    r.push("/home", Parameters::new()).unwrap();
    r.push("/a", Parameters::new()).unwrap();
    fixture.spawner.drain();

    for _ in 0..5 {
        r.pop(Parameters::new()).unwrap();
        fixture.spawner.drain();
        assert!(r.stack_len() >= 1);
    }
    assert_eq!(r.stack_len(), 1);
    assert_eq!(r.stack_top().unwrap().uri(), "/home");
}

#[test]
fn n_pushes_then_n_pops_restore_the_stack() {
    let fixture = RouterFixture::screens();
    let r = &fixture.router;

    r.push("/home", Parameters::new()).unwrap();
    fixture.spawner.drain();
    let before = r.stack_snapshot();
    let top_before = r.stack_top().unwrap();

    for uri in ["/a", "/b", "/c"] {
        r.push(uri, Parameters::new()).unwrap();
    }
    fixture.spawner.drain();
    assert_eq!(r.stack_len(), 4);

    for _ in 0..3 {
        r.pop(Parameters::new()).unwrap();
        fixture.spawner.drain();
    }

    assert_eq!(r.stack_snapshot(), before);
    assert_eq!(r.stack_top().unwrap().as_ref(), top_before.as_ref());
}

#[test]
fn replace_swaps_only_the_top() {
    let fixture = RouterFixture::screens();
    let r = &fixture.router;

    r.push("/home", Parameters::new()).unwrap();
    r.push("/a", Parameters::new()).unwrap();
    r.replace("/b", Parameters::new()).unwrap();
    fixture.spawner.drain();

    assert_eq!(r.stack_len(), 2);
    assert_eq!(r.stack_top().unwrap().uri(), "/b");
}

#[test]
fn redirect_preserves_the_triggering_method() {
    let fixture = RouterFixture::empty();
    let r = &fixture.router;
    let methods: Arc<Mutex<Vec<String>>> = Arc::default();

    r.handle(
        "/origin",
        handler(|ctx| {
            ctx.redirect_to_path("/other", Parameters::new());
            async { Ok(()) }
        }),
    )
    .unwrap();

    let sink = methods.clone();
    r.handle(
        "/other",
        handler(move |ctx| {
            let sink = sink.clone();
            let method = ctx.method().value().to_string();
            async move {
                sink.lock().unwrap().push(method);
                Ok(())
            }
        }),
    )
    .unwrap();

    r.replace("/origin", Parameters::new()).unwrap();
    fixture.spawner.drain();

    // The redirected call carried Replace, not Push.
    assert_eq!(methods.lock().unwrap().as_slice(), ["REPLACE"]);
    // And the stack converged on the redirect target.
    assert_eq!(r.stack_len(), 1);
    assert_eq!(r.stack_top().unwrap().uri(), "/other");
}

#[test]
fn pop_result_reaches_the_new_top_once() {
    let fixture = RouterFixture::screens();
    let r = &fixture.router;

    r.push("/a", Parameters::new()).unwrap();
    r.push("/b", Parameters::new()).unwrap();
    fixture.spawner.drain();

    r.pop(Parameters::single("choice", "42")).unwrap();
    fixture.spawner.drain();

    let result = r.popped_result().expect("pop result pending");
    assert_eq!(result.parameters().get("choice"), Some("42"));
    assert_eq!(result.method(), &RouteMethod::Pop);
    assert_eq!(r.stack_top().unwrap().uri(), "/a");

    // The next transition of any kind clears the channel.
    r.push("/c", Parameters::new()).unwrap();
    fixture.spawner.drain();
    assert!(r.popped_result().is_none());
}

#[test]
fn pop_on_a_singleton_stack_is_a_no_op() {
    let fixture = RouterFixture::screens();
    let r = &fixture.router;

    r.push("/home", Parameters::new()).unwrap();
    fixture.spawner.drain();
    fixture.book.clear();

    r.pop(Parameters::new()).unwrap();
    fixture.spawner.drain();

    // Nothing dispatched, nothing rendered, nothing popped.
    assert!(fixture.book.rendered().is_empty());
    assert_eq!(r.stack_len(), 1);
    assert!(r.popped_result().is_none());
}

#[test]
fn records_round_trip_calls() {
    let call = Call::new(
        RouteMethod::Push,
        "",
        "/users/42",
        Parameters::from_pairs([("id", "42"), ("tab", "posts")]),
    )
    .unwrap();

    let record = CallRecord::from_call(&call);
    assert_eq!(record.route_method, "PUSH");
    assert_eq!(record.uri, "/users/42");
    assert_eq!(record.parameters["id"], vec!["42"]);

    let restored = record.to_call().unwrap();
    assert_eq!(restored, call);
}

#[test]
fn stack_survives_snapshot_and_restore() {
    let fixture = RouterFixture::screens();
    let r = &fixture.router;

    r.push("/a", Parameters::single("from", "deeplink")).unwrap();
    r.push("/b", Parameters::new()).unwrap();
    fixture.spawner.drain();

    let records = r.stack_snapshot();

    // A fresh router (fresh process) restores the same history.
    let restored = RouterFixture::screens();
    restored.router.stack_restore(&records).unwrap();

    assert_eq!(restored.router.stack_len(), 2);
    let top = restored.router.stack_top().unwrap();
    assert_eq!(top.uri(), "/b");
    assert_eq!(top.method(), &RouteMethod::Push);
    assert_eq!(
        restored.router.stack_snapshot(),
        records,
        "restore is lossless",
    );
}
