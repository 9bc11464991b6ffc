//! Resolution conformance: competing routes, optional absence, name
//! uniqueness, tail-card registration, unmatched-route failure flow.

use std::sync::{Arc, Mutex};

use waypoint::prelude::*;
use waypoint_test::fixture::RouterFixture;

#[test]
fn competing_routes_rank_by_quality() {
    let fixture = RouterFixture::competing_routes();

    // `/path` → the exact literal, not the optional or tailcard variants.
    fixture.router.dispatch(CallOptions::uri("/path")).unwrap();
    fixture.spawner.drain();
    assert_eq!(fixture.book.rendered(), ["exact"]);

    // `/path/123` → the required parameter beats optional and tailcard.
    fixture.book.clear();
    fixture
        .router
        .dispatch(CallOptions::uri("/path/123"))
        .unwrap();
    fixture.spawner.drain();
    assert_eq!(fixture.book.rendered(), ["required"]);

    // `/path/a/b/c` → only the tailcard can span three segments.
    fixture.book.clear();
    fixture
        .router
        .dispatch(CallOptions::uri("/path/a/b/c"))
        .unwrap();
    fixture.spawner.drain();
    assert_eq!(fixture.book.rendered(), ["tailcard"]);
}

#[test]
fn tailcard_captures_every_segment() {
    let fixture = RouterFixture::competing_routes();
    let trace = fixture
        .router
        .probe("/path/a/b/c", &RouteMethod::Empty);

    let resolution = trace.result.expect("tailcard should match");
    assert_eq!(
        resolution.parameters.get_all("param"),
        Some(&["a".to_string(), "b".to_string(), "c".to_string()][..]),
    );
}

#[test]
fn optional_absence_means_no_key() {
    let fixture = RouterFixture::empty();
    let seen: Arc<Mutex<Vec<(bool, Option<String>)>>> = Arc::default();
    let sink = seen.clone();
    fixture
        .router
        .handle(
            "/optional/{id?}",
            handler(move |ctx| {
                let sink = sink.clone();
                let present = ctx.parameters().contains("id");
                let value = ctx.parameters().get("id").map(String::from);
                async move {
                    sink.lock().unwrap().push((present, value));
                    Ok(())
                }
            }),
        )
        .unwrap();

    fixture
        .router
        .dispatch(CallOptions::uri("/optional"))
        .unwrap();
    fixture
        .router
        .dispatch(CallOptions::uri("/optional/7"))
        .unwrap();
    fixture.spawner.drain();

    let seen = seen.lock().unwrap();
    // Absent: no key at all, not an empty string.
    assert_eq!(seen[0], (false, None));
    assert_eq!(seen[1], (true, Some("7".to_string())));
}

#[test]
fn duplicate_names_are_rejected() {
    let fixture = RouterFixture::empty();
    fixture
        .router
        .handle_named("/first", "dup", fixture.book.show("first"))
        .unwrap();

    let err = fixture
        .router
        .handle_named("/second", "dup", fixture.book.show("second"))
        .unwrap_err();
    assert!(matches!(err, RouteConfigError::DuplicateRouteName { .. }));
}

#[test]
fn named_dispatch_returns_that_exact_node() {
    let fixture = RouterFixture::empty();
    // Path shape is irrelevant to named lookup.
    fixture
        .router
        .handle_named("/very/{deep}/{path...}", "dup", fixture.book.show("named"))
        .unwrap();

    fixture.router.dispatch(CallOptions::name("dup")).unwrap();
    fixture.spawner.drain();
    assert_eq!(fixture.book.rendered(), ["named"]);
}

#[test]
fn tailcard_must_be_last_at_registration_time() {
    let fixture = RouterFixture::empty();
    let err = fixture
        .router
        .handle("/path/{a...}/extra", fixture.book.show("never"))
        .unwrap_err();
    assert!(matches!(err, RouteConfigError::TailCardNotLast { .. }));

    // Appending below an existing tailcard is the same error.
    fixture
        .router
        .handle("/files/{rest...}", fixture.book.show("files"))
        .unwrap();
    let err = fixture
        .router
        .handle("/files/{rest...}/meta", fixture.book.show("never"))
        .unwrap_err();
    assert!(matches!(err, RouteConfigError::TailCardNotLast { .. }));
}

#[test]
fn unmatched_route_flows_to_failure_hook() {
    let fixture = RouterFixture::empty();
    let failures: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = failures.clone();
    fixture.router.on_call_failed(move |call, error| {
        assert!(matches!(error, CallError::NotFound { .. }));
        sink.lock()
            .unwrap()
            .push(format!("{}: {error}", call.uri()));
    });

    fixture
        .router
        .dispatch(CallOptions::uri("/not/registered"))
        .unwrap();
    fixture.spawner.drain();

    let failures = failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    // The message names the attempted path.
    assert!(failures[0].contains("/not/registered"));
    drop(failures);

    // The dispatcher survives and keeps serving.
    fixture
        .router
        .handle("/alive", fixture.book.show("alive"))
        .unwrap();
    fixture.router.dispatch(CallOptions::uri("/alive")).unwrap();
    fixture.spawner.drain();
    assert_eq!(fixture.book.rendered(), ["alive"]);
}

#[test]
fn regex_routes_capture_named_groups() {
    let fixture = RouterFixture::empty();
    let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();

    let sink = seen.clone();
    fixture
        .router
        .route("/media", |media| {
            media.handle_regex(
                r"(?P<kind>films|shows)/(?P<id>\d+)",
                handler(move |ctx| {
                    let sink = sink.clone();
                    let kind = ctx.parameters().get("kind").unwrap_or("").to_string();
                    let id = ctx.parameters().get("id").unwrap_or("").to_string();
                    async move {
                        sink.lock().unwrap().push((kind, id));
                        Ok(())
                    }
                }),
            )?;
            Ok(())
        })
        .unwrap();

    fixture
        .router
        .dispatch(CallOptions::uri("/media/shows/314"))
        .unwrap();
    fixture.spawner.drain();

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        [("shows".to_string(), "314".to_string())],
    );
}

#[test]
fn probe_traces_the_descent() {
    let fixture = RouterFixture::competing_routes();
    let trace = fixture.router.probe("/path/123", &RouteMethod::Empty);

    assert!(trace.result.is_some());
    let step = trace
        .steps
        .iter()
        .find(|step| step.node == "/path")
        .expect("the /path node was expanded");
    // All three capture children were evaluated; the best was entered.
    assert_eq!(step.candidates.len(), 3);
    assert!(step
        .candidates
        .iter()
        .any(|candidate| candidate.entered && candidate.selector == "{id}"));
}
