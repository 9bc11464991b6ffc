//! Registry conformance: declarative route tables loaded from JSON and
//! YAML documents, and the persistence wire shape.
//!
//! Run with: cargo test -p waypoint-test --features registry

#![cfg(feature = "registry")]

use std::sync::{Arc, Mutex};

use waypoint::prelude::*;
use waypoint::RouteTableConfig;
use waypoint_test::config_fixture::{screen_registry, SAMPLE_TABLE_JSON};
use waypoint_test::fixture::RouterFixture;

#[test]
fn json_table_loads_and_dispatches() {
    let fixture = RouterFixture::empty();
    let registry = screen_registry(&fixture.book);
    let table = RouteTableConfig::from_json_str(SAMPLE_TABLE_JSON).unwrap();
    registry.load_route_table(&fixture.router, &table).unwrap();

    fixture
        .router
        .dispatch(CallOptions::uri("/home"))
        .unwrap();
    // The user entry is PUSH-bound.
    fixture
        .router
        .push("/users/42", Parameters::new())
        .unwrap();
    fixture.spawner.drain();

    assert_eq!(fixture.book.rendered(), ["home", "user"]);
    assert_eq!(fixture.router.stack_len(), 1);
}

#[test]
fn named_entries_resolve_by_name() {
    let fixture = RouterFixture::empty();
    let registry = screen_registry(&fixture.book);
    let table = RouteTableConfig::from_json_str(SAMPLE_TABLE_JSON).unwrap();
    registry.load_route_table(&fixture.router, &table).unwrap();

    fixture
        .router
        .dispatch(
            CallOptions::name("user_detail").with_method(RouteMethod::Push),
        )
        .unwrap();
    fixture.spawner.drain();

    assert_eq!(fixture.book.rendered(), ["user"]);
}

#[test]
fn yaml_tables_deserialize_identically() {
    let yaml = r#"
routes:
  - path: /home
    name: home
    action: show_home
  - path: /users
    children:
      - path: /{id}
        name: user_detail
        method: PUSH
        action: show_user
"#;
    let from_yaml: RouteTableConfig = serde_yaml::from_str(yaml).unwrap();
    let from_json = RouteTableConfig::from_json_str(SAMPLE_TABLE_JSON).unwrap();

    assert_eq!(
        serde_json::to_value(&from_yaml).unwrap(),
        serde_json::to_value(&from_json).unwrap(),
    );
}

#[test]
fn unknown_actions_fail_with_the_alternatives() {
    let fixture = RouterFixture::empty();
    let registry = screen_registry(&fixture.book);
    let table = RouteTableConfig::from_json_str(
        r#"{ "routes": [ { "path": "/oops", "action": "show_oops" } ] }"#,
    )
    .unwrap();

    let err = registry
        .load_route_table(&fixture.router, &table)
        .unwrap_err();
    assert!(matches!(err, RouteConfigError::UnknownAction { .. }));
    let message = err.to_string();
    assert!(message.contains("show_oops"));
    assert!(message.contains("show_home"));
}

#[test]
fn call_records_use_the_wire_field_names() {
    let call = Call::new(
        RouteMethod::ReplaceAll,
        "",
        "/home",
        Parameters::single("tab", "news"),
    )
    .unwrap();
    let record = CallRecord::from_call(&call);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["routeMethod"], "REPLACE_ALL");
    assert_eq!(json["name"], "");
    assert_eq!(json["uri"], "/home");
    assert_eq!(json["parameters"]["tab"][0], "news");

    let parsed: CallRecord = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.to_call().unwrap(), call);
}

#[test]
fn restored_history_round_trips_through_json() {
    let fixture = RouterFixture::empty();
    let registry = screen_registry(&fixture.book);
    let table = RouteTableConfig::from_json_str(SAMPLE_TABLE_JSON).unwrap();
    registry.load_route_table(&fixture.router, &table).unwrap();

    fixture
        .router
        .push("/users/7", Parameters::new())
        .unwrap();
    fixture.spawner.drain();

    // Serialize the whole stack, as a browser-history integration would.
    let json = serde_json::to_string(&fixture.router.stack_snapshot()).unwrap();
    let records: Vec<CallRecord> = serde_json::from_str(&json).unwrap();

    let fresh = RouterFixture::empty();
    registry.load_route_table(&fresh.router, &table).unwrap();
    fresh.router.stack_restore(&records).unwrap();

    assert_eq!(fresh.router.stack_len(), 1);
    assert_eq!(fresh.router.stack_top().unwrap().uri(), "/users/7");
}

#[test]
fn structural_entries_do_not_dispatch() {
    // `/users` exists only to anchor its children; a miss there must
    // leave the router serving later dispatches.
    let failures: Arc<Mutex<usize>> = Arc::default();
    let fixture = RouterFixture::empty();
    let registry = screen_registry(&fixture.book);
    let table = RouteTableConfig::from_json_str(SAMPLE_TABLE_JSON).unwrap();
    registry.load_route_table(&fixture.router, &table).unwrap();

    let sink = failures.clone();
    fixture.router.on_call_failed(move |_call, _error| {
        *sink.lock().unwrap() += 1;
    });

    fixture
        .router
        .dispatch(CallOptions::uri("/users"))
        .unwrap(); // structural node, no handler
    fixture
        .router
        .dispatch(CallOptions::uri("/home"))
        .unwrap();
    fixture.spawner.drain();

    assert_eq!(*failures.lock().unwrap(), 1);
    assert_eq!(fixture.book.rendered(), ["home"]);
}
