//! waypoint CLI — driving adapter for the navigation routing engine.
//!
//! Subcommands:
//! - `resolve <table> <uri> [--method M] [--trace]` — dispatch a uri
//!   against a route table; actions print their labels
//! - `check <table>` — validate a route table loads without errors
//! - `info <table>` — print a table's routes and action labels
//!
//! Tables are JSON or YAML documents (picked by file extension).

use std::collections::BTreeSet;
use std::process;
use std::sync::{Arc, Mutex};

use waypoint::{
    ActionRegistry, ActionRegistryBuilder, CallOptions, Parameters, RouteConfig, RouteMethod,
    RouteTableConfig, Router,
};
use waypoint_test::TestSpawner;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "resolve" => cmd_resolve(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "info" => cmd_info(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        return Err("resolve requires a table file and a uri".into());
    }

    let table = load_table(&args[0])?;
    let uri = &args[1];
    let mut method = RouteMethod::Empty;
    let mut trace = false;

    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--method" => {
                let value = rest
                    .next()
                    .ok_or_else(|| "--method requires a value".to_string())?;
                method = RouteMethod::parse(value);
            }
            "--trace" => trace = true,
            other => return Err(format!("unknown flag \"{other}\"")),
        }
    }

    let spawner = TestSpawner::new();
    let router = Router::new(spawner.clone());
    let registry = echo_registry(&table);
    registry
        .load_route_table(&router, &table)
        .map_err(|e| format!("table load failed: {e}"))?;

    if trace {
        print_trace(&router, uri, &method);
    }

    let failure: Arc<Mutex<Option<String>>> = Arc::default();
    let sink = failure.clone();
    router.on_call_failed(move |_call, error| {
        *sink.lock().unwrap() = Some(error.to_string());
    });

    router
        .dispatch(
            CallOptions::uri(uri.clone())
                .with_method(method)
                .with_parameters(Parameters::new()),
        )
        .map_err(|e| e.to_string())?;
    spawner.drain();

    let failure = failure.lock().unwrap();
    match failure.as_ref() {
        Some(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
        None => Ok(()),
    }
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a table file path".into());
    }

    let table = load_table(&args[0])?;
    let router = Router::new(TestSpawner::new());
    echo_registry(&table)
        .load_route_table(&router, &table)
        .map_err(|e| format!("table load failed: {e}"))?;

    println!("ok");
    Ok(())
}

fn cmd_info(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("info requires a table file path".into());
    }

    let table = load_table(&args[0])?;
    let mut labels = BTreeSet::new();
    collect_labels(&table.routes, &mut labels);

    println!("routes:");
    print_routes(&table.routes, "", 1);
    println!("actions:");
    for label in labels {
        println!("  {label}");
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn load_table(path: &str) -> Result<RouteTableConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;

    if path.ends_with(".json") {
        RouteTableConfig::from_json_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| format!("invalid route table: {e}"))
    }
}

/// Every action label in the table becomes a handler printing itself —
/// enough to see which route a uri lands on.
fn echo_registry(table: &RouteTableConfig) -> ActionRegistry {
    let mut labels = BTreeSet::new();
    collect_labels(&table.routes, &mut labels);

    let mut builder = ActionRegistryBuilder::new();
    for label in labels {
        let tag = label.clone();
        builder = builder.action(label, move || {
            let tag = tag.clone();
            waypoint::handler(move |_ctx| {
                let tag = tag.clone();
                async move {
                    println!("{tag}");
                    Ok(())
                }
            })
        });
    }
    builder.build()
}

fn collect_labels(routes: &[RouteConfig], out: &mut BTreeSet<String>) {
    for route in routes {
        if let Some(action) = &route.action {
            out.insert(action.clone());
        }
        collect_labels(&route.children, out);
    }
}

fn print_routes(routes: &[RouteConfig], prefix: &str, depth: usize) {
    for route in routes {
        let indent = "  ".repeat(depth);
        let mut line = format!("{indent}{prefix}{}", route.path);
        if let Some(method) = &route.method {
            line.push_str(&format!(" [{method}]"));
        }
        if let Some(name) = &route.name {
            line.push_str(&format!(" (name: {name})"));
        }
        if let Some(action) = &route.action {
            line.push_str(&format!(" -> {action}"));
        }
        println!("{line}");
        print_routes(&route.children, &format!("{prefix}{}", route.path), depth + 1);
    }
}

fn print_trace(router: &Router, uri: &str, method: &RouteMethod) {
    let trace = router.probe(uri, method);
    for step in &trace.steps {
        println!("at {} (segment {})", step.node, step.segment_index);
        for candidate in &step.candidates {
            let marker = if candidate.entered { " <- entered" } else { "" };
            println!("  {} => {}{marker}", candidate.selector, candidate.evaluation);
        }
    }
    match &trace.result {
        Some(resolution) => {
            println!("matched with parameters:");
            for (name, values) in resolution.parameters.iter() {
                println!("  {name} = {values:?}");
            }
        }
        None => println!("no match"),
    }
}

fn print_usage() {
    eprintln!(
        "waypoint — navigation route table tool

USAGE:
    waypoint resolve <table> <uri> [--method M] [--trace]
    waypoint check <table>
    waypoint info <table>

Tables are JSON or YAML documents:

    routes:
      - path: /home
        action: show_home
      - path: /users
        children:
          - path: /{{id}}
            name: user_detail
            method: PUSH
            action: show_user"
    );
}
