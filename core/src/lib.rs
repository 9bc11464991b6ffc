//! waypoint - client-side navigation routing engine
//!
//! A routing engine for navigation stacks: URIs and route names resolve
//! through a tree of path selectors to a handler, and every dispatched call
//! runs through an ordered, phase-grouped interceptor pipeline.
//!
//! # Architecture
//!
//! The engine is split along the data flow:
//!
//! - [`PathSegment`] — Parsed pattern descriptors (`/users/{id}`, `{rest...}`)
//! - [`RouteSelector`] — Matching strategy on a tree edge, ranked by [`MatchQuality`]
//! - [`RouteTree`] — Arena-backed tree of nodes with per-phase interceptors
//! - [`resolve_path`]/[`resolve_name`] — Greedy best-first descent with backtracking
//! - [`Phases`]/[`Flow`] — Ordered pipeline phases and the explicit proceed/finish sentinel
//! - [`Router`] — Process-facing dispatcher: builds calls, schedules pipelines,
//!   applies navigation-stack transitions, re-enters on redirects
//!
//! # Key Design Insights
//!
//! 1. **Arena tree, handle parents**: nodes live in a `Vec` and refer to their
//!    parent by [`NodeId`]. No `Rc` cycles, and ancestor-chain collection for
//!    the pipeline is a simple index walk.
//!
//! 2. **Greedy descent is the contract**: when several children match, the
//!    best [`MatchQuality`] is entered first and the first fully-consumed
//!    handler-bearing descendant wins. This is deliberately *not* global
//!    optimality — callers depend on the documented tie-break.
//!
//! 3. **Explicit `Flow` sentinel**: interceptors return [`Flow::Proceed`] or
//!    [`Flow::Finish`]; short-circuiting is visible in the signature instead
//!    of hidden in captured continuations.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use futures::future::BoxFuture;
//! use waypoint::prelude::*;
//!
//! // A spawner that runs dispatched work inline (tests and examples only;
//! // real hosts hand the core their UI scheduler).
//! let router = Router::new(|task: BoxFuture<'static, ()>| futures::executor::block_on(task));
//!
//! let seen: Arc<std::sync::Mutex<Vec<String>>> = Arc::default();
//! let log = seen.clone();
//! router
//!     .handle("/users/{id}", handler(move |ctx| {
//!         let log = log.clone();
//!         async move {
//!             log.lock().unwrap().push(ctx.parameters().get("id").unwrap_or("").to_string());
//!             Ok(())
//!         }
//!     }))
//!     .unwrap();
//!
//! router.push("/users/42", Parameters::new()).unwrap();
//! assert_eq!(seen.lock().unwrap().as_slice(), ["42".to_string()]);
//! assert_eq!(router.stack_len(), 1);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod attributes;
mod call;
mod dispatch;
mod method;
mod params;
mod path;
mod phase;
mod pipeline;
mod record;
mod resolve;
mod selector;
mod spawn;
mod stack;
mod trace;
mod tree;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use attributes::{AttributeKey, Attributes};
pub use call::Call;
pub use dispatch::{CallOptions, Router, RouteScope};
pub use method::RouteMethod;
pub use params::Parameters;
pub use path::{parse_pattern, split_path, split_query, PathSegment};
pub use phase::{Phase, Phases};
pub use pipeline::{handler, interceptor, CallContext, Flow, Interceptor};
pub use record::CallRecord;
pub use resolve::{resolve_name, resolve_path, resolve_path_with_trace, Resolution};
pub use selector::{EvalInput, Evaluation, MatchQuality, RouteSelector};
pub use spawn::Spawner;
pub use stack::NavigationStack;
pub use trace::{CandidateTrace, ResolveStep, ResolveTrace};
pub use tree::{NodeId, RouteTree};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{RouteConfig, RouteTableConfig};
#[cfg(feature = "registry")]
pub use registry::{ActionRegistry, ActionRegistryBuilder};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use waypoint::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        handler,
        interceptor,
        Attributes,
        Call,
        CallContext,
        CallError,
        CallOptions,
        CallRecord,
        Flow,
        MatchQuality,
        Parameters,
        Phase,
        RouteConfigError,
        RouteMethod,
        Router,
        Spawner,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth of the route tree (segments along one branch).
///
/// Protects against runaway recursion during resolution. Enforced when a
/// route is registered, not when a call is dispatched.
pub const MAX_ROUTE_DEPTH: usize = 32;

/// Maximum length for a route pattern string.
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum length for regex route patterns.
///
/// Regex compilation is expensive even with the linear-time Rust `regex`
/// crate. Shorter limit than [`MAX_PATTERN_LENGTH`] because regex complexity
/// scales faster than literal matching.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

use std::sync::Arc;

/// Errors raised while a route tree is being configured.
///
/// These are caught at registration time, never at dispatch time. Fix the
/// route table and rebuild — the core does not retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteConfigError {
    /// Two distinct terminal nodes were registered with the same name.
    DuplicateRouteName {
        /// The name registered twice.
        name: String,
    },
    /// A segment was appended after a `{param...}` tail-card.
    TailCardNotLast {
        /// The offending pattern.
        pattern: String,
    },
    /// A pattern segment could not be parsed.
    InvalidPattern {
        /// The pattern that failed to parse.
        pattern: String,
        /// What was wrong with it.
        source: String,
    },
    /// A pattern exceeds [`MAX_PATTERN_LENGTH`] (or the regex limit).
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// An event name contained a path separator.
    InvalidEventName {
        /// The rejected event name.
        name: String,
    },
    /// A phase referenced by `insert_before`/`insert_after` is not registered.
    UnknownPhase {
        /// The missing anchor phase.
        phase: String,
    },
    /// A route table referenced an action label that is not registered.
    UnknownAction {
        /// The unregistered label.
        action: String,
        /// Labels that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },
    /// A registered route nests deeper than [`MAX_ROUTE_DEPTH`].
    DepthExceeded {
        /// Actual depth of the branch.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// Route-table deserialization or construction failed.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
}

impl std::fmt::Display for RouteConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRouteName { name } => {
                write!(f, "duplicate route name \"{name}\"")
            }
            Self::TailCardNotLast { pattern } => {
                write!(
                    f,
                    "tailcard must be the last segment of \"{pattern}\""
                )
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern \"{pattern}\": {source}")
            }
            Self::PatternTooLong { len, max } => {
                write!(f, "pattern length is {len}, but maximum allowed is {max}")
            }
            Self::InvalidEventName { name } => {
                write!(f, "event name \"{name}\" must not contain '/'")
            }
            Self::UnknownPhase { phase } => {
                write!(f, "phase \"{phase}\" is not registered")
            }
            Self::UnknownAction { action, available } => {
                write!(f, "unknown action \"{action}\"")?;
                if available.is_empty() {
                    write!(f, " — no actions are registered")
                } else {
                    write!(f, " — registered: {}", available.join(", "))
                }
            }
            Self::DepthExceeded { depth, max } => {
                write!(
                    f,
                    "route depth is {depth}, but maximum allowed is {max}"
                )
            }
            Self::InvalidConfig { source } => {
                write!(f, "invalid route table: {source}")
            }
        }
    }
}

impl std::error::Error for RouteConfigError {}

/// Errors raised while a call is being dispatched or executed.
///
/// All of these funnel through the router's `on_call_failed` hooks so a
/// single status-page-style handler can cover resolution misses and handler
/// failures uniformly.
#[derive(Debug, Clone)]
pub enum CallError {
    /// No registered route consumed the attempted path.
    NotFound {
        /// The path that was attempted.
        path: String,
    },
    /// A call was constructed with neither a name nor a uri.
    MissingAddress,
    /// A named route exists in the index but its branch was unregistered.
    DetachedRoute {
        /// The stale route name.
        name: String,
    },
    /// A handler required a parameter the call did not carry.
    ///
    /// The bad-request-style validation subtype: structured context, same
    /// failure-hook path as any other handler error.
    BadParameter {
        /// The missing or malformed parameter.
        name: String,
        /// Why it was rejected.
        source: String,
    },
    /// A handler or interceptor failed.
    Handler {
        /// The underlying failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl CallError {
    /// Wrap an arbitrary error as a handler failure.
    pub fn handler<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Handler {
            source: Arc::new(source),
        }
    }

    /// Wrap a plain message as a handler failure.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Handler {
            source: Arc::new(HandlerMessage(message.into())),
        }
    }
}

#[derive(Debug)]
struct HandlerMessage(String);

impl std::fmt::Display for HandlerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HandlerMessage {}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "no route found for \"{path}\"")
            }
            Self::MissingAddress => {
                write!(f, "a call must carry a name or a uri")
            }
            Self::DetachedRoute { name } => {
                write!(f, "route named \"{name}\" is no longer attached")
            }
            Self::BadParameter { name, source } => {
                write!(f, "bad parameter \"{name}\": {source}")
            }
            Self::Handler { source } => {
                write!(f, "handler failed: {source}")
            }
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Handler { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}
