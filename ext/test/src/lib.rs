//! waypoint-test: Test domain for conformance testing
//!
//! Provides a deterministic spawner and a minimal "screen rendering"
//! domain for exercising the routing engine. This is the reference
//! integration that demonstrates how a UI host consumes waypoint: screens
//! are just labels appended to a shared log when their route's handler
//! runs.
//!
//! # Example
//!
//! ```
//! use waypoint_test::prelude::*;
//!
//! let spawner = TestSpawner::new();
//! let router = Router::new(spawner.clone());
//! let book = ScreenBook::new();
//!
//! router.handle("/home", book.show("home")).unwrap();
//! router.push("/home", Parameters::new()).unwrap();
//!
//! // Nothing ran yet — dispatches queue until drained.
//! assert!(book.rendered().is_empty());
//! spawner.drain();
//! assert_eq!(book.rendered(), ["home"]);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use waypoint::{handler, interceptor, Flow, Interceptor, Spawner};


#[cfg(feature = "registry")]
pub mod config_fixture;

/// Deterministic scheduler: spawned units queue in FIFO order and run to
/// completion one at a time when [`drain`](TestSpawner::drain) is called.
///
/// Dispatches (including redirects issued mid-pipeline) are enqueued, not
/// interleaved, which makes concurrent-looking tests fully deterministic —
/// the moral equivalent of the virtual clock a UI host's test harness
/// advances by hand.
#[derive(Clone, Default)]
pub struct TestSpawner {
    queue: Arc<Mutex<VecDeque<BoxFuture<'static, ()>>>>,
}

impl TestSpawner {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued units of work.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().expect("spawner queue poisoned").len()
    }

    /// Run queued units (and any they enqueue) until the queue is empty.
    pub fn drain(&self) {
        loop {
            let task = self
                .queue
                .lock()
                .expect("spawner queue poisoned")
                .pop_front();
            let Some(task) = task else { break };
            futures::executor::block_on(task);
        }
    }
}

impl Spawner for TestSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.queue
            .lock()
            .expect("spawner queue poisoned")
            .push_back(task);
    }
}

/// The test UI: an append-only log of rendered screen labels.
#[derive(Clone, Default)]
pub struct ScreenBook {
    rendered: Arc<Mutex<Vec<String>>>,
}

impl ScreenBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that renders `label` (and finishes the call).
    #[must_use]
    pub fn show(&self, label: impl Into<String>) -> Interceptor {
        let rendered = self.rendered.clone();
        let label = label.into();
        handler(move |_ctx| {
            let rendered = rendered.clone();
            let label = label.clone();
            async move {
                rendered.lock().expect("screen book poisoned").push(label);
                Ok(())
            }
        })
    }

    /// A pass-through interceptor that records `label` and proceeds —
    /// for observing pipeline order around real handlers.
    #[must_use]
    pub fn observe(&self, label: impl Into<String>) -> Interceptor {
        let rendered = self.rendered.clone();
        let label = label.into();
        interceptor(move |_ctx| {
            let rendered = rendered.clone();
            let label = label.clone();
            async move {
                rendered.lock().expect("screen book poisoned").push(label);
                Ok(Flow::Proceed)
            }
        })
    }

    /// Append `label` directly, for observations made outside an
    /// interceptor closure.
    pub fn record(&self, label: impl Into<String>) {
        self.rendered
            .lock()
            .expect("screen book poisoned")
            .push(label.into());
    }

    /// Everything rendered so far, in order.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().expect("screen book poisoned").clone()
    }

    /// Forget the log.
    pub fn clear(&self) {
        self.rendered.lock().expect("screen book poisoned").clear();
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{ScreenBook, TestSpawner};
    pub use waypoint::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint::{CallOptions, Parameters, Router};

    #[test]
    fn spawner_defers_until_drain() {
        let spawner = TestSpawner::new();
        let router = Router::new(spawner.clone());
        let book = ScreenBook::new();
        router.handle("/a", book.show("a")).unwrap();

        router.dispatch(CallOptions::uri("/a")).unwrap();
        assert_eq!(spawner.pending(), 1);
        assert!(book.rendered().is_empty());

        spawner.drain();
        assert_eq!(spawner.pending(), 0);
        assert_eq!(book.rendered(), ["a"]);
    }

    #[test]
    fn drain_runs_work_enqueued_by_work() {
        let spawner = TestSpawner::new();
        let router = Router::new(spawner.clone());
        let book = ScreenBook::new();

        let hop = router.clone();
        router
            .handle(
                "/first",
                handler(move |_ctx| {
                    let hop = hop.clone();
                    async move {
                        // Enqueues a second dispatch while the first runs.
                        let _ = hop.dispatch(CallOptions::uri("/second"));
                        Ok(())
                    }
                }),
            )
            .unwrap();
        router.handle("/second", book.show("second")).unwrap();

        router.dispatch(CallOptions::uri("/first")).unwrap();
        spawner.drain();
        assert_eq!(book.rendered(), ["second"]);
    }

    #[test]
    fn observe_then_show() {
        let spawner = TestSpawner::new();
        let router = Router::new(spawner.clone());
        let book = ScreenBook::new();

        router
            .route("/page", |page| {
                page.intercept(waypoint::Phase::CALL, book.observe("before"))?;
                page.handle_here(book.show("page"));
                Ok(())
            })
            .unwrap();

        router.push("/page", Parameters::new()).unwrap();
        spawner.drain();
        assert_eq!(book.rendered(), ["before", "page"]);
    }
}
