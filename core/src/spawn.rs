//! `Spawner` — the injected scheduling context.
//!
//! The core never creates threads and never blocks. Every dispatched call
//! (and every redirect) becomes one future handed to the host through this
//! trait: a UI shell passes its main-loop scheduler, a server passes its
//! runtime's `spawn`, tests pass a deterministic queue.

use futures::future::BoxFuture;

/// Launches one concurrent unit of work.
///
/// Implemented for plain closures, so the simplest host is one line:
///
/// ```
/// use futures::future::BoxFuture;
/// use waypoint::Router;
///
/// // Runs each dispatched call inline, to completion.
/// let router = Router::new(|task: BoxFuture<'static, ()>| futures::executor::block_on(task));
/// # let _ = router;
/// ```
pub trait Spawner: Send + Sync {
    /// Schedule `task` to run. Must not block the caller indefinitely;
    /// ordering between separately spawned tasks is host-defined.
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

impl<F> Spawner for F
where
    F: Fn(BoxFuture<'static, ()>) + Send + Sync,
{
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self(task)
    }
}
