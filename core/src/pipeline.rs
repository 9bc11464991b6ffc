//! The call pipeline — phase-ordered interceptors with an explicit
//! proceed/finish sentinel.
//!
//! An interceptor is an async closure over the [`CallContext`]. It returns
//! [`Flow::Proceed`] to hand control to the next interceptor, or
//! [`Flow::Finish`] to short-circuit the remainder of the pipeline for
//! this call. Errors abort the pipeline and are funneled to the router's
//! failure hooks.
//!
//! One call's interceptors run strictly sequentially (an interceptor may
//! suspend, and the call resumes where it left off); distinct calls are
//! independent spawned units and may interleave freely.

use std::future::Future;
use std::sync::{Arc, Weak};

use futures::future::BoxFuture;

use crate::dispatch::RouterInner;
use crate::{Attributes, Call, CallError, CallOptions, Parameters, RouteMethod, Router};

/// Continue-or-stop sentinel returned by every interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next interceptor in the pipeline.
    Proceed,
    /// The call is complete; skip all remaining interceptors.
    Finish,
}

/// A unit of behavior attached to a phase on a route node.
pub type Interceptor =
    Arc<dyn Fn(CallContext) -> BoxFuture<'static, Result<Flow, CallError>> + Send + Sync>;

/// Wrap an async closure as an [`Interceptor`].
///
/// ```
/// use waypoint::{interceptor, Flow};
///
/// let logging = interceptor(|ctx| async move {
///     println!("-> {}", ctx.uri());
///     Ok(Flow::Proceed)
/// });
/// # let _ = logging;
/// ```
pub fn interceptor<F, Fut>(f: F) -> Interceptor
where
    F: Fn(CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Flow, CallError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Wrap an async closure as a terminal handler.
///
/// A handler owns the call: on success it finishes the pipeline, so
/// fallback-phase interceptors never run for handled calls.
pub fn handler<F, Fut>(f: F) -> Interceptor
where
    F: Fn(CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), CallError>> + Send + 'static,
{
    Arc::new(move |ctx| {
        let fut = f(ctx);
        Box::pin(async move { fut.await.map(|()| Flow::Finish) })
    })
}

/// The execution context handed to every interceptor: the resolved call
/// plus a handle back to the dispatching router.
///
/// Cheap to clone; interceptors typically move a clone into their future.
#[derive(Clone)]
pub struct CallContext {
    call: Arc<Call>,
    router: Weak<RouterInner>,
}

impl CallContext {
    pub(crate) fn new(call: Arc<Call>, router: Weak<RouterInner>) -> Self {
        Self { call, router }
    }

    /// The call being executed.
    #[must_use]
    pub fn call(&self) -> &Arc<Call> {
        &self.call
    }

    /// The call's method.
    #[must_use]
    pub fn method(&self) -> &RouteMethod {
        self.call.method()
    }

    /// The call's name (empty for uri-addressed calls).
    #[must_use]
    pub fn name(&self) -> &str {
        self.call.name()
    }

    /// The call's uri (empty for name-addressed calls).
    #[must_use]
    pub fn uri(&self) -> &str {
        self.call.uri()
    }

    /// Caller parameters merged with the captures of the matched branch.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        self.call.parameters()
    }

    /// The call's mutable attribute bag.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        self.call.attributes()
    }

    /// First value of a required parameter.
    ///
    /// # Errors
    ///
    /// [`CallError::BadParameter`] when the key is absent — the
    /// validation-style failure, routed through the same hooks as any
    /// other handler error.
    pub fn require_parameter(&self, name: &str) -> Result<&str, CallError> {
        self.parameters()
            .get(name)
            .ok_or_else(|| CallError::BadParameter {
                name: name.to_string(),
                source: "missing required parameter".to_string(),
            })
    }

    /// The router executing this call, if it is still alive.
    #[must_use]
    pub fn router(&self) -> Option<Router> {
        self.router.upgrade().map(Router::from_inner)
    }

    /// The previous top's result after a pop transition, if one is
    /// pending. Cleared by the next stack transition of any kind.
    #[must_use]
    pub fn popped_result(&self) -> Option<Arc<Call>> {
        self.router
            .upgrade()
            .and_then(|inner| inner.stack().popped_result())
    }

    /// Dispatch a brand-new call to `path`, preserving this call's method.
    ///
    /// Fire-and-forget: the new dispatch is a separate unit of work, and
    /// the remaining interceptors of the current pipeline still run.
    pub fn redirect_to_path(&self, path: impl Into<String>, parameters: Parameters) {
        self.redirect(CallOptions::uri(path).with_parameters(parameters));
    }

    /// Dispatch a brand-new call to the route named `name`, preserving
    /// this call's method.
    pub fn redirect_to_name(&self, name: impl Into<String>, parameters: Parameters) {
        self.redirect(CallOptions::name(name).with_parameters(parameters));
    }

    fn redirect(&self, options: CallOptions) {
        if let Some(inner) = self.router.upgrade() {
            let options = options.with_method(self.call.method().clone());
            // A redirect that cannot be addressed still flows through the
            // failure hooks via the normal dispatch path.
            let _ = Router::from_inner(inner).dispatch(options);
        }
    }
}

impl std::fmt::Debug for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("call", &self.call)
            .finish()
    }
}

/// Run a collected pipeline to completion over one call.
pub(crate) async fn execute(
    pipeline: Vec<Interceptor>,
    ctx: CallContext,
) -> Result<(), CallError> {
    for interceptor in pipeline {
        match interceptor(ctx.clone()).await? {
            Flow::Proceed => {}
            Flow::Finish => break,
        }
    }
    Ok(())
}
