//! `Router` — the process-facing dispatcher.
//!
//! A router owns one route tree, one phase registry, one navigation stack
//! and a set of failure hooks. Dispatching builds a [`Call`], resolves it,
//! and schedules the pipeline as one unit of work on the injected
//! [`Spawner`] — the caller is never blocked. Routers nest: a child scope
//! that cannot resolve a named or rooted call bubbles it to its parent,
//! and named calls can cross into sibling scopes for redirect-style
//! hand-offs.
//!
//! The tree is meant to be configured up front; configuring while calls
//! are resolving is not supported (the locks keep it memory-safe, not
//! meaningful).

use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::{
    pipeline, resolve_name, resolve_path, resolve_path_with_trace, split_query, Call, CallContext,
    CallError, Interceptor, NavigationStack, NodeId, Parameters, Phase, Phases, Resolution,
    ResolveTrace, RouteConfigError, RouteMethod, RouteSelector, RouteTree, Spawner,
};

type FailureHook = Arc<dyn Fn(&Arc<Call>, &CallError) + Send + Sync>;

pub(crate) struct RouterInner {
    parent: Option<Weak<RouterInner>>,
    children: Mutex<Vec<Weak<RouterInner>>>,
    tree: RwLock<RouteTree>,
    phases: RwLock<Phases>,
    failure_hooks: RwLock<Vec<FailureHook>>,
    stack: NavigationStack,
    spawner: Arc<dyn Spawner>,
}

impl RouterInner {
    pub(crate) fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    fn report_failure(&self, call: &Arc<Call>, error: &CallError) {
        let hooks = self
            .failure_hooks
            .read()
            .expect("failure hook lock poisoned")
            .clone();
        if hooks.is_empty() {
            // Nothing consumed the failure; surface it instead of
            // swallowing silently.
            eprintln!("waypoint: unhandled call failure: {error}");
            return;
        }
        for hook in hooks {
            hook(call, error);
        }
    }
}

/// Addressing and payload of one dispatch.
///
/// ```
/// use waypoint::{CallOptions, Parameters, RouteMethod};
///
/// let options = CallOptions::uri("/users/42")
///     .with_method(RouteMethod::Push)
///     .with_parameters(Parameters::single("highlight", "true"));
/// # let _ = options;
/// ```
#[derive(Debug, Clone)]
pub struct CallOptions {
    name: String,
    uri: String,
    method: RouteMethod,
    parameters: Parameters,
}

impl CallOptions {
    /// Address a call by uri. Query parameters embedded in the uri are
    /// split off and merged into the call's parameters.
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            uri: uri.into(),
            method: RouteMethod::Empty,
            parameters: Parameters::new(),
        }
    }

    /// Address a call by route name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: String::new(),
            method: RouteMethod::Empty,
            parameters: Parameters::new(),
        }
    }

    /// Set the navigation method.
    #[must_use]
    pub fn with_method(mut self, method: RouteMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the caller parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// The routing engine's entry point. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Create a root router with the host's scheduling context.
    pub fn new(spawner: impl Spawner + 'static) -> Self {
        Self::build(Arc::new(spawner), None)
    }

    /// Create a nested scope sharing this router's spawner.
    ///
    /// Named and rooted calls that miss in the child bubble to the parent;
    /// named calls dispatched on the parent can land in the child. Each
    /// scope keeps its own navigation stack and failure hooks.
    #[must_use]
    pub fn child(&self) -> Self {
        let child = Self::build(
            self.inner.spawner.clone(),
            Some(Arc::downgrade(&self.inner)),
        );
        self.inner
            .children
            .lock()
            .expect("children lock poisoned")
            .push(Arc::downgrade(&child.inner));
        child
    }

    fn build(spawner: Arc<dyn Spawner>, parent: Option<Weak<RouterInner>>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                parent,
                children: Mutex::new(Vec::new()),
                tree: RwLock::new(RouteTree::new()),
                phases: RwLock::new(Phases::new()),
                failure_hooks: RwLock::new(Vec::new()),
                stack: NavigationStack::new(),
                spawner,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<RouterInner>) -> Self {
        Self { inner }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration surface
    // ═══════════════════════════════════════════════════════════════════════

    /// Run a builder closure against the tree root.
    ///
    /// # Errors
    ///
    /// Whatever the closure surfaces; configuration errors are fail-fast.
    pub fn configure<F>(&self, f: F) -> Result<(), RouteConfigError>
    where
        F: FnOnce(&mut RouteScope<'_>) -> Result<(), RouteConfigError>,
    {
        let mut tree = self.inner.tree.write().expect("route tree lock poisoned");
        let phases = self.inner.phases.read().expect("phase lock poisoned").clone();
        let root = tree.root();
        let mut scope = RouteScope {
            tree: &mut tree,
            phases: &phases,
            node: root,
        };
        f(&mut scope)
    }

    /// Register a subtree at `path`.
    ///
    /// # Errors
    ///
    /// Configuration errors from the pattern or the closure.
    pub fn route<F>(&self, path: &str, f: F) -> Result<(), RouteConfigError>
    where
        F: FnOnce(&mut RouteScope<'_>) -> Result<(), RouteConfigError>,
    {
        self.configure(|scope| scope.route(path, f).map(|_| ()))
    }

    /// Register a terminal handler at `path`.
    ///
    /// # Errors
    ///
    /// Configuration errors from the pattern.
    pub fn handle(&self, path: &str, handler: Interceptor) -> Result<NodeId, RouteConfigError> {
        self.configure_node(|scope| scope.handle(path, handler))
    }

    /// Register a named terminal handler at `path`.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::DuplicateRouteName`] among the usual pattern
    /// errors.
    pub fn handle_named(
        &self,
        path: &str,
        name: &str,
        handler: Interceptor,
    ) -> Result<NodeId, RouteConfigError> {
        self.configure_node(|scope| {
            let node = scope.handle(path, handler)?;
            scope.tree.set_name(node, name)?;
            Ok(node)
        })
    }

    /// Register a handler at `path` bound to `method`.
    ///
    /// # Errors
    ///
    /// Configuration errors from the pattern.
    pub fn handle_method(
        &self,
        path: &str,
        method: RouteMethod,
        handler: Interceptor,
    ) -> Result<NodeId, RouteConfigError> {
        self.configure_node(|scope| scope.handle_method(path, method, handler))
    }

    fn configure_node<F>(&self, f: F) -> Result<NodeId, RouteConfigError>
    where
        F: FnOnce(&mut RouteScope<'_>) -> Result<NodeId, RouteConfigError>,
    {
        let mut out = None;
        self.configure(|scope| {
            out = Some(f(scope)?);
            Ok(())
        })?;
        Ok(out.expect("configure_node closure ran"))
    }

    /// Attach a cross-cutting interceptor to the tree root in `phase`.
    ///
    /// This is how plugins (logging, sessions, status pages) wrap every
    /// call of the scope.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::UnknownPhase`] if `phase` was never registered.
    pub fn install(&self, phase: Phase, interceptor: Interceptor) -> Result<(), RouteConfigError> {
        let phases = self.inner.phases.read().expect("phase lock poisoned");
        if !phases.contains(&phase) {
            return Err(RouteConfigError::UnknownPhase {
                phase: phase.name().to_string(),
            });
        }
        drop(phases);

        let mut tree = self.inner.tree.write().expect("route tree lock poisoned");
        let root = tree.root();
        tree.add_interceptor(root, phase, interceptor);
        Ok(())
    }

    /// Register a custom phase before `anchor`.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::UnknownPhase`] for an unknown anchor.
    pub fn add_phase_before(&self, anchor: &Phase, phase: Phase) -> Result<(), RouteConfigError> {
        self.inner
            .phases
            .write()
            .expect("phase lock poisoned")
            .insert_before(anchor, phase)
    }

    /// Register a custom phase after `anchor`.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::UnknownPhase`] for an unknown anchor.
    pub fn add_phase_after(&self, anchor: &Phase, phase: Phase) -> Result<(), RouteConfigError> {
        self.inner
            .phases
            .write()
            .expect("phase lock poisoned")
            .insert_after(anchor, phase)
    }

    /// Detach a registered node (and its subtree) from this scope's tree.
    pub fn unregister(&self, node: NodeId) {
        self.inner
            .tree
            .write()
            .expect("route tree lock poisoned")
            .unregister(node);
    }

    /// Detach the route registered under `name`. Returns whether a node
    /// was found.
    pub fn unregister_named(&self, name: &str) -> bool {
        let mut tree = self.inner.tree.write().expect("route tree lock poisoned");
        match tree.lookup_name(name) {
            Some(node) => {
                tree.unregister(node);
                true
            }
            None => false,
        }
    }

    /// Register a hook receiving `(call, cause)` for every uncaught
    /// pipeline failure and every resolution miss of this scope.
    pub fn on_call_failed<F>(&self, hook: F)
    where
        F: Fn(&Arc<Call>, &CallError) + Send + Sync + 'static,
    {
        self.inner
            .failure_hooks
            .write()
            .expect("failure hook lock poisoned")
            .push(Arc::new(hook));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════

    /// Register an application event handler.
    ///
    /// Events are named routes bound to [`RouteMethod::Event`]; they are
    /// addressed by name only and never by path.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::InvalidEventName`] if `name` is blank or
    /// contains a path separator.
    pub fn handle_event(&self, name: &str, handler: Interceptor) -> Result<(), RouteConfigError> {
        if name.is_empty() || name.contains('/') {
            return Err(RouteConfigError::InvalidEventName {
                name: name.to_string(),
            });
        }

        let mut tree = self.inner.tree.write().expect("route tree lock poisoned");
        let root = tree.root();
        let literal = tree.create_child(root, RouteSelector::Literal(name.to_string()))?;
        let node = tree.create_child(literal, RouteSelector::Method(RouteMethod::Event))?;
        tree.set_name(node, name)?;
        tree.add_interceptor(node, Phase::CALL, handler);
        Ok(())
    }

    /// Emit an application event. Unresolved events bubble to the parent
    /// scope like any named call.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`] for a blank name.
    pub fn emit_event(&self, name: &str, parameters: Parameters) -> Result<(), CallError> {
        self.dispatch(
            CallOptions::name(name)
                .with_method(RouteMethod::Event)
                .with_parameters(parameters),
        )
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════════

    /// Dispatch a call.
    ///
    /// Fails fast if the options carry neither a name nor a uri; every
    /// later failure (resolution miss, handler error) flows through the
    /// failure hooks instead, because execution happens asynchronously on
    /// the injected spawner.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`].
    pub fn dispatch(&self, options: CallOptions) -> Result<(), CallError> {
        if options.name.trim().is_empty() && options.uri.trim().is_empty() {
            return Err(CallError::MissingAddress);
        }
        let inner = self.inner.clone();
        self.inner
            .spawner
            .spawn(Box::pin(async move { run(inner, options).await }));
        Ok(())
    }

    /// Dispatch a [`RouteMethod::Push`] to `uri`.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`].
    pub fn push(&self, uri: impl Into<String>, parameters: Parameters) -> Result<(), CallError> {
        self.dispatch(
            CallOptions::uri(uri)
                .with_method(RouteMethod::Push)
                .with_parameters(parameters),
        )
    }

    /// Dispatch a [`RouteMethod::Push`] to a named route.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`].
    pub fn push_named(
        &self,
        name: impl Into<String>,
        parameters: Parameters,
    ) -> Result<(), CallError> {
        self.dispatch(
            CallOptions::name(name)
                .with_method(RouteMethod::Push)
                .with_parameters(parameters),
        )
    }

    /// Dispatch a [`RouteMethod::Replace`] to `uri`.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`].
    pub fn replace(&self, uri: impl Into<String>, parameters: Parameters) -> Result<(), CallError> {
        self.dispatch(
            CallOptions::uri(uri)
                .with_method(RouteMethod::Replace)
                .with_parameters(parameters),
        )
    }

    /// Dispatch a [`RouteMethod::ReplaceAll`] to `uri`.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`].
    pub fn replace_all(
        &self,
        uri: impl Into<String>,
        parameters: Parameters,
    ) -> Result<(), CallError> {
        self.dispatch(
            CallOptions::uri(uri)
                .with_method(RouteMethod::ReplaceAll)
                .with_parameters(parameters),
        )
    }

    /// Pop the navigation stack.
    ///
    /// A no-op when the stack holds one entry or less — the root entry is
    /// never popped. Otherwise the current top is re-dispatched with
    /// [`RouteMethod::Pop`] carrying `parameters` as the pop result.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`] if a restored stack entry is corrupt.
    pub fn pop(&self, parameters: Parameters) -> Result<(), CallError> {
        if self.inner.stack.len() <= 1 {
            return Ok(());
        }
        let Some(top) = self.inner.stack.top() else {
            return Ok(());
        };
        self.dispatch(CallOptions {
            name: top.name().to_string(),
            uri: top.uri().to_string(),
            method: RouteMethod::Pop,
            parameters,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Stack access
    // ═══════════════════════════════════════════════════════════════════════

    /// Number of retained navigation entries.
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.inner.stack.len()
    }

    /// The current navigation top.
    #[must_use]
    pub fn stack_top(&self) -> Option<Arc<Call>> {
        self.inner.stack.top()
    }

    /// The pending pop result, if the last transition was a pop.
    #[must_use]
    pub fn popped_result(&self) -> Option<Arc<Call>> {
        self.inner.stack.popped_result()
    }

    /// Snapshot the navigation stack for persistence.
    #[must_use]
    pub fn stack_snapshot(&self) -> Vec<crate::CallRecord> {
        self.inner.stack.snapshot()
    }

    /// Restore the navigation stack from persistence records without
    /// dispatching.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`] for corrupt records.
    pub fn stack_restore(&self, records: &[crate::CallRecord]) -> Result<(), CallError> {
        self.inner.stack.restore(records)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Probing
    // ═══════════════════════════════════════════════════════════════════════

    /// Resolve `uri` against this scope's tree, recording the full
    /// descent. Read-only: nothing is dispatched.
    #[must_use]
    pub fn probe(&self, uri: &str, method: &RouteMethod) -> ResolveTrace {
        let (path, _) = split_query(uri);
        let tree = self.inner.tree.read().expect("route tree lock poisoned");
        resolve_path_with_trace(&tree, path, method)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("tree", &*self.inner.tree.read().expect("route tree lock poisoned"))
            .field("stack_len", &self.inner.stack.len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dispatch execution
// ═══════════════════════════════════════════════════════════════════════════════

async fn run(origin: Arc<RouterInner>, options: CallOptions) {
    let (path, query) = split_query(&options.uri);
    // Query parameters sit under explicit caller parameters, which sit
    // under path captures: the most specific source wins a key conflict.
    let base = Parameters::from_pairs(query).overlay(&options.parameters);

    match locate(&origin, &options.name, path, &options.method) {
        Ok((scope, resolution)) => {
            let merged = base.overlay(&resolution.parameters);
            let Ok(call) = Call::new(
                options.method.clone(),
                options.name.clone(),
                options.uri.clone(),
                merged,
            ) else {
                return; // addressability was checked at dispatch time
            };
            let call = Arc::new(call);

            // Collect the pipeline without holding any lock across awaits.
            let chain = {
                let tree = scope.tree.read().expect("route tree lock poisoned");
                let phases = scope.phases.read().expect("phase lock poisoned");
                tree.collect_pipeline(resolution.node, &phases)
            };

            let ctx = CallContext::new(call.clone(), Arc::downgrade(&scope));
            match pipeline::execute(chain, ctx).await {
                Ok(()) => scope.stack.apply(&call),
                Err(error) => scope.report_failure(&call, &error),
            }
        }
        Err(error) => {
            if let Ok(call) = Call::new(
                options.method.clone(),
                options.name.clone(),
                options.uri.clone(),
                base,
            ) {
                origin.report_failure(&Arc::new(call), &error);
            }
        }
    }
}

/// Find the scope and node answering this call.
///
/// Named calls: origin, then ancestors, then a depth-first sweep of the
/// whole scope tree (redirect-style cross-scope hand-off). Path calls:
/// origin, then — for rooted paths only — the ancestor chain. Path-based
/// descent into child scopes is unsupported.
fn locate(
    origin: &Arc<RouterInner>,
    name: &str,
    path: &str,
    method: &RouteMethod,
) -> Result<(Arc<RouterInner>, Resolution), CallError> {
    if !name.trim().is_empty() {
        let mut current = Some(origin.clone());
        while let Some(scope) = current {
            let resolved = resolve_name(
                &scope.tree.read().expect("route tree lock poisoned"),
                name,
            );
            if let Ok(resolution) = resolved {
                return Ok((scope, resolution));
            }
            current = scope.parent.as_ref().and_then(Weak::upgrade);
        }

        if let Some(found) = find_named_below(&topmost(origin), name) {
            return Ok(found);
        }

        return Err(CallError::NotFound {
            path: name.to_string(),
        });
    }

    let local = resolve_path(
        &origin.tree.read().expect("route tree lock poisoned"),
        path,
        method,
    );
    match local {
        Ok(resolution) => Ok((origin.clone(), resolution)),
        Err(miss) => {
            if path.starts_with('/') {
                let mut current = origin.parent.as_ref().and_then(Weak::upgrade);
                while let Some(scope) = current {
                    let resolved = resolve_path(
                        &scope.tree.read().expect("route tree lock poisoned"),
                        path,
                        method,
                    );
                    if let Ok(resolution) = resolved {
                        return Ok((scope, resolution));
                    }
                    current = scope.parent.as_ref().and_then(Weak::upgrade);
                }
            }
            Err(miss)
        }
    }
}

fn topmost(origin: &Arc<RouterInner>) -> Arc<RouterInner> {
    let mut top = origin.clone();
    while let Some(parent) = top.parent.as_ref().and_then(Weak::upgrade) {
        top = parent;
    }
    top
}

fn find_named_below(
    scope: &Arc<RouterInner>,
    name: &str,
) -> Option<(Arc<RouterInner>, Resolution)> {
    if let Ok(resolution) = resolve_name(
        &scope.tree.read().expect("route tree lock poisoned"),
        name,
    ) {
        return Some((scope.clone(), resolution));
    }
    let children = scope
        .children
        .lock()
        .expect("children lock poisoned")
        .clone();
    for child in children {
        if let Some(child) = child.upgrade() {
            if let Some(found) = find_named_below(&child, name) {
                return Some(found);
            }
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder scope
// ═══════════════════════════════════════════════════════════════════════════════

/// A builder cursor over one tree node, handed to
/// [`Router::configure`]/[`Router::route`] closures.
pub struct RouteScope<'a> {
    tree: &'a mut RouteTree,
    phases: &'a Phases,
    node: NodeId,
}

impl RouteScope<'_> {
    /// The node this scope is positioned on.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Descend into (creating as needed) the subtree at `path` and run
    /// the closure there. Returns the subtree's terminal node.
    ///
    /// # Errors
    ///
    /// Pattern errors, or whatever the closure surfaces.
    pub fn route<F>(&mut self, path: &str, f: F) -> Result<NodeId, RouteConfigError>
    where
        F: FnOnce(&mut RouteScope<'_>) -> Result<(), RouteConfigError>,
    {
        let node = self.tree.insert_route_under(self.node, path, None)?;
        let mut scope = RouteScope {
            tree: &mut *self.tree,
            phases: self.phases,
            node,
        };
        f(&mut scope)?;
        Ok(node)
    }

    /// Name the current node for reverse lookup.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::DuplicateRouteName`].
    pub fn named(&mut self, name: &str) -> Result<(), RouteConfigError> {
        self.tree.set_name(self.node, name)
    }

    /// Register a terminal handler at `path` below the current node.
    ///
    /// # Errors
    ///
    /// Pattern errors.
    pub fn handle(&mut self, path: &str, handler: Interceptor) -> Result<NodeId, RouteConfigError> {
        let node = self.tree.insert_route_under(self.node, path, None)?;
        self.tree.add_interceptor(node, Phase::CALL, handler);
        Ok(node)
    }

    /// Register a handler at `path` bound to `method`.
    ///
    /// # Errors
    ///
    /// Pattern errors.
    pub fn handle_method(
        &mut self,
        path: &str,
        method: RouteMethod,
        handler: Interceptor,
    ) -> Result<NodeId, RouteConfigError> {
        let node = self.tree.insert_route_under(self.node, path, Some(method))?;
        self.tree.add_interceptor(node, Phase::CALL, handler);
        Ok(node)
    }

    /// Attach a handler to the current node itself.
    pub fn handle_here(&mut self, handler: Interceptor) {
        self.tree.add_interceptor(self.node, Phase::CALL, handler);
    }

    /// Register a regex child of the current node and hand it a handler.
    /// Named capture groups of `pattern` become call parameters.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::InvalidPattern`] for an uncompilable regex.
    pub fn handle_regex(
        &mut self,
        pattern: &str,
        handler: Interceptor,
    ) -> Result<NodeId, RouteConfigError> {
        let selector = RouteSelector::regex(pattern)?;
        let node = self.tree.create_child(self.node, selector)?;
        self.tree.add_interceptor(node, Phase::CALL, handler);
        Ok(node)
    }

    /// Attach an interceptor to the current node in `phase`.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::UnknownPhase`] if `phase` was never registered
    /// on the owning router.
    pub fn intercept(
        &mut self,
        phase: Phase,
        interceptor: Interceptor,
    ) -> Result<(), RouteConfigError> {
        if !self.phases.contains(&phase) {
            return Err(RouteConfigError::UnknownPhase {
                phase: phase.name().to_string(),
            });
        }
        self.tree.add_interceptor(self.node, phase, interceptor);
        Ok(())
    }

    pub(crate) fn tree(&mut self) -> &mut RouteTree {
        &mut *self.tree
    }
}
