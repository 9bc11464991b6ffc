//! `RouteTree` — arena-backed tree of route nodes.
//!
//! Nodes live in a `Vec` and refer to parents and children by [`NodeId`],
//! so the parent back-reference the resolution and pipeline layers need
//! never creates an ownership cycle. Unregistered branches are tombstoned
//! in place; slots are not reused, which keeps every issued `NodeId`
//! stable for the tree's lifetime.

use std::collections::HashMap;

use crate::{
    parse_pattern, Interceptor, Phase, Phases, RouteConfigError, RouteMethod, RouteSelector,
    MAX_ROUTE_DEPTH,
};

/// Stable handle to a node in a [`RouteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

pub(crate) struct RouteNode {
    selector: RouteSelector,
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Phase → registration-ordered interceptors. A `Vec` of pairs keeps
    /// first-registration order for phases too, which the pipeline does
    /// not rely on but traces display.
    interceptors: Vec<(Phase, Vec<Interceptor>)>,
    /// Global creation index; the registration-order tie-break.
    order: usize,
    detached: bool,
}

impl RouteNode {
    fn new(selector: RouteSelector, parent: Option<NodeId>, order: usize) -> Self {
        Self {
            selector,
            name: None,
            parent,
            children: Vec::new(),
            interceptors: Vec::new(),
            order,
            detached: false,
        }
    }
}

/// The route tree: one root, arena storage, and a global name index for
/// O(1) reverse lookup of named routes.
pub struct RouteTree {
    nodes: Vec<RouteNode>,
    names: HashMap<String, NodeId>,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

// Interceptors are closures, so node contents are summarized by hand.
impl std::fmt::Debug for RouteTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTree")
            .field("nodes", &self.nodes.len())
            .field("names", &self.names.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RouteTree {
    /// Create a tree holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            names: HashMap::new(),
        };
        tree.nodes.push(RouteNode::new(RouteSelector::Root, None, 0));
        tree
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The node's selector.
    #[must_use]
    pub fn selector(&self, id: NodeId) -> &RouteSelector {
        &self.node(id).selector
    }

    /// The node's parent, `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The node's children in registration order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The node's registration-order index (global, monotonic).
    #[must_use]
    pub fn order(&self, id: NodeId) -> usize {
        self.node(id).order
    }

    /// The node's registered name, if any.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).name.as_deref()
    }

    /// Whether the node is still reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        !self.node(id).detached
    }

    /// Find or create the child of `parent` with the given selector.
    ///
    /// Idempotent per structural identity: re-registering a selector with
    /// [`same_shape`](RouteSelector::same_shape) returns the existing
    /// child. Distinct literals are distinct children by string.
    ///
    /// # Errors
    ///
    /// - [`RouteConfigError::TailCardNotLast`] if `parent` is a tail-card.
    /// - [`RouteConfigError::DepthExceeded`] past [`MAX_ROUTE_DEPTH`].
    pub fn create_child(
        &mut self,
        parent: NodeId,
        selector: RouteSelector,
    ) -> Result<NodeId, RouteConfigError> {
        if matches!(self.node(parent).selector, RouteSelector::TailCard { .. }) {
            return Err(RouteConfigError::TailCardNotLast {
                pattern: format!("{}/{selector}", self.display_path(parent)),
            });
        }

        if let Some(existing) = self
            .node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).selector.same_shape(&selector))
        {
            return Ok(existing);
        }

        let depth = self.depth_of(parent) + 1;
        if depth > MAX_ROUTE_DEPTH {
            return Err(RouteConfigError::DepthExceeded {
                depth,
                max: MAX_ROUTE_DEPTH,
            });
        }

        let order = self.nodes.len();
        let id = NodeId(order);
        self.nodes.push(RouteNode::new(selector, Some(parent), order));
        self.node_mut(parent).children.push(id);
        Ok(id)
    }

    /// Parse `path` and walk/create one node per descriptor under the
    /// root, appending a method dimension when `method` is given.
    ///
    /// Returns the terminal node.
    pub fn insert_route(
        &mut self,
        path: &str,
        method: Option<RouteMethod>,
    ) -> Result<NodeId, RouteConfigError> {
        self.insert_route_under(self.root(), path, method)
    }

    /// [`insert_route`](Self::insert_route) starting at an inner node.
    pub fn insert_route_under(
        &mut self,
        base: NodeId,
        path: &str,
        method: Option<RouteMethod>,
    ) -> Result<NodeId, RouteConfigError> {
        let mut node = base;
        for segment in parse_pattern(path)? {
            node = self.create_child(node, RouteSelector::from_segment(&segment))?;
        }
        if let Some(method) = method {
            node = self.create_child(node, RouteSelector::Method(method))?;
        }
        Ok(node)
    }

    /// Register `name` for `node` in the global index.
    ///
    /// Blank names are ignored. Re-naming the same node with the same name
    /// is a no-op; any other collision on a non-blank name fails fast.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::DuplicateRouteName`].
    pub fn set_name(&mut self, node: NodeId, name: &str) -> Result<(), RouteConfigError> {
        if name.is_empty() {
            return Ok(());
        }
        match self.names.get(name) {
            Some(&existing) if existing == node => Ok(()),
            Some(_) => Err(RouteConfigError::DuplicateRouteName {
                name: name.to_string(),
            }),
            None => {
                self.node_mut(node).name = Some(name.to_string());
                self.names.insert(name.to_string(), node);
                Ok(())
            }
        }
    }

    /// Look up a node by its registered name.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Append an interceptor to `phase` on `node`.
    pub fn add_interceptor(&mut self, node: NodeId, phase: Phase, interceptor: Interceptor) {
        let slots = &mut self.node_mut(node).interceptors;
        match slots.iter_mut().find(|(p, _)| *p == phase) {
            Some((_, list)) => list.push(interceptor),
            None => slots.push((phase, vec![interceptor])),
        }
    }

    /// Whether the node owns at least one interceptor in any phase.
    ///
    /// Nodes without interceptors are structural: resolution passes
    /// through them but never terminates on them.
    #[must_use]
    pub fn has_interceptors(&self, node: NodeId) -> bool {
        self.node(node)
            .interceptors
            .iter()
            .any(|(_, list)| !list.is_empty())
    }

    /// The root-to-node ancestor chain, inclusive.
    #[must_use]
    pub fn ancestor_chain(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = self.node(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Collect the full pipeline for a resolved node: phases in `phases`
    /// order, and within each phase the root-to-leaf chain's interceptors
    /// in registration order.
    #[must_use]
    pub fn collect_pipeline(&self, node: NodeId, phases: &Phases) -> Vec<Interceptor> {
        let chain = self.ancestor_chain(node);
        let mut pipeline = Vec::new();
        for phase in phases.iter() {
            for &id in &chain {
                if let Some((_, list)) = self
                    .node(id)
                    .interceptors
                    .iter()
                    .find(|(p, _)| p == phase)
                {
                    pipeline.extend(list.iter().cloned());
                }
            }
        }
        pipeline
    }

    /// Detach `node` (and its whole subtree) from the tree.
    ///
    /// The parent keeps existing even if it is now childless — parents are
    /// never auto-pruned. Name-index entries of the detached subtree are
    /// dropped. Detaching the root is a no-op.
    pub fn unregister(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).parent else {
            return;
        };
        self.node_mut(parent).children.retain(|&child| child != node);

        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            self.node_mut(id).detached = true;
            if let Some(name) = self.node(id).name.clone() {
                self.names.remove(&name);
            }
            pending.extend(self.node(id).children.clone());
        }
    }

    /// Human-readable path of a node, for errors and traces.
    #[must_use]
    pub fn display_path(&self, node: NodeId) -> String {
        let chain = self.ancestor_chain(node);
        let mut path = String::new();
        for &id in chain.iter().skip(1) {
            path.push('/');
            path.push_str(&self.node(id).selector.to_string());
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    fn depth_of(&self, node: NodeId) -> usize {
        self.ancestor_chain(node).len() - 1
    }

    fn node(&self, id: NodeId) -> &RouteNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut RouteNode {
        &mut self.nodes[id.0]
    }
}
