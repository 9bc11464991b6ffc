//! Route resolution — greedy best-first descent with backtracking.
//!
//! Named calls hit the tree's name index directly. Path calls split the
//! uri into segments and walk the tree: at every node each child selector
//! is evaluated against the unconsumed tail, matching children are ranked
//! by [`MatchQuality`] (registration order breaks ties), and the descent
//! enters the best branch first, backtracking across siblings until a
//! fully-consumed, interceptor-bearing descendant is found.
//!
//! Greedy per-level choice is the documented contract: the first solution
//! found under the best-ranked branch wins even when a lower-ranked
//! sibling hides a "better" global match.

use crate::trace::{CandidateTrace, ResolveStep, ResolveTrace};
use crate::{
    split_path, CallError, Evaluation, EvalInput, MatchQuality, NodeId, Parameters, RouteMethod,
    RouteTree,
};

/// A successful resolution: the matched node and the merged captures of
/// the branch that reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The matched terminal node.
    pub node: NodeId,
    /// Captures merged root-to-leaf; the deepest capture wins a key
    /// conflict.
    pub parameters: Parameters,
}

/// Resolve a call by route name.
///
/// O(1) against the name index; never walks the tree. The indexed node's
/// branch must still be attached.
///
/// # Errors
///
/// - [`CallError::NotFound`] for an unknown name.
/// - [`CallError::DetachedRoute`] if the name survived an `unregister`
///   race (stale index is never followed).
pub fn resolve_name(tree: &RouteTree, name: &str) -> Result<Resolution, CallError> {
    let node = tree
        .lookup_name(name)
        .ok_or_else(|| CallError::NotFound {
            path: name.to_string(),
        })?;
    if !tree.is_attached(node) {
        return Err(CallError::DetachedRoute {
            name: name.to_string(),
        });
    }
    Ok(Resolution {
        node,
        parameters: Parameters::new(),
    })
}

/// Resolve a call by uri path.
///
/// # Errors
///
/// [`CallError::NotFound`] when no branch consumes the whole path.
pub fn resolve_path(
    tree: &RouteTree,
    path: &str,
    method: &RouteMethod,
) -> Result<Resolution, CallError> {
    let segments = split_path(path);
    descend(tree, tree.root(), &segments, 0, method, &Parameters::new(), &mut None)
        .ok_or_else(|| CallError::NotFound {
            path: path.to_string(),
        })
}

/// [`resolve_path`], recording every expanded node and candidate.
#[must_use]
pub fn resolve_path_with_trace(
    tree: &RouteTree,
    path: &str,
    method: &RouteMethod,
) -> ResolveTrace {
    let segments = split_path(path);
    let mut steps = Some(Vec::new());
    let result = descend(
        tree,
        tree.root(),
        &segments,
        0,
        method,
        &Parameters::new(),
        &mut steps,
    );
    ResolveTrace {
        result,
        steps: steps.unwrap_or_default(),
    }
}

fn descend(
    tree: &RouteTree,
    node: NodeId,
    segments: &[&str],
    index: usize,
    method: &RouteMethod,
    acc: &Parameters,
    steps: &mut Option<Vec<ResolveStep>>,
) -> Option<Resolution> {
    let remaining = &segments[index..];

    // A node is a solution only with the path fully consumed and at least
    // one interceptor of its own; structural nodes are pass-through.
    if remaining.is_empty() && tree.has_interceptors(node) {
        return Some(Resolution {
            node,
            parameters: acc.clone(),
        });
    }

    let input = EvalInput {
        segments: remaining,
        method,
    };

    // Evaluate every child; keep the matches for ranking.
    let children = tree.children(node);
    let mut matches: Vec<(usize, NodeId, Evaluation)> = Vec::new();
    let mut candidates: Vec<CandidateTrace> = Vec::with_capacity(children.len());
    for (position, &child) in children.iter().enumerate() {
        let evaluation = tree.selector(child).evaluate(input);
        if steps.is_some() {
            candidates.push(CandidateTrace {
                selector: tree.selector(child).to_string(),
                evaluation: format!("{evaluation:?}"),
                quality: evaluation.quality(),
                entered: false,
            });
        }
        if evaluation.is_match() {
            matches.push((position, child, evaluation));
        }
    }

    let step_index = steps.as_mut().map(|all| {
        all.push(ResolveStep {
            node: tree.display_path(node),
            segment_index: index,
            candidates,
        });
        all.len() - 1
    });

    // Best quality first; stable sort keeps registration order on ties.
    matches.sort_by_key(|(_, _, evaluation)| {
        std::cmp::Reverse(evaluation.quality().unwrap_or(MatchQuality::OptionalAbsent))
    });

    for (position, child, evaluation) in matches {
        if let (Some(all), Some(si)) = (steps.as_mut(), step_index) {
            all[si].candidates[position].entered = true;
        }

        let merged = match &evaluation {
            Evaluation::Success { parameters, .. } => acc.overlay(parameters),
            _ => acc.clone(),
        };

        if let Some(found) = descend(
            tree,
            child,
            segments,
            index + evaluation.consumed(),
            method,
            &merged,
            steps,
        ) {
            return Some(found);
        }
    }

    None
}
