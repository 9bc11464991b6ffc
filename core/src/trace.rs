//! Resolution trace types for debugging route matching.
//!
//! Trace types mirror the resolution descent but capture evaluation
//! results instead of inputs: every expanded node becomes a step, every
//! child selector becomes a candidate with its evaluation and rank. Use
//! [`resolve_path_with_trace`](crate::resolve_path_with_trace) for full
//! visibility into why a uri matched (or missed) a branch.

use crate::{MatchQuality, Resolution};

/// Trace of one full path resolution.
///
/// # INV: `result` == `resolve_path()` result
///
/// The `result` field always equals what
/// [`resolve_path`](crate::resolve_path) would return for the same input.
#[derive(Debug, Clone)]
pub struct ResolveTrace {
    /// The final outcome (identical to what `resolve_path` returns).
    pub result: Option<Resolution>,
    /// One step per expanded node, in descent order.
    pub steps: Vec<ResolveStep>,
}

/// One expanded node during the descent.
#[derive(Debug, Clone)]
pub struct ResolveStep {
    /// Display path of the node whose children were evaluated.
    pub node: String,
    /// Index of the first unconsumed segment at this node.
    pub segment_index: usize,
    /// Every child's evaluation, in registration order.
    pub candidates: Vec<CandidateTrace>,
}

/// One child selector's evaluation at a step.
#[derive(Debug, Clone)]
pub struct CandidateTrace {
    /// Display form of the child's selector.
    pub selector: String,
    /// Debug form of the evaluation outcome.
    pub evaluation: String,
    /// The rank, for candidates that matched.
    pub quality: Option<MatchQuality>,
    /// Whether the descent entered this child.
    pub entered: bool,
}
