//! Path pattern parsing and path splitting.
//!
//! Patterns are `/`-delimited; a segment is either a literal or a capture
//! wrapped in braces: `{name}` (required), `{name?}` (optional),
//! `{name...}` (tail-card, greedy, must be last). Matching itself lives in
//! [`RouteSelector`](crate::RouteSelector) — this module only classifies
//! pattern text and splits concrete paths.

use crate::{RouteConfigError, MAX_PATTERN_LENGTH};

/// One parsed descriptor of a route pattern.
///
/// The tree root is a zero-width selector, not a segment, so `parse_pattern`
/// of `/` (or the empty pattern) yields an empty descriptor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Exact string match, no capture.
    Literal(String),
    /// `{name}` — matches exactly one non-empty segment, captures it.
    Parameter(String),
    /// `{name?}` — matches zero or one segment; absent means no capture.
    OptionalParameter(String),
    /// `{name...}` — greedily matches all remaining segments (at least one).
    TailCard(String),
}

/// Parse a route pattern into its segment descriptors.
///
/// # Errors
///
/// - [`RouteConfigError::PatternTooLong`] past [`MAX_PATTERN_LENGTH`].
/// - [`RouteConfigError::TailCardNotLast`] if anything follows `{name...}`.
/// - [`RouteConfigError::InvalidPattern`] for stray braces, empty capture
///   names, or captures not spanning a whole segment.
///
/// # Example
///
/// ```
/// use waypoint::{parse_pattern, PathSegment};
///
/// let segments = parse_pattern("/docs/{page?}").unwrap();
/// assert_eq!(
///     segments,
///     vec![
///         PathSegment::Literal("docs".into()),
///         PathSegment::OptionalParameter("page".into()),
///     ],
/// );
/// ```
pub fn parse_pattern(pattern: &str) -> Result<Vec<PathSegment>, RouteConfigError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(RouteConfigError::PatternTooLong {
            len: pattern.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }

    let raw: Vec<&str> = split_path(pattern);
    let mut segments = Vec::with_capacity(raw.len());

    for (index, piece) in raw.iter().enumerate() {
        let segment = parse_segment(pattern, piece)?;

        if matches!(segment, PathSegment::TailCard(_)) && index + 1 != raw.len() {
            return Err(RouteConfigError::TailCardNotLast {
                pattern: pattern.to_string(),
            });
        }

        segments.push(segment);
    }

    Ok(segments)
}

fn parse_segment(pattern: &str, piece: &str) -> Result<PathSegment, RouteConfigError> {
    let invalid = |source: &str| RouteConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source: source.to_string(),
    };

    if let Some(inner) = piece.strip_prefix('{') {
        let Some(body) = inner.strip_suffix('}') else {
            return Err(invalid("unterminated '{'"));
        };
        if body.contains(['{', '}']) {
            return Err(invalid("nested braces"));
        }

        let (name, segment): (&str, fn(String) -> PathSegment) =
            if let Some(name) = body.strip_suffix("...") {
                (name, PathSegment::TailCard)
            } else if let Some(name) = body.strip_suffix('?') {
                (name, PathSegment::OptionalParameter)
            } else {
                (body, PathSegment::Parameter)
            };

        if name.is_empty() {
            return Err(invalid("empty capture name"));
        }

        return Ok(segment(name.to_string()));
    }

    if piece.contains(['{', '}']) {
        // Captures must span the whole segment: `a{b}` is rejected rather
        // than silently matched as a literal.
        return Err(invalid("capture must span the whole segment"));
    }

    Ok(PathSegment::Literal(piece.to_string()))
}

/// Split a concrete path into raw segments.
///
/// Splits on `/` and drops empty pieces, so leading/trailing/doubled
/// slashes are insignificant and `/` (or the empty path) splits to zero
/// segments — the root.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|piece| !piece.is_empty()).collect()
}

/// Split a uri into its path part and its query parameters.
///
/// Query pairs are `&`-separated `name=value` entries (a bare `name` maps
/// to an empty value). No percent-decoding is applied — callers that need
/// encoded uris decode before dispatching.
#[must_use]
pub fn split_query(uri: &str) -> (&str, Vec<(&str, &str)>) {
    let Some((path, query)) = uri.split_once('?') else {
        return (uri, Vec::new());
    };

    let pairs = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();

    (path, pairs)
}
