//! `RouteSelector` — the matching strategy attached to a tree edge.
//!
//! Each selector evaluates against the remaining unconsumed segments of a
//! call and reports how many it consumed, what it captured, and a
//! [`MatchQuality`] rank. Resolution uses the rank to order competing
//! sibling branches; it never needs to know which selector kind produced
//! the evaluation.

use regex::Regex;

use crate::{Parameters, PathSegment, RouteConfigError, RouteMethod, MAX_REGEX_PATTERN_LENGTH};

/// Match quality, worst to best.
///
/// When several children of one node match the same input, the highest
/// quality is entered first; exact ties fall back to registration order.
/// The derived `Ord` follows declaration order, so keep the variants
/// sorted worst-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    /// `{name?}` matched by being absent.
    OptionalAbsent,
    /// `{name...}` consumed the remaining segments.
    TailCard,
    /// `{name?}` matched a present segment.
    OptionalPresent,
    /// `{name}` matched a segment.
    Parameter,
    /// A regex selector matched the remaining suffix.
    Regex,
    /// Exact match: literal segment, method, or root.
    Constant,
}

/// What a selector is evaluated against: the unconsumed tail of the split
/// path plus the call's method.
#[derive(Debug, Clone, Copy)]
pub struct EvalInput<'a> {
    /// Remaining (unconsumed) raw segments.
    pub segments: &'a [&'a str],
    /// The dispatched call's method.
    pub method: &'a RouteMethod,
}

/// The outcome of evaluating one selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The selector cannot match here.
    Missing,
    /// A parameterized selector saw input but rejected it (regex mismatch).
    /// Ranked like [`Evaluation::Missing`]; kept distinct for traces.
    FailedParameter,
    /// An exact (capture-free) match.
    Constant {
        /// Number of segments consumed.
        consumed: usize,
    },
    /// A capturing match.
    Success {
        /// Number of segments consumed.
        consumed: usize,
        /// Captured parameters.
        parameters: Parameters,
        /// Rank among competing matches.
        quality: MatchQuality,
    },
}

impl Evaluation {
    /// Whether this evaluation lets resolution enter the child at all.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Constant { .. } | Self::Success { .. })
    }

    /// Segments consumed, for matches.
    #[must_use]
    pub fn consumed(&self) -> usize {
        match self {
            Self::Constant { consumed } | Self::Success { consumed, .. } => *consumed,
            _ => 0,
        }
    }

    /// The quality rank, for matches.
    #[must_use]
    pub fn quality(&self) -> Option<MatchQuality> {
        match self {
            Self::Constant { .. } => Some(MatchQuality::Constant),
            Self::Success { quality, .. } => Some(*quality),
            _ => None,
        }
    }
}

/// The matching strategy on a tree edge.
#[derive(Debug, Clone)]
pub enum RouteSelector {
    /// The zero-width selector of the tree root.
    Root,
    /// Exact segment match.
    Literal(String),
    /// `{name}` — one required segment.
    Parameter {
        /// Capture name.
        name: String,
    },
    /// `{name?}` — zero or one segment.
    OptionalParameter {
        /// Capture name.
        name: String,
    },
    /// `{name...}` — one or more trailing segments, captured as a list.
    TailCard {
        /// Capture name.
        name: String,
    },
    /// A compiled regex matched against the remaining suffix of the path
    /// (`a/b/c` joined form). Named capture groups become parameters.
    Regex(Regex),
    /// A required method dimension; consumes no segments.
    Method(RouteMethod),
}

impl RouteSelector {
    /// Build a regex selector, anchoring the pattern at the start of the
    /// remaining suffix.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::PatternTooLong`] or
    /// [`RouteConfigError::InvalidPattern`] if the regex does not compile.
    pub fn regex(pattern: &str) -> Result<Self, RouteConfigError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(RouteConfigError::PatternTooLong {
                len: pattern.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }
        // Group before anchoring so alternations stay fully anchored.
        let anchored = if pattern.starts_with('^') {
            pattern.to_string()
        } else {
            format!("^(?:{pattern})")
        };
        let compiled = Regex::new(&anchored).map_err(|e| RouteConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e.to_string(),
        })?;
        Ok(Self::Regex(compiled))
    }

    /// Structural identity: two selectors that would match identically.
    ///
    /// Drives child idempotence in the tree — re-registering the same shape
    /// returns the existing child. Regex selectors compare by pattern text.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Root, Self::Root) => true,
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Parameter { name: a }, Self::Parameter { name: b }) => a == b,
            (Self::OptionalParameter { name: a }, Self::OptionalParameter { name: b }) => a == b,
            (Self::TailCard { name: a }, Self::TailCard { name: b }) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            (Self::Method(a), Self::Method(b)) => a == b,
            _ => false,
        }
    }

    /// Evaluate this selector against the remaining input.
    #[must_use]
    pub fn evaluate(&self, input: EvalInput<'_>) -> Evaluation {
        match self {
            Self::Root => Evaluation::Constant { consumed: 0 },

            Self::Literal(expected) => match input.segments.first() {
                Some(segment) if segment == expected => Evaluation::Constant { consumed: 1 },
                _ => Evaluation::Missing,
            },

            Self::Parameter { name } => match input.segments.first() {
                Some(segment) if !segment.is_empty() => Evaluation::Success {
                    consumed: 1,
                    parameters: Parameters::single(name.clone(), *segment),
                    quality: MatchQuality::Parameter,
                },
                _ => Evaluation::Missing,
            },

            Self::OptionalParameter { name } => match input.segments.first() {
                Some(segment) => Evaluation::Success {
                    consumed: 1,
                    parameters: Parameters::single(name.clone(), *segment),
                    quality: MatchQuality::OptionalPresent,
                },
                // Absent: zero-width match, no capture entry at all.
                None => Evaluation::Success {
                    consumed: 0,
                    parameters: Parameters::new(),
                    quality: MatchQuality::OptionalAbsent,
                },
            },

            Self::TailCard { name } => {
                if input.segments.is_empty() {
                    return Evaluation::Missing;
                }
                let mut parameters = Parameters::new();
                parameters.append_all(name.clone(), input.segments.iter().copied());
                Evaluation::Success {
                    consumed: input.segments.len(),
                    parameters,
                    quality: MatchQuality::TailCard,
                }
            }

            Self::Regex(regex) => evaluate_regex(regex, input.segments),

            Self::Method(expected) => {
                if input.method == expected {
                    Evaluation::Constant { consumed: 0 }
                } else {
                    Evaluation::Missing
                }
            }
        }
    }

    /// Convert one parsed pattern descriptor into its selector.
    #[must_use]
    pub fn from_segment(segment: &PathSegment) -> Self {
        match segment {
            PathSegment::Literal(value) => Self::Literal(value.clone()),
            PathSegment::Parameter(name) => Self::Parameter { name: name.clone() },
            PathSegment::OptionalParameter(name) => Self::OptionalParameter { name: name.clone() },
            PathSegment::TailCard(name) => Self::TailCard { name: name.clone() },
        }
    }
}

impl std::fmt::Display for RouteSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "/"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Parameter { name } => write!(f, "{{{name}}}"),
            Self::OptionalParameter { name } => write!(f, "{{{name}?}}"),
            Self::TailCard { name } => write!(f, "{{{name}...}}"),
            Self::Regex(regex) => write!(f, "regex({})", regex.as_str()),
            Self::Method(method) => write!(f, "method({})", method.value()),
        }
    }
}

/// Regex selectors match the joined remaining suffix and must end on a
/// segment boundary; partial-segment matches are rejected.
fn evaluate_regex(regex: &Regex, segments: &[&str]) -> Evaluation {
    if segments.is_empty() {
        return Evaluation::Missing;
    }
    let suffix = segments.join("/");
    let Some(captures) = regex.captures(&suffix) else {
        return Evaluation::FailedParameter;
    };

    let matched = captures.get(0).map_or("", |m| m.as_str());
    let matched = matched.strip_suffix('/').unwrap_or(matched);
    if !matched.is_empty()
        && matched.len() != suffix.len()
        && suffix.as_bytes().get(matched.len()) != Some(&b'/')
    {
        return Evaluation::FailedParameter;
    }

    let consumed = if matched.is_empty() {
        0
    } else {
        matched.split('/').count()
    };

    let mut parameters = Parameters::new();
    for name in regex.capture_names().flatten() {
        if let Some(value) = captures.name(name) {
            parameters.append(name, value.as_str());
        }
    }

    Evaluation::Success {
        consumed,
        parameters,
        quality: MatchQuality::Regex,
    }
}
