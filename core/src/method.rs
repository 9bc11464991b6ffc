//! `RouteMethod` — the navigation verb carried by every call.
//!
//! Navigation methods play the role HTTP methods play in a server router:
//! an extra required match dimension, and the input to the stack state
//! machine (push/replace/replaceAll/pop). The string form round-trips
//! through [`value()`](RouteMethod::value)/[`parse()`](RouteMethod::parse)
//! for the persistence boundary.

use std::fmt;

/// The method of a navigation call.
///
/// `Empty` is the default for plain dispatches that do not touch the stack.
/// `Event` addresses application events (named routes, never paths).
/// `Custom` carries any other verb a host integration defines; it compares
/// by its string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// No method — plain dispatch, no stack transition.
    Empty,
    /// Append to the navigation stack.
    Push,
    /// Replace the top of the navigation stack.
    Replace,
    /// Clear the navigation stack, then append.
    ReplaceAll,
    /// Remove the top of the navigation stack.
    Pop,
    /// An application event dispatch.
    Event,
    /// A host-defined method.
    Custom(String),
}

impl RouteMethod {
    /// The canonical string value, as persisted by [`CallRecord`](crate::CallRecord).
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Push => "PUSH",
            Self::Replace => "REPLACE",
            Self::ReplaceAll => "REPLACE_ALL",
            Self::Pop => "POP",
            Self::Event => "EVENT",
            Self::Custom(value) => value,
        }
    }

    /// Parse a string value back into a method.
    ///
    /// Unknown values become [`RouteMethod::Custom`] — the wire contract
    /// never rejects a method string.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "" => Self::Empty,
            "PUSH" => Self::Push,
            "REPLACE" => Self::Replace,
            "REPLACE_ALL" => Self::ReplaceAll,
            "POP" => Self::Pop,
            "EVENT" => Self::Event,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns `true` for the methods that mutate the navigation stack.
    #[must_use]
    pub fn is_stack_method(&self) -> bool {
        matches!(
            self,
            Self::Push | Self::Replace | Self::ReplaceAll | Self::Pop
        )
    }
}

impl Default for RouteMethod {
    fn default() -> Self {
        Self::Empty
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}
