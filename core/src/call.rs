//! `Call` — one logical navigation request.
//!
//! The navigation analog of an HTTP request: addressed by a uri or a route
//! name, carrying a method, a parameter map, and a mutable attribute bag.
//! Value identity (method/name/uri/parameters) is fixed at construction;
//! only the attributes move during the call's lifetime.

use crate::{Attributes, CallError, Parameters, RouteMethod};

/// One dispatched navigation call.
///
/// Constructed by the router per dispatch; held alive by the navigation
/// stack for as long as the entry is retained.
#[derive(Debug)]
pub struct Call {
    method: RouteMethod,
    name: String,
    uri: String,
    parameters: Parameters,
    attributes: Attributes,
}

impl Call {
    /// Create a call.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`] unless at least one of `name`/`uri`
    /// is non-blank — every call must be addressable.
    pub fn new(
        method: RouteMethod,
        name: impl Into<String>,
        uri: impl Into<String>,
        parameters: Parameters,
    ) -> Result<Self, CallError> {
        let name = name.into();
        let uri = uri.into();
        if name.trim().is_empty() && uri.trim().is_empty() {
            return Err(CallError::MissingAddress);
        }
        Ok(Self {
            method,
            name,
            uri,
            parameters,
            attributes: Attributes::new(),
        })
    }

    /// The navigation method.
    #[must_use]
    pub fn method(&self) -> &RouteMethod {
        &self.method
    }

    /// The route name; empty for uri-addressed calls.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The uri; empty for name-addressed calls.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Caller parameters plus any captures merged in by resolution.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The call-scoped mutable attribute bag.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

// Value identity only — the attribute bag is scratch space and does not
// participate in equality.
impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.name == other.name
            && self.uri == other.uri
            && self.parameters == other.parameters
    }
}

impl Eq for Call {}
