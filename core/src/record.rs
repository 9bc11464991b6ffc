//! `CallRecord` — the persisted-state boundary.
//!
//! History and stack-restoration collaborators (browser history state,
//! saved-state bundles, in-memory snapshots) round-trip calls through this
//! exact four-field shape. Field names and types are the wire contract;
//! do not rename them.

use std::collections::BTreeMap;

use crate::{Call, CallError, Parameters, RouteMethod};

/// The serializable form of a [`Call`].
///
/// # Example
///
/// ```
/// use waypoint::{Call, CallRecord, Parameters, RouteMethod};
///
/// let call = Call::new(
///     RouteMethod::Push,
///     "",
///     "/users/42",
///     Parameters::single("id", "42"),
/// )
/// .unwrap();
///
/// let record = CallRecord::from_call(&call);
/// let restored = record.to_call().unwrap();
/// assert_eq!(restored, call);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallRecord {
    /// The method's string value ([`RouteMethod::value`]).
    #[cfg_attr(feature = "serde", serde(rename = "routeMethod"))]
    pub route_method: String,
    /// The route name; empty for uri-addressed calls.
    pub name: String,
    /// The uri; empty for name-addressed calls.
    pub uri: String,
    /// Parameters as a plain map of name to value list.
    pub parameters: BTreeMap<String, Vec<String>>,
}

impl CallRecord {
    /// Capture a call's value identity.
    #[must_use]
    pub fn from_call(call: &Call) -> Self {
        Self {
            route_method: call.method().value().to_string(),
            name: call.name().to_string(),
            uri: call.uri().to_string(),
            parameters: call.parameters().to_map(),
        }
    }

    /// Rebuild the call this record was captured from.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`] if the record carries neither a name
    /// nor a uri (a corrupt snapshot).
    pub fn to_call(&self) -> Result<Call, CallError> {
        Call::new(
            RouteMethod::parse(&self.route_method),
            self.name.clone(),
            self.uri.clone(),
            Parameters::from_map(self.parameters.clone()),
        )
    }
}
