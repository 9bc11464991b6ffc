//! Declarative route-table configuration (feature = `registry`).
//!
//! A route table is data: paths, optional names/methods, action labels,
//! and nested children. [`ActionRegistry`](crate::ActionRegistry) turns
//! the labels into interceptors and loads the table into a router, so
//! navigation graphs can ship as JSON/YAML documents instead of code.

use crate::RouteConfigError;

/// A whole route table.
///
/// ```
/// use waypoint::RouteTableConfig;
///
/// let table = RouteTableConfig::from_json_str(r#"{
///     "routes": [
///         { "path": "/home", "action": "show_home" },
///         { "path": "/users", "children": [
///             { "path": "/{id}", "name": "user_detail", "action": "show_user" }
///         ]}
///     ]
/// }"#).unwrap();
/// assert_eq!(table.routes.len(), 2);
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RouteTableConfig {
    /// Top-level routes, registered in order.
    pub routes: Vec<RouteConfig>,
}

/// One route entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RouteConfig {
    /// Pattern relative to the parent entry (or the root).
    pub path: String,
    /// Optional unique name for reverse lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional method binding, as a [`RouteMethod`](crate::RouteMethod)
    /// string value (e.g. `"PUSH"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Optional action label resolved through the
    /// [`ActionRegistry`](crate::ActionRegistry).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Nested routes below this entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteConfig>,
}

impl RouteTableConfig {
    /// Parse a table from a JSON document.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::InvalidConfig`] with the deserializer message.
    pub fn from_json_str(json: &str) -> Result<Self, RouteConfigError> {
        serde_json::from_str(json).map_err(|e| RouteConfigError::InvalidConfig {
            source: e.to_string(),
        })
    }
}
