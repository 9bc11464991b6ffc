//! `ActionRegistry` — action labels to interceptor factories
//! (feature = `registry`).
//!
//! Route tables reference behavior by label; the registry is the explicit,
//! typed mapping from those labels to handler factories. Unknown labels
//! fail at load time with the registered alternatives listed — a config
//! typo should be a one-glance fix.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::RouteScope;
use crate::{
    Interceptor, Phase, RouteConfig, RouteConfigError, RouteMethod, RouteSelector,
    RouteTableConfig, Router,
};

type ActionFactory = Arc<dyn Fn() -> Interceptor + Send + Sync>;

/// Builder for [`ActionRegistry`].
#[derive(Default)]
pub struct ActionRegistryBuilder {
    actions: HashMap<String, ActionFactory>,
}

impl ActionRegistryBuilder {
    /// Start an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `label`. Later registrations replace
    /// earlier ones.
    #[must_use]
    pub fn action<F>(mut self, label: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Interceptor + Send + Sync + 'static,
    {
        self.actions.insert(label.into(), Arc::new(factory));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
        }
    }
}

/// The label-to-factory mapping used to load route tables.
pub struct ActionRegistry {
    actions: HashMap<String, ActionFactory>,
}

impl ActionRegistry {
    /// The registered labels, sorted.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.actions.keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Whether `label` is registered.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.actions.contains_key(label)
    }

    /// Load a route table into `router`, resolving every action label.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::UnknownAction`] for unresolved labels, plus the
    /// usual pattern/name errors.
    pub fn load_route_table(
        &self,
        router: &Router,
        table: &RouteTableConfig,
    ) -> Result<(), RouteConfigError> {
        router.configure(|scope| {
            for route in &table.routes {
                self.load_entry(scope, route)?;
            }
            Ok(())
        })
    }

    fn load_entry(
        &self,
        scope: &mut RouteScope<'_>,
        entry: &RouteConfig,
    ) -> Result<(), RouteConfigError> {
        scope
            .route(&entry.path, |sub| {
                let mut target = sub.node();
                if let Some(method) = &entry.method {
                    let selector = RouteSelector::Method(RouteMethod::parse(method));
                    target = sub.tree().create_child(target, selector)?;
                }
                if let Some(name) = &entry.name {
                    sub.tree().set_name(target, name)?;
                }
                if let Some(action) = &entry.action {
                    let factory =
                        self.actions
                            .get(action)
                            .ok_or_else(|| RouteConfigError::UnknownAction {
                                action: action.clone(),
                                available: self.labels(),
                            })?;
                    sub.tree().add_interceptor(target, Phase::CALL, factory());
                }
                for child in &entry.children {
                    self.load_entry(sub, child)?;
                }
                Ok(())
            })
            .map(|_| ())
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("labels", &self.labels())
            .finish()
    }
}
