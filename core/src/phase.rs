//! Pipeline phases — named, ordered stages of call execution.
//!
//! Four anchor phases exist in a fixed relative order: `Setup` →
//! `Monitoring` → `Call` → `Fallback`. Plugins grow the list with
//! [`Phases::insert_before`]/[`Phases::insert_after`] relative to any
//! already-registered phase; interceptors then attach to a phase on a
//! route node.

use std::borrow::Cow;

use crate::RouteConfigError;

/// A named pipeline phase.
///
/// Compared by name; the ordering lives in [`Phases`], not in the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phase(Cow<'static, str>);

impl Phase {
    /// First anchor: call preparation (tracing ids, scope wiring).
    pub const SETUP: Phase = Phase(Cow::Borrowed("Setup"));
    /// Second anchor: plugins and monitoring wrap the rest.
    pub const MONITORING: Phase = Phase(Cow::Borrowed("Monitoring"));
    /// Third anchor: the handlers themselves.
    pub const CALL: Phase = Phase(Cow::Borrowed("Call"));
    /// Last anchor: runs only if nothing finished the call earlier.
    pub const FALLBACK: Phase = Phase(Cow::Borrowed("Fallback"));

    /// A custom phase.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The phase name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered phase registry of one router.
///
/// # Example
///
/// ```
/// use waypoint::{Phase, Phases};
///
/// let mut phases = Phases::new();
/// let audit = Phase::new("Audit");
/// phases.insert_after(&Phase::MONITORING, audit.clone()).unwrap();
///
/// let order: Vec<&str> = phases.iter().map(Phase::name).collect();
/// assert_eq!(order, ["Setup", "Monitoring", "Audit", "Call", "Fallback"]);
/// ```
#[derive(Debug, Clone)]
pub struct Phases {
    order: Vec<Phase>,
}

impl Phases {
    /// The four anchors in their fixed relative order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: vec![
                Phase::SETUP,
                Phase::MONITORING,
                Phase::CALL,
                Phase::FALLBACK,
            ],
        }
    }

    /// Register `phase` immediately before `anchor`.
    ///
    /// Registering an already-known phase is a no-op (its position is
    /// kept — phase order is fixed by first registration).
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::UnknownPhase`] if `anchor` is not registered.
    pub fn insert_before(&mut self, anchor: &Phase, phase: Phase) -> Result<(), RouteConfigError> {
        let index = self.position(anchor)?;
        if !self.contains(&phase) {
            self.order.insert(index, phase);
        }
        Ok(())
    }

    /// Register `phase` immediately after `anchor`.
    ///
    /// # Errors
    ///
    /// [`RouteConfigError::UnknownPhase`] if `anchor` is not registered.
    pub fn insert_after(&mut self, anchor: &Phase, phase: Phase) -> Result<(), RouteConfigError> {
        let index = self.position(anchor)?;
        if !self.contains(&phase) {
            self.order.insert(index + 1, phase);
        }
        Ok(())
    }

    /// Whether `phase` is registered.
    #[must_use]
    pub fn contains(&self, phase: &Phase) -> bool {
        self.order.contains(phase)
    }

    /// The phases in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.order.iter()
    }

    fn position(&self, phase: &Phase) -> Result<usize, RouteConfigError> {
        self.order
            .iter()
            .position(|p| p == phase)
            .ok_or_else(|| RouteConfigError::UnknownPhase {
                phase: phase.name().to_string(),
            })
    }
}

impl Default for Phases {
    fn default() -> Self {
        Self::new()
    }
}
