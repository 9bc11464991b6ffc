//! `Attributes` — typed heterogeneous storage scoped to one call.
//!
//! The bag stays mutable for the call's whole pipeline while the rest of
//! the call is frozen at construction. Keys are typed: an
//! [`AttributeKey<T>`] can only store and retrieve `T`, so cross-cutting
//! state (session handles, pop results, trace ids) never needs downcast
//! guessing at the use site.
//!
//! Presence is part of the contract: `get` returning `None` means the key
//! was never inserted (or was removed), which several stack invariants
//! rely on — there is no "inserted but null" state.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

/// A typed key into an [`Attributes`] bag.
///
/// Declare keys as constants next to the code that owns them:
///
/// ```
/// use waypoint::{AttributeKey, Attributes};
///
/// const TRACE_ID: AttributeKey<String> = AttributeKey::new("trace-id");
///
/// let attrs = Attributes::new();
/// attrs.insert(&TRACE_ID, "abc123".to_string());
/// assert_eq!(attrs.get(&TRACE_ID).unwrap().as_str(), "abc123");
/// ```
#[derive(Debug)]
pub struct AttributeKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttributeKey<T> {
    /// Create a key. Two keys with the same name address the same slot, so
    /// names should be unique per concern.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The key's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Heterogeneous, interior-mutable key-value storage.
///
/// Values are stored behind `Arc` so `get` can hand them out without
/// holding the internal lock; no lock is ever held across an await point.
#[derive(Default)]
pub struct Attributes {
    slots: Mutex<HashMap<&'static str, Arc<dyn Any + Send + Sync>>>,
}

// Values are type-erased, so only the keys are printable.
impl std::fmt::Debug for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().expect("attributes lock poisoned");
        f.debug_set().entries(slots.keys()).finish()
    }
}

impl Attributes {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, replacing any previous value.
    pub fn insert<T: Send + Sync + 'static>(&self, key: &AttributeKey<T>, value: T) {
        self.slots
            .lock()
            .expect("attributes lock poisoned")
            .insert(key.name, Arc::new(value));
    }

    /// The value under `key`, if present.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, key: &AttributeKey<T>) -> Option<Arc<T>> {
        self.slots
            .lock()
            .expect("attributes lock poisoned")
            .get(key.name)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Remove and return the value under `key`.
    pub fn remove<T: Send + Sync + 'static>(&self, key: &AttributeKey<T>) -> Option<Arc<T>> {
        self.slots
            .lock()
            .expect("attributes lock poisoned")
            .remove(key.name)
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Whether `key` holds a value.
    #[must_use]
    pub fn contains<T>(&self, key: &AttributeKey<T>) -> bool {
        self.slots
            .lock()
            .expect("attributes lock poisoned")
            .contains_key(key.name)
    }
}
