//! `NavigationStack` — ordered call history with push/replace/pop
//! semantics.
//!
//! The stack applies a transition *after* a call's pipeline completes
//! successfully, keyed on the call's method. A pop leaves the removed
//! entry's call (with the pop's result parameters) in a side channel that
//! the next transition of any kind clears, so a stale pop result is never
//! observed by an unrelated later screen.
//!
//! Mutations assume one writer at a time per router — UI hosts funnel
//! stack operations onto one sequential execution context.

use std::sync::{Arc, Mutex};

use crate::{Call, CallError, CallRecord, RouteMethod};

#[derive(Debug, Default)]
struct State {
    entries: Vec<Arc<Call>>,
    popped: Option<Arc<Call>>,
}

/// The navigation history of one router scope.
#[derive(Debug, Default)]
pub struct NavigationStack {
    state: Mutex<State>,
}

impl NavigationStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the stack holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// The current top, which UI layers render.
    #[must_use]
    pub fn top(&self) -> Option<Arc<Call>> {
        self.lock().entries.last().cloned()
    }

    /// A copy of the retained entries, bottom first.
    #[must_use]
    pub fn entries(&self) -> Vec<Arc<Call>> {
        self.lock().entries.clone()
    }

    /// The pending pop result, if the last transition was a pop.
    #[must_use]
    pub fn popped_result(&self) -> Option<Arc<Call>> {
        self.lock().popped.clone()
    }

    /// Apply the transition carried by a successfully executed call.
    /// Non-stack methods leave the stack (and the pop channel) untouched.
    pub(crate) fn apply(&self, call: &Arc<Call>) {
        if !call.method().is_stack_method() {
            return;
        }

        let mut state = self.lock();
        // Any transition invalidates a pending pop result.
        state.popped = None;

        match call.method() {
            RouteMethod::Push => state.entries.push(call.clone()),
            RouteMethod::Replace => {
                state.entries.pop();
                state.entries.push(call.clone());
            }
            RouteMethod::ReplaceAll => {
                state.entries.clear();
                state.entries.push(call.clone());
            }
            RouteMethod::Pop => {
                // The root entry is never popped implicitly.
                if state.entries.len() > 1 {
                    state.entries.pop();
                    state.popped = Some(call.clone());
                }
            }
            _ => unreachable!("guarded by is_stack_method"),
        }
    }

    /// Snapshot the retained entries as persistence records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CallRecord> {
        self.lock().entries.iter().map(|c| CallRecord::from_call(c)).collect()
    }

    /// Replace the stack contents from persistence records, without
    /// dispatching anything. The pop channel is cleared.
    ///
    /// # Errors
    ///
    /// [`CallError::MissingAddress`] if a record is corrupt; the stack is
    /// left unchanged in that case.
    pub fn restore(&self, records: &[CallRecord]) -> Result<(), CallError> {
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            entries.push(Arc::new(record.to_call()?));
        }

        let mut state = self.lock();
        state.entries = entries;
        state.popped = None;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("navigation stack lock poisoned")
    }
}
