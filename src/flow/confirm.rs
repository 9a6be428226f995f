//! Confirmation policy: whether a flow shows its confirmation step.
//!
//! The preference itself lives in an external key-value store the driver
//! owns; the engine only derives the stable lookup key and applies the
//! per-flow policy.

use crate::flow::command::FlowDefinition;
use crate::steps::StartedFrom;

/// External preference store remembering "don't ask again" per flow.
pub trait ConfirmationStore {
    /// The stored skip-confirmation preference, if any.
    fn get(&self, key: &str) -> Option<bool>;
}

/// Stable key combining a flow's identity and how it was started.
pub fn skip_confirm_key(flow_key: &str, started_from: StartedFrom) -> String {
    let origin = match started_from {
        StartedFrom::Menu => "menu",
        StartedFrom::Direct => "direct",
    };
    format!("confirm:{flow_key}:{origin}")
}

/// Whether a flow invocation should show its confirmation step.
///
/// Flows that never confirm return false outright; flows that must always
/// confirm (destructive operations) ignore both the override and the stored
/// preference.
pub fn should_confirm(
    definition: &dyn FlowDefinition,
    store: &dyn ConfirmationStore,
    started_from: StartedFrom,
    override_confirm: Option<bool>,
) -> bool {
    if !definition.can_confirm() {
        return false;
    }
    if !definition.can_skip_confirm() {
        return true;
    }
    if let Some(confirm) = override_confirm {
        return confirm;
    }
    !store
        .get(&skip_confirm_key(definition.key(), started_from))
        .unwrap_or(false)
}

/// In-memory store for tests and simple drivers.
#[derive(Debug, Default)]
pub struct MemoryConfirmationStore {
    entries: std::cell::RefCell<std::collections::HashMap<String, bool>>,
}

impl MemoryConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, skip: bool) {
        self.entries.borrow_mut().insert(key.into(), skip);
    }
}

impl ConfirmationStore for MemoryConfirmationStore {
    fn get(&self, key: &str) -> Option<bool> {
        self.entries.borrow().get(key).copied()
    }
}
