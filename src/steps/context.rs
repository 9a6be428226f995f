//! Shared navigation state for one wizard invocation.
//!
//! A `NavigationContext` is the single source of truth for "where is the
//! user, and where would back take them". It is created once per top-level
//! invocation and shared by reference along one delegation chain; two
//! unrelated invocations never share an instance.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::step::StepId;

/// How the outermost flow was invoked.
///
/// Back-navigation from the very first step is only legal when the wizard
/// was opened from a persistent menu there is somewhere to return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartedFrom {
    /// Opened from a persistent menu; back from the first step exits to it.
    Menu,
    /// Invoked directly (e.g. with arguments); back from the first step is
    /// not offered.
    Direct,
}

/// Where the wizard cursor currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// No step has been entered yet, or the last one was cleaned up.
    Unset,
    /// Sitting on a step.
    At(StepId),
    /// Terminal: the wizard finished its steps. Never overwritten by
    /// ancestor cleanup.
    Complete,
}

impl Cursor {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn step(&self) -> Option<&StepId> {
        match self {
            Self::At(id) => Some(id),
            _ => None,
        }
    }
}

/// Shared handle to a [`NavigationContext`] along one delegation chain.
pub type Navigation = Rc<RefCell<NavigationContext>>;

/// Create a fresh shared context for a new top-level invocation.
pub fn shared(started_from: StartedFrom) -> Navigation {
    Rc::new(RefCell::new(NavigationContext::new(started_from)))
}

/// Per-invocation navigation bookkeeping: a stack of per-level visited-step
/// stacks plus the current cursor.
#[derive(Debug)]
pub struct NavigationContext {
    /// One entry per open flow level; each level lists visited step ids in
    /// visitation order, without duplicates.
    history: Vec<Vec<StepId>>,
    current: Cursor,
    /// The very first step entered in the outermost level.
    starting_step: Option<StepId>,
    started_from: StartedFrom,
    /// Kept in sync by whichever step handle is currently open, so UI
    /// affordances can consult it without recomputing.
    can_go_back: bool,
}

impl NavigationContext {
    pub fn new(started_from: StartedFrom) -> Self {
        Self {
            history: Vec::new(),
            current: Cursor::Unset,
            starting_step: None,
            started_from,
            can_go_back: false,
        }
    }

    /// Wipe everything back to the just-constructed state. Guards against
    /// stale history bleeding in from a previous run of the same command.
    pub fn reset(&mut self, started_from: StartedFrom) {
        trace!("resetting navigation context");
        self.history.clear();
        self.current = Cursor::Unset;
        self.starting_step = None;
        self.started_from = started_from;
        self.can_go_back = false;
    }

    pub fn current(&self) -> &Cursor {
        &self.current
    }

    pub fn starting_step(&self) -> Option<&StepId> {
        self.starting_step.as_ref()
    }

    pub fn started_from(&self) -> StartedFrom {
        self.started_from
    }

    /// Cached back-navigation legality for the currently open step.
    pub fn can_go_back(&self) -> bool {
        self.can_go_back
    }

    /// Number of open history levels.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub(crate) fn set_current(&mut self, cursor: Cursor) {
        self.current = cursor;
    }

    pub(crate) fn set_can_go_back(&mut self, can_go_back: bool) {
        self.can_go_back = can_go_back;
    }

    /// Append an empty history level. Called exactly once per step scope.
    pub(crate) fn push_level(&mut self) {
        self.history.push(Vec::new());
        trace!(depth = self.history.len(), "pushed history level");
    }

    /// Remove the top-most level and resynchronize the cursor onto the
    /// parent level's last-seen step. A `Complete` cursor is left untouched
    /// so completion propagates to the outermost caller.
    pub(crate) fn pop_level(&mut self) {
        self.history.pop();
        trace!(depth = self.history.len(), "popped history level");
        if self.current.is_complete() {
            return;
        }
        match self.history.last().and_then(|level| level.last()).cloned() {
            Some(id) => self.current = Cursor::At(id),
            None => self.current = Cursor::Unset,
        }
    }

    /// Record a visit to `id` in the current level.
    ///
    /// Re-entering a step already present relocates it to the tail instead
    /// of duplicating it (the "toggle" case).
    pub(crate) fn enter(&mut self, id: StepId) {
        if self.history.is_empty() {
            // Lazily initialized for callers that never opened a scope.
            self.history.push(Vec::new());
        }
        if let Some(level) = self.history.last_mut() {
            match level.iter().position(|step| step == &id) {
                Some(position) if position + 1 == level.len() => {}
                Some(position) => {
                    level.remove(position);
                    level.push(id.clone());
                }
                None => level.push(id.clone()),
            }
        }
        if self.starting_step.is_none() {
            self.starting_step = Some(id.clone());
        }
        trace!(step = %id, "entered step");
        self.current = Cursor::At(id);
    }

    /// Whether back-navigation is legal from `id`, assuming `id` was just
    /// entered into the current level.
    ///
    /// A lone step in a delegated sub-flow can still go back into its
    /// caller; a lone step in the outermost flow can only go back when the
    /// wizard was opened from a persistent menu, in which case back exits
    /// to that menu.
    pub(crate) fn compute_can_go_back(&self, id: &StepId) -> bool {
        let from_menu = self.started_from == StartedFrom::Menu;
        let past_start = self.starting_step.as_ref() != Some(id);
        let level_len = self.history.last().map_or(0, Vec::len);
        let outer_visited = self
            .history
            .iter()
            .rev()
            .skip(1)
            .any(|level| !level.is_empty());

        (from_menu || past_start) && (level_len > 1 || outer_visited || from_menu)
    }

    /// Pop the tail of the current level and move the cursor to the new
    /// back destination.
    ///
    /// Returns the destination step when it lies in the same level. Returns
    /// `None` when the level emptied: the cursor then peeks at the nearest
    /// non-empty outer level's tail (without consuming it), or clears
    /// entirely when no outer step exists.
    pub(crate) fn retreat(&mut self) -> Option<StepId> {
        if let Some(level) = self.history.last_mut() {
            level.pop();
            if let Some(tail) = level.last().cloned() {
                trace!(step = %tail, "went back within level");
                self.current = Cursor::At(tail.clone());
                return Some(tail);
            }
        }
        let outer_tail = self
            .history
            .iter()
            .rev()
            .skip(1)
            .find(|level| !level.is_empty())
            .and_then(|level| level.last())
            .cloned();
        match outer_tail {
            Some(id) => {
                trace!(step = %id, "went back across levels");
                self.current = Cursor::At(id);
            }
            None => {
                trace!("went back out of the wizard");
                self.current = Cursor::Unset;
            }
        }
        None
    }

    /// Jump back to `id` in the current level, discarding everything more
    /// recent. Seeds the level with `id` when it was never visited.
    pub(crate) fn go_back_to_step(&mut self, id: StepId) {
        if self.history.is_empty() {
            self.history.push(Vec::new());
        }
        if let Some(level) = self.history.last_mut() {
            match level.iter().position(|step| step == &id) {
                Some(position) => level.truncate(position + 1),
                None => {
                    level.clear();
                    level.push(id.clone());
                }
            }
        }
        trace!(step = %id, "jumped back to step");
        self.current = Cursor::At(id);
    }

    /// Erase `id` from history as if it was never visited, but only while it
    /// is still the exact tail of the current level.
    pub(crate) fn skip_tail(&mut self, id: &StepId) -> bool {
        if let Some(level) = self.history.last_mut() {
            if level.last() == Some(id) {
                level.pop();
                trace!(step = %id, "skipped step");
                return true;
            }
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn level(&self, index: usize) -> &[StepId] {
        &self.history[index]
    }
}
