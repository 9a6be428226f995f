//! RAII scopes over the navigation context.
//!
//! A `StepScope` brackets one flow invocation's history level; a
//! `StepHandle` brackets one active step. Both release on drop, so a normal
//! return, an early return on cancellation, and a propagated failure all
//! clean up the same way and history never leaks a level.

use tracing::debug;

use super::context::{Cursor, Navigation, StartedFrom};
use super::step::StepId;

/// How a scope is being opened.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ScopeOrigin {
    /// A driving command starting the outermost flow.
    Command(StartedFrom),
    /// A delegated sub-flow reusing the caller's context.
    Delegated,
}

/// Scoped handle over one flow invocation's history level.
///
/// Construction pushes a fresh level; drop pops it and resynchronizes the
/// parent level's notion of the current step.
pub struct StepScope {
    navigation: Navigation,
}

impl StepScope {
    pub(crate) fn open(navigation: Navigation, origin: ScopeOrigin) -> Self {
        {
            let mut ctx = navigation.borrow_mut();
            if let ScopeOrigin::Command(started_from) = origin {
                // A fresh top-level invocation must not inherit stale state
                // from a prior run of the same command.
                if ctx.depth() == 0 {
                    ctx.reset(started_from);
                }
            }
            ctx.push_level();
        }
        Self { navigation }
    }

    /// Record a visit to `id` and return a handle scoped to it.
    pub fn enter_step(&self, id: impl Into<StepId>) -> StepHandle {
        let id = id.into();
        self.navigation.borrow_mut().enter(id.clone());
        StepHandle::new(self.navigation.clone(), id)
    }

    /// Whether the wizard has reached its terminal state.
    pub fn is_complete(&self) -> bool {
        self.navigation.borrow().current().is_complete()
    }

    pub fn is_at_step(&self, id: &str) -> bool {
        self.navigation
            .borrow()
            .current()
            .step()
            .is_some_and(|current| current.as_str() == id)
    }

    /// True at `id` or before any step was entered; used to decide whether
    /// to (re-)run a step the first time through a body's loop.
    pub fn is_at_step_or_unset(&self, id: &str) -> bool {
        let ctx = self.navigation.borrow();
        match ctx.current() {
            Cursor::Unset => true,
            Cursor::At(current) => current.as_str() == id,
            Cursor::Complete => false,
        }
    }

    /// Collapse the wizard into its terminal state. The level itself is
    /// popped on scope release, not here.
    pub fn mark_steps_complete(&self) {
        debug!("steps complete");
        self.navigation.borrow_mut().set_current(Cursor::Complete);
    }

    /// Jump back to `id`, discarding everything entered after it. Used by
    /// steps with a toggle affordance that must return to an earlier
    /// decision point without unwinding one step at a time.
    pub fn go_back_to_step(&self, id: impl Into<StepId>) {
        self.navigation.borrow_mut().go_back_to_step(id.into());
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }
}

impl Drop for StepScope {
    fn drop(&mut self) {
        self.navigation.borrow_mut().pop_level();
    }
}

/// Scoped handle for exactly one active step.
pub struct StepHandle {
    navigation: Navigation,
    id: StepId,
    can_go_back: bool,
    went_back: bool,
}

impl StepHandle {
    fn new(navigation: Navigation, id: StepId) -> Self {
        let can_go_back = {
            let mut ctx = navigation.borrow_mut();
            let can_go_back = ctx.compute_can_go_back(&id);
            ctx.set_can_go_back(can_go_back);
            can_go_back
        };
        Self {
            navigation,
            id,
            can_go_back,
            went_back: false,
        }
    }

    pub fn id(&self) -> &StepId {
        &self.id
    }

    /// Whether back-navigation is currently legal, computed on entry.
    pub fn can_go_back(&self) -> bool {
        self.can_go_back
    }

    /// Perform the back transition.
    ///
    /// `Some(step)` means the destination lies in the same flow; the caller
    /// re-runs from there. `None` means this level is exhausted: the cursor
    /// now points at the outer flow's last step (or nothing), and the caller
    /// should let its own loop exit, ceding control up the call stack.
    pub fn go_back(&mut self) -> Option<StepId> {
        self.went_back = true;
        self.navigation.borrow_mut().retreat()
    }

    /// Erase this step from history as if the user never saw it.
    ///
    /// Only removes the step while it is still the exact tail of the current
    /// level; a later "back" then never lands on a screen that was skipped.
    pub fn skip(&self) {
        self.navigation.borrow_mut().skip_tail(&self.id);
    }
}

impl Drop for StepHandle {
    fn drop(&mut self) {
        // A cursor moved by go_back must survive; otherwise clear the
        // cursor if it still points at this step so a finished step does
        // not linger as "current" for an unrelated subsequent check.
        if self.went_back {
            return;
        }
        let mut ctx = self.navigation.borrow_mut();
        if ctx.current().step() == Some(&self.id) {
            ctx.set_current(Cursor::Unset);
        }
    }
}
