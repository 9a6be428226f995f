//! Suspend/resume plumbing between a flow body and the driver-facing pump.
//!
//! A running body and its pump share a single slot: the body writes the step
//! it is suspending on, the driver writes the value it is resuming with. The
//! body only ever progresses inside a pump poll, so the slot is never
//! contended; `RefCell` borrows are all transient.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::steps::{Step, StepInput};

#[derive(Default)]
pub(crate) struct Slot {
    /// Step handed to the driver at the current suspension point.
    pub(crate) yielded: Option<Step>,
    /// Value the driver resumes the body with.
    pub(crate) resume: Option<StepInput>,
}

pub(crate) type SharedSlot = Rc<RefCell<Slot>>;

/// Body-side handle for yielding steps and awaiting the driver's answer.
///
/// Suspension points are exactly the [`show`](Prompter::show) awaits;
/// between a yield and the matching resume the body is frozen and holds no
/// borrows, only its RAII scopes.
#[derive(Clone)]
pub struct Prompter {
    slot: SharedSlot,
}

impl Prompter {
    pub(crate) fn new(slot: SharedSlot) -> Self {
        Self { slot }
    }

    /// Yield `step` to the driver and suspend until it resumes with an
    /// input.
    pub fn show(&self, step: Step) -> ShowStep {
        ShowStep {
            slot: self.slot.clone(),
            pending: Some(step),
        }
    }
}

/// Future returned by [`Prompter::show`]; pending exactly once.
pub struct ShowStep {
    slot: SharedSlot,
    pending: Option<Step>,
}

impl Future for ShowStep {
    type Output = StepInput;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut slot = this.slot.borrow_mut();
        if let Some(step) = this.pending.take() {
            slot.yielded = Some(step);
            return Poll::Pending;
        }
        match slot.resume.take() {
            Some(input) => Poll::Ready(input),
            None => Poll::Pending,
        }
    }
}
