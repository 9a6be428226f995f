//! Driver-facing flow pump and the flow definition contract.
//!
//! A flow's body is an ordinary `!Send` future that suspends at step yields.
//! [`Flow`] bridges it to a conventional external iterator: the driver pumps
//! `next`/`previous`/`retry`, renders the yielded step, and resumes with a
//! selection or a directive. The body only ever progresses inside a pump
//! call; there is no runtime and no background execution.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::task::{Context, Poll};

use anyhow::Result;
use futures_util::future::LocalBoxFuture;
use futures_util::task::noop_waker_ref;
use tracing::debug;

use crate::error::FlowError;
use crate::flow::channel::{Prompter, SharedSlot, Slot};
use crate::flow::confirm::{should_confirm, ConfirmationStore};
use crate::steps::scope::ScopeOrigin;
use crate::steps::{
    can_input_step_continue, can_pick_step_continue, shared, Directive, Navigation, Selection,
    Step, StepInput, StepKind, StepScope, StepVerdict,
};

/// How a flow body ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The wizard ran to completion; the cursor is `Complete` and history is
    /// stable.
    Completed,
    /// The user backed out or cancelled. A first-class termination mode,
    /// never an error.
    Broken,
}

/// What the pump reports to the driver after a resume.
#[derive(Debug, Clone)]
pub enum FlowProgress {
    /// The flow suspended on a step; render it and resume.
    Step(Step),
    /// The flow finished (completed or cancelled).
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    NotStarted,
    Suspended,
    Done,
}

/// Pre-answered steps supplied by the caller, merged under a definition's
/// defaults. A body that finds its step's answer seeded uses it without
/// entering the step, so back-navigation never lands there.
#[derive(Debug, Clone, Default)]
pub struct FlowSeed {
    values: HashMap<String, Selection>,
    /// Per-invocation override of the confirmation preference.
    pub confirm: Option<bool>,
}

impl FlowSeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, step: impl Into<String>, selection: Selection) -> Self {
        self.values.insert(step.into(), selection);
        self
    }

    pub fn with_confirm(mut self, confirm: bool) -> Self {
        self.confirm = Some(confirm);
        self
    }

    pub fn get(&self, step: &str) -> Option<&Selection> {
        self.values.get(step)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.confirm.is_none()
    }

    /// Defaults overwritten by caller-supplied overrides.
    pub(crate) fn merged(defaults: Self, overrides: Self) -> Self {
        let mut values = defaults.values;
        values.extend(overrides.values);
        Self {
            values,
            confirm: overrides.confirm.or(defaults.confirm),
        }
    }
}

/// The coroutine type a flow definition produces.
pub type BodyFuture = LocalBoxFuture<'static, Result<FlowOutcome>>;

/// A named, titled, resumable wizard definition.
pub trait FlowDefinition {
    /// Stable identity, also the basis of the skip-confirmation key.
    fn key(&self) -> &str;

    /// Short name for menu presentation.
    fn label(&self) -> &str;

    fn title(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    /// Whether this flow ever shows a confirmation step.
    fn can_confirm(&self) -> bool {
        true
    }

    /// Whether the user may permanently suppress confirmation. Destructive
    /// flows (delete, prune, rename) return false and always confirm.
    fn can_skip_confirm(&self) -> bool {
        true
    }

    /// The flow's own initial answers, merged under caller overrides.
    fn default_seed(&self) -> FlowSeed {
        FlowSeed::default()
    }

    /// Build the coroutine body for one invocation.
    fn steps(self: Rc<Self>, ctx: FlowContext) -> BodyFuture;
}

/// How running one step ended, from the body's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRun {
    /// A validated answer; forward progress.
    Answered(Selection),
    /// Went back to an earlier step in this flow; re-run from the cursor.
    Regressed,
    /// Left this flow: backed out of its first step, or cancelled. The body
    /// reports `FlowOutcome::Broken`.
    Ceded,
}

/// Everything a flow body needs for one invocation: the shared navigation
/// context, the suspend/resume channel, and the merged seed.
#[derive(Clone)]
pub struct FlowContext {
    navigation: Navigation,
    prompter: Prompter,
    seed: FlowSeed,
    started_from: crate::steps::StartedFrom,
    delegated: bool,
}

impl FlowContext {
    /// Open this invocation's history level. Top-level invocations reset a
    /// stale context first; delegated ones reuse it untouched.
    pub fn scope(&self) -> StepScope {
        let origin = if self.delegated {
            ScopeOrigin::Delegated
        } else {
            ScopeOrigin::Command(self.started_from)
        };
        StepScope::open(self.navigation.clone(), origin)
    }

    pub fn seed(&self) -> &FlowSeed {
        &self.seed
    }

    pub fn started_from(&self) -> crate::steps::StartedFrom {
        self.started_from
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn prompter(&self) -> &Prompter {
        &self.prompter
    }

    /// Yield `step` and suspend until the driver resumes.
    pub fn show(&self, step: Step) -> crate::flow::channel::ShowStep {
        self.prompter.show(step)
    }

    /// Whether this invocation should show its confirmation step.
    ///
    /// Delegated invocations never re-confirm; the parent is responsible
    /// for prompting once.
    pub fn should_confirm(
        &self,
        definition: &dyn FlowDefinition,
        store: &dyn ConfirmationStore,
    ) -> bool {
        if self.delegated {
            return false;
        }
        should_confirm(definition, store, self.started_from, self.seed.confirm)
    }

    /// Run one step to an answer, handling directives and re-prompting on
    /// validation failure. The single place directives are interpreted for
    /// ordinary steps.
    pub async fn run_step(&self, scope: &StepScope, step: Step) -> StepRun {
        let mut step = step;
        loop {
            let mut handle = scope.enter_step(step.id.clone());
            step.allow_back = step.allow_back && handle.can_go_back();
            let input = self.prompter.show(step.clone()).await;
            match input.directive() {
                Some(Directive::Back) => {
                    return match handle.go_back() {
                        Some(_) => StepRun::Regressed,
                        None => StepRun::Ceded,
                    };
                }
                Some(Directive::Cancel | Directive::Break) => return StepRun::Ceded,
                Some(Directive::Reset) => {
                    step.value = None;
                    step.validation_message = None;
                    continue;
                }
                Some(Directive::Noop) | None => {}
            }
            let verdict = match step.kind {
                StepKind::Input => can_input_step_continue(&step, &input),
                StepKind::Pick | StepKind::Custom => can_pick_step_continue(&step, &input),
            };
            match verdict {
                StepVerdict::Continue(selection) => return StepRun::Answered(selection.clone()),
                StepVerdict::Reprompt(message) => {
                    step.validation_message = message;
                }
            }
        }
    }

    pub(crate) fn delegate(&self, seed: FlowSeed) -> Self {
        Self {
            navigation: self.navigation.clone(),
            prompter: self.prompter.clone(),
            seed,
            started_from: self.started_from,
            delegated: true,
        }
    }
}

/// Build a definition's body with its default seed merged under the
/// caller-supplied overrides.
pub fn get_steps(definition: Rc<dyn FlowDefinition>, mut ctx: FlowContext) -> BodyFuture {
    ctx.seed = FlowSeed::merged(definition.default_seed(), ctx.seed);
    definition.steps(ctx)
}

/// Run a definition's body against a caller-owned context, for composite
/// delegation: same navigation history, same suspend/resume channel, no
/// re-confirmation by the child.
pub fn execute_steps(
    definition: Rc<dyn FlowDefinition>,
    parent: &FlowContext,
    overrides: FlowSeed,
) -> BodyFuture {
    get_steps(definition, parent.delegate(overrides))
}

/// Driver-facing pump over one flow invocation.
pub struct Flow {
    definition: Rc<dyn FlowDefinition>,
    navigation: Navigation,
    slot: SharedSlot,
    seed: FlowSeed,
    started_from: crate::steps::StartedFrom,
    body: Option<BodyFuture>,
    current: Option<Step>,
    state: FlowState,
}

impl Flow {
    pub fn new(
        definition: Rc<dyn FlowDefinition>,
        started_from: crate::steps::StartedFrom,
        seed: FlowSeed,
    ) -> Self {
        Self {
            definition,
            navigation: shared(started_from),
            slot: Rc::new(RefCell::new(Slot::default())),
            seed,
            started_from,
            body: None,
            current: None,
            state: FlowState::NotStarted,
        }
    }

    pub fn key(&self) -> &str {
        self.definition.key()
    }

    pub fn label(&self) -> &str {
        self.definition.label()
    }

    pub fn title(&self) -> &str {
        self.definition.title()
    }

    pub fn description(&self) -> Option<&str> {
        self.definition.description()
    }

    /// Shared navigation state, for driver affordances such as rendering a
    /// back button from the cached can-go-back flag.
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// The step the flow is currently suspended on, for re-rendering.
    pub fn current_step(&self) -> Option<&Step> {
        self.current.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.state == FlowState::Done
    }

    /// Resume the body with `input` and report the next suspension point.
    ///
    /// The value passed to the very first call is discarded, generator
    /// style. A body that reports [`FlowOutcome::Broken`] is treated as
    /// cancelled: the externally visible current step is cleared and `Done`
    /// is reported.
    pub fn next(&mut self, input: Option<StepInput>) -> Result<FlowProgress> {
        match self.state {
            FlowState::Done => return Ok(FlowProgress::Done),
            FlowState::NotStarted => {
                debug!(flow = self.definition.key(), "starting flow");
                let ctx = FlowContext {
                    navigation: self.navigation.clone(),
                    prompter: Prompter::new(self.slot.clone()),
                    seed: self.seed.clone(),
                    started_from: self.started_from,
                    delegated: false,
                };
                self.body = Some(get_steps(self.definition.clone(), ctx));
                self.slot.borrow_mut().resume = None;
                self.state = FlowState::Suspended;
            }
            FlowState::Suspended => {
                // Resuming with nothing re-renders the current step.
                self.slot.borrow_mut().resume =
                    Some(input.unwrap_or(StepInput::Directive(Directive::Noop)));
            }
        }
        self.pump()
    }

    /// Resume with the back directive.
    pub fn previous(&mut self) -> Result<FlowProgress> {
        self.next(Some(StepInput::Directive(Directive::Back)))
    }

    /// Re-render the current step without moving anywhere in history. Used
    /// after transient external state changes that should refresh a step's
    /// contents.
    pub fn retry(&mut self) -> Result<FlowProgress> {
        self.next(Some(StepInput::Directive(Directive::Noop)))
    }

    /// Force-close the body, releasing any open scopes inside it.
    /// Idempotent.
    pub fn terminate(&mut self) {
        if self.body.take().is_some() {
            debug!(flow = self.definition.key(), "terminated flow");
        }
        self.current = None;
        self.state = FlowState::Done;
        let mut slot = self.slot.borrow_mut();
        slot.yielded = None;
        slot.resume = None;
    }

    fn pump(&mut self) -> Result<FlowProgress> {
        let Some(body) = self.body.as_mut() else {
            return Err(FlowError::NotRunning.into());
        };
        let mut cx = Context::from_waker(noop_waker_ref());
        match body.as_mut().poll(&mut cx) {
            Poll::Ready(outcome) => {
                self.body = None;
                self.state = FlowState::Done;
                match outcome? {
                    FlowOutcome::Completed => {
                        debug!(flow = self.definition.key(), "flow completed");
                    }
                    FlowOutcome::Broken => {
                        debug!(flow = self.definition.key(), "flow cancelled");
                        self.current = None;
                    }
                }
                Ok(FlowProgress::Done)
            }
            Poll::Pending => {
                let yielded = self.slot.borrow_mut().yielded.take();
                match yielded {
                    Some(step) => {
                        debug!(flow = self.definition.key(), step = %step.id, "flow suspended");
                        self.current = Some(step.clone());
                        Ok(FlowProgress::Step(step))
                    }
                    None => {
                        // A body may only suspend at step yields; anything
                        // else is a flow-authoring bug.
                        self.terminate();
                        Err(FlowError::SuspendedWithoutStep.into())
                    }
                }
            }
        }
    }
}
