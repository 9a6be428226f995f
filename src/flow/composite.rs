//! Composite flows: a subcommand picker that delegates the rest of the
//! wizard to a registered child flow over the same navigation context, so
//! the user experiences one seamless back-navigable sequence across the
//! parent/child boundary.

use std::rc::Rc;

use tracing::debug;

use crate::error::FlowError;
use crate::flow::command::{
    execute_steps, BodyFuture, FlowContext, FlowDefinition, FlowOutcome, StepRun,
};
use crate::steps::Step;

/// Seed key under which a caller pre-selects a subcommand.
pub const SUBCOMMAND_STEP: &str = "subcommand";

/// A flow whose first step picks a named subcommand, then delegates the
/// remainder of execution to that subcommand's flow.
pub struct CompositeDefinition {
    key: String,
    label: String,
    title: String,
    description: Option<String>,
    placeholder: Option<String>,
    subcommands: Vec<Rc<dyn FlowDefinition>>,
}

impl CompositeDefinition {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            title: title.into(),
            description: None,
            placeholder: None,
            subcommands: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Register a subcommand, keyed by its definition's `key()`.
    pub fn with_subcommand(mut self, definition: Rc<dyn FlowDefinition>) -> Self {
        self.subcommands.push(definition);
        self
    }

    pub fn subcommand(&self, key: &str) -> Option<Rc<dyn FlowDefinition>> {
        self.subcommands
            .iter()
            .find(|definition| definition.key() == key)
            .cloned()
    }

    fn picker_step(&self) -> Step {
        let mut step = Step::pick(SUBCOMMAND_STEP, self.title.clone())
            .with_items(self.subcommands.iter().map(|d| d.key().to_string()));
        step.placeholder = self.placeholder.clone();
        step
    }

    /// Resolve a subcommand name or fail: an unregistered name is a
    /// flow-authoring bug, not a recoverable user condition.
    fn resolve(&self, key: &str) -> Result<Rc<dyn FlowDefinition>, FlowError> {
        self.subcommand(key)
            .ok_or_else(|| FlowError::UnknownSubcommand(key.to_string()))
    }
}

impl FlowDefinition for CompositeDefinition {
    fn key(&self) -> &str {
        &self.key
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn steps(self: Rc<Self>, ctx: FlowContext) -> BodyFuture {
        Box::pin(async move {
            let scope = ctx.scope();
            let preselected = ctx
                .seed()
                .get(SUBCOMMAND_STEP)
                .and_then(|selection| selection.first_item())
                .map(ToString::to_string);

            let mut chosen = match &preselected {
                Some(key) => Some(self.resolve(key)?),
                None => None,
            };

            loop {
                let definition = match chosen.take() {
                    Some(definition) => definition,
                    None => {
                        match ctx.run_step(&scope, self.picker_step()).await {
                            StepRun::Answered(selection) => {
                                let key = selection
                                    .first_item()
                                    .unwrap_or_default()
                                    .to_string();
                                self.resolve(&key)?
                            }
                            // Backed out of the picker: the picker is this
                            // flow's only own step, so both cases leave.
                            StepRun::Regressed | StepRun::Ceded => {
                                return Ok(FlowOutcome::Broken)
                            }
                        }
                    }
                };

                debug!(
                    flow = self.key.as_str(),
                    subcommand = definition.key(),
                    "delegating to subcommand"
                );
                match execute_steps(definition, &ctx, ctx.seed().clone()).await? {
                    FlowOutcome::Completed => return Ok(FlowOutcome::Completed),
                    FlowOutcome::Broken => {
                        // A pre-selected subcommand was never picked from the
                        // picker; do not drop the user into one they never
                        // asked for.
                        if preselected.is_some() {
                            return Ok(FlowOutcome::Broken);
                        }
                    }
                }
            }
        })
    }
}
