//! Navigation directives, resume values, and the continuation predicates.
//!
//! A suspended flow is resumed either with a real answer (`Selection`) or a
//! `Directive` signalling navigation intent. The two are disjoint at the type
//! level, and every flow body routes resumed values through the predicates
//! below before treating them as domain data.

use serde::{Deserialize, Serialize};

use super::step::Step;

/// Sentinel values meaning "navigate" rather than "here is an answer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Return to the previous step.
    Back,
    /// Abandon the wizard.
    Cancel,
    /// Re-render the current step unchanged.
    Noop,
    /// Clear the step's transient value back to undefined.
    Reset,
    /// Abort the whole flow; also the outcome a body reports when the user
    /// backed out of its first step.
    Break,
}

/// A real answer supplied by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Identifiers of the picked items.
    Items(Vec<String>),
    /// Free-form text.
    Text(String),
    /// Result of a custom sub-interaction.
    Action(String),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Items(items) => items.is_empty(),
            Self::Text(text) | Self::Action(text) => text.is_empty(),
        }
    }

    /// First picked item identifier, for single-select pick steps.
    pub fn first_item(&self) -> Option<&str> {
        match self {
            Self::Items(items) => items.first().map(String::as_str),
            Self::Text(text) | Self::Action(text) => Some(text.as_str()),
        }
    }
}

/// What the driver hands back when resuming a suspended flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepInput {
    Picked(Selection),
    Directive(Directive),
}

impl StepInput {
    pub fn items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Picked(Selection::Items(items.into_iter().map(Into::into).collect()))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Picked(Selection::Text(text.into()))
    }

    pub fn action(action: impl Into<String>) -> Self {
        Self::Picked(Selection::Action(action.into()))
    }

    /// The directive carried by this input, if it is one.
    ///
    /// This is the membership test call sites use; directives are never
    /// compared against magic literals buried in domain data.
    pub fn directive(&self) -> Option<Directive> {
        match self {
            Self::Directive(directive) => Some(*directive),
            Self::Picked(_) => None,
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, Self::Directive(_))
    }
}

impl From<Directive> for StepInput {
    fn from(directive: Directive) -> Self {
        Self::Directive(directive)
    }
}

impl From<Selection> for StepInput {
    fn from(selection: Selection) -> Self {
        Self::Picked(selection)
    }
}

/// Outcome of a step's validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    Valid,
    Invalid(String),
}

/// What a kind-specific predicate decided about a resumed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepVerdict<'a> {
    /// A usable answer; the body may treat it as domain data.
    Continue(&'a Selection),
    /// Re-show the step, optionally with a validation message.
    Reprompt(Option<String>),
}

/// True progress iff the resumed value is a non-empty selection, never a
/// directive.
pub fn can_step_continue(input: &StepInput) -> Option<&Selection> {
    match input {
        StepInput::Picked(selection) if !selection.is_empty() => Some(selection),
        _ => None,
    }
}

/// Continuation predicate for pick steps: non-empty selection plus the
/// step's validator.
pub fn can_pick_step_continue<'a>(step: &Step, input: &'a StepInput) -> StepVerdict<'a> {
    let Some(selection) = can_step_continue(input) else {
        return StepVerdict::Reprompt(None);
    };
    match step.validate(selection) {
        Validation::Valid => StepVerdict::Continue(selection),
        Validation::Invalid(message) => StepVerdict::Reprompt(Some(message)),
    }
}

/// Continuation predicate for input steps: non-empty text plus the step's
/// validator.
pub fn can_input_step_continue<'a>(step: &Step, input: &'a StepInput) -> StepVerdict<'a> {
    match can_step_continue(input) {
        Some(selection @ Selection::Text(_)) => match step.validate(selection) {
            Validation::Valid => StepVerdict::Continue(selection),
            Validation::Invalid(message) => StepVerdict::Reprompt(Some(message)),
        },
        _ => StepVerdict::Reprompt(None),
    }
}
