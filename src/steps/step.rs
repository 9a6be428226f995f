//! Step descriptors: the value objects a flow body yields and a driver renders.
//!
//! A `Step` lives for exactly one suspension: the body builds it, yields it,
//! and discards it once the driver resumes with an answer. The engine never
//! looks at rendering attributes; it only cares about the step's identity.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::directive::{Selection, Validation};

/// Flow-scoped identity of a step.
///
/// Unique within one flow's step space, not globally: the same logical name
/// may recur across different flows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StepId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// What kind of answer a step requests from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Selection from a list of items.
    Pick,
    /// Free-form text input.
    Input,
    /// A custom sub-interaction the driver implements.
    Custom,
}

/// Synchronous validator attached to a step.
///
/// Drivers that need asynchronous validation run it themselves, freezing the
/// step while the work is pending.
pub type Validator = Rc<dyn Fn(&Selection) -> Validation>;

/// One suspension point in a wizard requesting a single user decision.
#[derive(Clone)]
pub struct Step {
    pub id: StepId,
    pub kind: StepKind,
    /// Title shown by the driver.
    pub title: String,
    /// Placeholder / prompt hint.
    pub placeholder: Option<String>,
    /// Secondary descriptive line.
    pub detail: Option<String>,
    /// Item identifiers offered by a pick step.
    pub items: Vec<String>,
    /// Whether a pick step accepts more than one item.
    pub multi_select: bool,
    /// Initial value shown by an input step.
    pub value: Option<String>,
    /// Whether the driver may offer a back affordance for this step.
    pub allow_back: bool,
    /// Set while driver-side async work is pending; the driver should
    /// disable interaction until cleared.
    pub frozen: bool,
    /// Message from the last failed validation, shown on re-prompt.
    pub validation_message: Option<String>,
    pub(crate) validator: Option<Validator>,
}

impl Step {
    fn new(id: impl Into<StepId>, kind: StepKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            placeholder: None,
            detail: None,
            items: Vec::new(),
            multi_select: false,
            value: None,
            allow_back: true,
            frozen: false,
            validation_message: None,
            validator: None,
        }
    }

    /// A step that asks the user to pick from a list.
    pub fn pick(id: impl Into<StepId>, title: impl Into<String>) -> Self {
        Self::new(id, StepKind::Pick, title)
    }

    /// A step that asks the user to type a value.
    pub fn input(id: impl Into<StepId>, title: impl Into<String>) -> Self {
        Self::new(id, StepKind::Input, title)
    }

    /// A step whose interaction is entirely driver-defined.
    pub fn custom(id: impl Into<StepId>, title: impl Into<String>) -> Self {
        Self::new(id, StepKind::Custom, title)
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn multi_select(mut self) -> Self {
        self.multi_select = true;
        self
    }

    pub fn with_validator(mut self, validator: impl Fn(&Selection) -> Validation + 'static) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }

    pub fn no_back(mut self) -> Self {
        self.allow_back = false;
        self
    }

    /// Disable driver interaction while async work is pending.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Run the step's validator against a candidate answer.
    pub fn validate(&self, selection: &Selection) -> Validation {
        match &self.validator {
            Some(validator) => validator(selection),
            None => Validation::Valid,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("items", &self.items)
            .field("value", &self.value)
            .field("allow_back", &self.allow_back)
            .field("frozen", &self.frozen)
            .field("has_validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}
