//! Wayfinder - a resumable, back-navigable multi-step wizard engine.
//!
//! A wizard is a named flow whose body suspends at steps (pick a value,
//! type a value, run a custom sub-interaction) and resumes with the
//! driver's answer. The engine keeps one continuous back-navigation
//! history across nested flows, supports skipping and reordering steps,
//! and treats cancellation as data rather than unwinding.
//!
//! The engine does not render anything: a driver pumps [`Flow::next`],
//! shows the yielded [`Step`], and resumes with a [`StepInput`].

pub mod error;
pub mod flow;
pub mod logging;
pub mod steps;

pub use error::FlowError;
pub use flow::{
    execute_steps, get_steps, should_confirm, skip_confirm_key, BodyFuture, CompositeDefinition,
    ConfirmationStore, Flow, FlowContext, FlowDefinition, FlowOutcome, FlowProgress, FlowSeed,
    MemoryConfirmationStore, Prompter, StepRun, SUBCOMMAND_STEP,
};
pub use steps::{
    can_input_step_continue, can_pick_step_continue, can_step_continue, Cursor, Directive,
    Navigation, NavigationContext, Selection, StartedFrom, Step, StepHandle, StepId, StepInput,
    StepKind, StepScope, StepVerdict, Validation,
};
