//! Flow definitions, the driver-facing pump, and composition.

pub mod channel;
pub mod command;
pub mod composite;
pub mod confirm;

pub use channel::{Prompter, ShowStep};
pub use command::{
    execute_steps, get_steps, BodyFuture, Flow, FlowContext, FlowDefinition, FlowOutcome,
    FlowProgress, FlowSeed, StepRun,
};
pub use composite::{CompositeDefinition, SUBCOMMAND_STEP};
pub use confirm::{should_confirm, skip_confirm_key, ConfirmationStore, MemoryConfirmationStore};
