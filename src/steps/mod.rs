//! Step data types and navigation bookkeeping.

pub mod context;
pub mod directive;
pub mod scope;
pub mod step;

pub use context::{shared, Cursor, Navigation, NavigationContext, StartedFrom};
pub use directive::{
    can_input_step_continue, can_pick_step_continue, can_step_continue, Directive, Selection,
    StepInput, StepVerdict, Validation,
};
pub use scope::{StepHandle, StepScope};
pub use step::{Step, StepId, StepKind, Validator};
