//! Integration tests for the wizard engine
//!
//! These tests drive complete flows the way a real driver would:
//! - Pumping `next`/`previous`/`retry` and matching the yielded steps
//! - Back-navigation within a flow and across a delegation boundary
//! - Composite subcommand picking, pre-selection, and cancellation
//! - Validation re-prompting and seeded answers
//! - Confirmation policy at top level vs. under delegation

use std::rc::Rc;

use wayfinder::{
    CompositeDefinition, Flow, FlowContext, FlowDefinition, FlowOutcome, FlowProgress, FlowSeed,
    MemoryConfirmationStore, Selection, StartedFrom, Step, StepInput, StepRun, SUBCOMMAND_STEP,
};

// ─── Fixture flows ────────────────────────────────────────────────────────────

/// Two input steps: remote name, then remote URL.
struct AddRemoteFlow;

impl FlowDefinition for AddRemoteFlow {
    fn key(&self) -> &str {
        "add"
    }

    fn label(&self) -> &str {
        "Add remote"
    }

    fn title(&self) -> &str {
        "Add Remote"
    }

    fn steps(self: Rc<Self>, ctx: FlowContext) -> wayfinder::BodyFuture {
        Box::pin(async move {
            let scope = ctx.scope();
            let mut name: Option<String> = None;
            let mut url: Option<String> = None;

            'flow: loop {
                if name.is_none() || scope.is_at_step_or_unset("name") {
                    if let Some(seeded) = ctx.seed().get("name") {
                        name = seeded.first_item().map(str::to_string);
                    } else {
                        let step = Step::input("name", "Remote name").with_validator(|value| {
                            match value.first_item() {
                                Some(text) if text.contains(' ') => wayfinder::Validation::Invalid(
                                    "remote names cannot contain spaces".into(),
                                ),
                                _ => wayfinder::Validation::Valid,
                            }
                        });
                        match ctx.run_step(&scope, step).await {
                            StepRun::Answered(selection) => {
                                name = selection.first_item().map(str::to_string);
                            }
                            StepRun::Regressed => continue 'flow,
                            StepRun::Ceded => return Ok(FlowOutcome::Broken),
                        }
                    }
                }

                if url.is_none() || scope.is_at_step_or_unset("url") {
                    let step = Step::input("url", "Remote URL");
                    match ctx.run_step(&scope, step).await {
                        StepRun::Answered(selection) => {
                            url = selection.first_item().map(str::to_string);
                        }
                        StepRun::Regressed => continue 'flow,
                        StepRun::Ceded => return Ok(FlowOutcome::Broken),
                    }
                }

                assert!(name.is_some() && url.is_some());
                scope.mark_steps_complete();
                return Ok(FlowOutcome::Completed);
            }
        })
    }
}

/// Pick a remote, then confirm (unless the policy suppresses it).
struct RemoveRemoteFlow {
    store: Rc<MemoryConfirmationStore>,
}

impl FlowDefinition for RemoveRemoteFlow {
    fn key(&self) -> &str {
        "remove"
    }

    fn label(&self) -> &str {
        "Remove remote"
    }

    fn title(&self) -> &str {
        "Remove Remote"
    }

    // Destructive: the preference store can never suppress confirmation,
    // only delegation can (the parent confirms once).
    fn can_skip_confirm(&self) -> bool {
        false
    }

    fn steps(self: Rc<Self>, ctx: FlowContext) -> wayfinder::BodyFuture {
        Box::pin(async move {
            let scope = ctx.scope();
            let mut remote: Option<String> = None;

            'flow: loop {
                if remote.is_none() || scope.is_at_step_or_unset("remote") {
                    let step =
                        Step::pick("remote", "Remove which remote?").with_items(["origin", "fork"]);
                    match ctx.run_step(&scope, step).await {
                        StepRun::Answered(selection) => {
                            remote = selection.first_item().map(str::to_string);
                        }
                        StepRun::Regressed => continue 'flow,
                        StepRun::Ceded => return Ok(FlowOutcome::Broken),
                    }
                }

                if ctx.should_confirm(self.as_ref(), self.store.as_ref()) {
                    let step = Step::pick("confirm", "Confirm removal").with_items(["yes", "no"]);
                    match ctx.run_step(&scope, step).await {
                        StepRun::Answered(selection) => {
                            if selection.first_item() != Some("yes") {
                                return Ok(FlowOutcome::Broken);
                            }
                        }
                        StepRun::Regressed => continue 'flow,
                        StepRun::Ceded => return Ok(FlowOutcome::Broken),
                    }
                }

                scope.mark_steps_complete();
                return Ok(FlowOutcome::Completed);
            }
        })
    }
}

/// Pick a remote, then edit its URL on a step that forbids going back.
struct SetUrlFlow;

impl FlowDefinition for SetUrlFlow {
    fn key(&self) -> &str {
        "set-url"
    }

    fn label(&self) -> &str {
        "Set URL"
    }

    fn title(&self) -> &str {
        "Set Remote URL"
    }

    fn steps(self: Rc<Self>, ctx: FlowContext) -> wayfinder::BodyFuture {
        Box::pin(async move {
            let scope = ctx.scope();
            let mut remote: Option<String> = None;

            'flow: loop {
                if remote.is_none() || scope.is_at_step_or_unset("remote") {
                    let step =
                        Step::pick("remote", "Which remote?").with_items(["origin", "fork"]);
                    match ctx.run_step(&scope, step).await {
                        StepRun::Answered(selection) => {
                            remote = selection.first_item().map(str::to_string);
                        }
                        StepRun::Regressed => continue 'flow,
                        StepRun::Ceded => return Ok(FlowOutcome::Broken),
                    }
                }

                let step = Step::input("url", "New URL").no_back();
                match ctx.run_step(&scope, step).await {
                    StepRun::Answered(_) => {}
                    StepRun::Regressed => continue 'flow,
                    StepRun::Ceded => return Ok(FlowOutcome::Broken),
                }

                scope.mark_steps_complete();
                return Ok(FlowOutcome::Completed);
            }
        })
    }
}

fn remote_composite(store: &Rc<MemoryConfirmationStore>) -> Rc<CompositeDefinition> {
    Rc::new(
        CompositeDefinition::new("remote", "Remote", "Manage Remotes")
            .with_subcommand(Rc::new(AddRemoteFlow))
            .with_subcommand(Rc::new(RemoveRemoteFlow {
                store: store.clone(),
            })),
    )
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn expect_step(progress: FlowProgress) -> Step {
    match progress {
        FlowProgress::Step(step) => step,
        FlowProgress::Done => panic!("expected a step, flow reported done"),
    }
}

fn expect_done(progress: FlowProgress) {
    assert!(
        matches!(progress, FlowProgress::Done),
        "expected the flow to be done"
    );
}

// ─── Single flow ──────────────────────────────────────────────────────────────

#[test]
fn test_single_flow_runs_to_completion() {
    let mut flow = Flow::new(Rc::new(AddRemoteFlow), StartedFrom::Menu, FlowSeed::new());

    let step = expect_step(flow.next(None).unwrap());
    assert_eq!(step.id, "name");
    // Menu-started: even the first step can go back (to the menu).
    assert!(step.allow_back);

    let step = expect_step(flow.next(Some(StepInput::text("upstream"))).unwrap());
    assert_eq!(step.id, "url");

    expect_done(flow.next(Some(StepInput::text("https://example.com/r.git"))).unwrap());
    assert!(flow.is_done());
    assert!(flow.navigation().borrow().current().is_complete());
}

#[test]
fn test_back_returns_to_previous_step() {
    let mut flow = Flow::new(Rc::new(AddRemoteFlow), StartedFrom::Direct, FlowSeed::new());

    let step = expect_step(flow.next(None).unwrap());
    assert_eq!(step.id, "name");
    // Direct-started: back from the first step has nowhere to go.
    assert!(!step.allow_back);

    let step = expect_step(flow.next(Some(StepInput::text("upstream"))).unwrap());
    assert_eq!(step.id, "url");
    assert!(step.allow_back);

    let step = expect_step(flow.previous().unwrap());
    assert_eq!(step.id, "name");

    // Forward again, all the way through.
    let step = expect_step(flow.next(Some(StepInput::text("upstream"))).unwrap());
    assert_eq!(step.id, "url");
    expect_done(flow.next(Some(StepInput::text("https://example.com/r.git"))).unwrap());
}

#[test]
fn test_back_out_of_direct_flow_cancels_it() {
    let mut flow = Flow::new(Rc::new(AddRemoteFlow), StartedFrom::Direct, FlowSeed::new());
    expect_step(flow.next(None).unwrap());
    expect_done(flow.previous().unwrap());
    assert!(flow.current_step().is_none());
    assert!(!flow.navigation().borrow().current().is_complete());
}

#[test]
fn test_validation_failure_reprompts_with_message() {
    let mut flow = Flow::new(Rc::new(AddRemoteFlow), StartedFrom::Direct, FlowSeed::new());
    expect_step(flow.next(None).unwrap());

    let step = expect_step(flow.next(Some(StepInput::text("two words"))).unwrap());
    assert_eq!(step.id, "name");
    assert_eq!(
        step.validation_message.as_deref(),
        Some("remote names cannot contain spaces")
    );

    let step = expect_step(flow.next(Some(StepInput::text("upstream"))).unwrap());
    assert_eq!(step.id, "url");
    assert!(step.validation_message.is_none());
}

#[test]
fn test_seeded_answer_skips_its_step() {
    let seed = FlowSeed::new().with("name", Selection::Text("upstream".into()));
    let mut flow = Flow::new(Rc::new(AddRemoteFlow), StartedFrom::Direct, seed);

    let step = expect_step(flow.next(None).unwrap());
    assert_eq!(step.id, "url");

    expect_done(flow.next(Some(StepInput::text("https://example.com/r.git"))).unwrap());
    assert!(flow.navigation().borrow().current().is_complete());
}

#[test]
fn test_retry_after_empty_resume_re_renders() {
    let mut flow = Flow::new(Rc::new(AddRemoteFlow), StartedFrom::Direct, FlowSeed::new());
    expect_step(flow.next(None).unwrap());

    // An empty answer is not progress.
    let step = expect_step(flow.next(Some(StepInput::text(""))).unwrap());
    assert_eq!(step.id, "name");

    let step = expect_step(flow.retry().unwrap());
    assert_eq!(step.id, "name");
}

#[test]
fn test_terminate_releases_all_history_levels() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let mut flow = Flow::new(remote_composite(&store), StartedFrom::Menu, FlowSeed::new());

    expect_step(flow.next(None).unwrap());
    let step = expect_step(flow.next(Some(StepInput::items(["add"]))).unwrap());
    assert_eq!(step.id, "name");
    assert_eq!(flow.navigation().borrow().depth(), 2);

    flow.terminate();
    assert_eq!(flow.navigation().borrow().depth(), 0);
    assert!(flow.is_done());
}

// ─── Composite flows ──────────────────────────────────────────────────────────

#[test]
fn test_composite_picker_delegates_and_completes() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let mut flow = Flow::new(remote_composite(&store), StartedFrom::Menu, FlowSeed::new());

    let step = expect_step(flow.next(None).unwrap());
    assert_eq!(step.id, SUBCOMMAND_STEP);
    assert_eq!(step.items, vec!["add", "remove"]);

    let step = expect_step(flow.next(Some(StepInput::items(["add"]))).unwrap());
    assert_eq!(step.id, "name");

    let step = expect_step(flow.next(Some(StepInput::text("upstream"))).unwrap());
    assert_eq!(step.id, "url");

    expect_done(flow.next(Some(StepInput::text("https://example.com/r.git"))).unwrap());
    assert!(flow.navigation().borrow().current().is_complete());
}

#[test]
fn test_back_from_subcommand_first_step_returns_to_picker() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let mut flow = Flow::new(remote_composite(&store), StartedFrom::Direct, FlowSeed::new());

    expect_step(flow.next(None).unwrap());
    let step = expect_step(flow.next(Some(StepInput::items(["add"]))).unwrap());
    assert_eq!(step.id, "name");
    // The lone subcommand step can still go back, into the picker.
    assert!(step.allow_back);

    let step = expect_step(flow.previous().unwrap());
    assert_eq!(step.id, SUBCOMMAND_STEP);

    // The abandoned subcommand left no history behind: picking the other
    // subcommand starts cleanly at its first step.
    let step = expect_step(flow.next(Some(StepInput::items(["remove"]))).unwrap());
    assert_eq!(step.id, "remote");
}

#[test]
fn test_preselected_subcommand_skips_picker() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let seed = FlowSeed::new().with(SUBCOMMAND_STEP, Selection::Items(vec!["add".into()]));
    let mut flow = Flow::new(remote_composite(&store), StartedFrom::Direct, seed);

    let step = expect_step(flow.next(None).unwrap());
    assert_eq!(step.id, "name");
}

#[test]
fn test_preselected_subcommand_break_does_not_reshow_picker() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let seed = FlowSeed::new().with(SUBCOMMAND_STEP, Selection::Items(vec!["remove".into()]));
    let mut flow = Flow::new(remote_composite(&store), StartedFrom::Direct, seed);

    let step = expect_step(flow.next(None).unwrap());
    assert_eq!(step.id, "remote");

    // Cancelling inside the pre-selected subcommand ends the whole wizard;
    // the user is not dropped into a picker they never asked for.
    expect_done(flow.next(Some(StepInput::from(wayfinder::Directive::Cancel))).unwrap());
    assert!(flow.is_done());
    assert!(flow.current_step().is_none());
}

#[test]
fn test_unknown_preselected_subcommand_is_fatal() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let seed = FlowSeed::new().with(SUBCOMMAND_STEP, Selection::Items(vec!["rename".into()]));
    let mut flow = Flow::new(remote_composite(&store), StartedFrom::Direct, seed);

    let err = flow.next(None).unwrap_err();
    assert!(err.to_string().contains("rename"));
}

// ─── Confirmation policy ──────────────────────────────────────────────────────

#[test]
fn test_destructive_flow_confirms_at_top_level() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let mut flow = Flow::new(
        Rc::new(RemoveRemoteFlow {
            store: store.clone(),
        }),
        StartedFrom::Menu,
        FlowSeed::new(),
    );

    expect_step(flow.next(None).unwrap());
    let step = expect_step(flow.next(Some(StepInput::items(["fork"]))).unwrap());
    assert_eq!(step.id, "confirm");

    expect_done(flow.next(Some(StepInput::items(["yes"]))).unwrap());
    assert!(flow.navigation().borrow().current().is_complete());
}

#[test]
fn test_declining_confirmation_cancels_the_flow() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let mut flow = Flow::new(
        Rc::new(RemoveRemoteFlow {
            store: store.clone(),
        }),
        StartedFrom::Menu,
        FlowSeed::new(),
    );

    expect_step(flow.next(None).unwrap());
    expect_step(flow.next(Some(StepInput::items(["fork"]))).unwrap());
    expect_done(flow.next(Some(StepInput::items(["no"]))).unwrap());
    assert!(!flow.navigation().borrow().current().is_complete());
}

#[test]
fn test_delegated_subcommand_does_not_reconfirm() {
    let store = Rc::new(MemoryConfirmationStore::new());
    let mut flow = Flow::new(remote_composite(&store), StartedFrom::Menu, FlowSeed::new());

    expect_step(flow.next(None).unwrap());
    let step = expect_step(flow.next(Some(StepInput::items(["remove"]))).unwrap());
    assert_eq!(step.id, "remote");

    // No confirm step under delegation: the parent owns confirmation.
    expect_done(flow.next(Some(StepInput::items(["fork"]))).unwrap());
    assert!(flow.navigation().borrow().current().is_complete());
}

// ─── Driver affordances ───────────────────────────────────────────────────────

#[test]
fn test_no_back_step_stays_locked_with_history_behind_it() {
    let mut flow = Flow::new(Rc::new(SetUrlFlow), StartedFrom::Menu, FlowSeed::new());

    let step = expect_step(flow.next(None).unwrap());
    assert_eq!(step.id, "remote");
    assert!(step.allow_back);

    // History exists behind the url step, but the step itself opts out.
    let step = expect_step(flow.next(Some(StepInput::items(["origin"]))).unwrap());
    assert_eq!(step.id, "url");
    assert!(!step.allow_back);

    expect_done(flow.next(Some(StepInput::text("https://example.com/r.git"))).unwrap());
}

#[test]
fn test_cached_can_go_back_tracks_the_open_step() {
    let mut flow = Flow::new(Rc::new(AddRemoteFlow), StartedFrom::Direct, FlowSeed::new());

    expect_step(flow.next(None).unwrap());
    assert!(!flow.navigation().borrow().can_go_back());

    expect_step(flow.next(Some(StepInput::text("upstream"))).unwrap());
    assert!(flow.navigation().borrow().can_go_back());
}
