//! Property-based tests for LifecycleService.

use proptest::prelude::*;
use siteledger_shared::ProjectDefaults;

use crate::lifecycle::service::LifecycleService;
use crate::lifecycle::stage::Stage;
use crate::project::Project;

/// Strategy for generating random Stage values.
fn arb_stage() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

fn project_at(stage: Stage) -> Project {
    let mut project = Project::new("Prop", &ProjectDefaults::default());
    project.stage = stage;
    project.normalise()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A transition is a no-op unless `to` is the single legal successor.
    #[test]
    fn prop_transition_only_to_successor(from in arb_stage(), to in arb_stage()) {
        let project = project_at(from);
        let next = LifecycleService::transition_stage(&project, to);

        if from.next() == Some(to) {
            prop_assert_eq!(next.stage, to);
            prop_assert_eq!(next.revision, project.revision + 1);
        } else {
            prop_assert_eq!(next, project);
        }
    }

    /// Any sequence of transitions only ever moves forward one stage at a time.
    #[test]
    fn prop_stage_never_regresses(targets in prop::collection::vec(arb_stage(), 0..20)) {
        let mut project = project_at(Stage::Lead);
        for to in targets {
            let before = project.stage;
            project = LifecycleService::transition_stage(&project, to);
            prop_assert!(project.stage == before || before.next() == Some(project.stage));
        }
    }

    /// Job stages always carry job records after a transition.
    #[test]
    fn prop_job_stages_have_records(targets in prop::collection::vec(arb_stage(), 0..20)) {
        let mut project = project_at(Stage::Lead);
        for to in targets {
            project = LifecycleService::transition_stage(&project, to);
            prop_assert_eq!(project.stage.is_job(), project.is_job());
        }
    }
}
