use horilla_core::hierarchy::{
    HierarchyGuard, HierarchySource, RejectionReason, ReparentPolicy, audit_forest, has_cycles,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

use forest_generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2000))]

    #[test]
    fn generated_forests_are_healthy(forest in arb_forest()) {
        prop_assert!(audit_forest(&forest).is_healthy());
    }

    #[test]
    fn node_is_never_its_own_descendant(forest in arb_forest()) {
        let guard = HierarchyGuard::new(&forest);
        for id in forest.ids() {
            prop_assert!(!guard.descendants_of(id).contains(&id));
        }
    }

    #[test]
    fn descendants_match_ancestor_chains(forest in arb_forest()) {
        let guard = HierarchyGuard::new(&forest);
        for id in forest.ids() {
            let expected: BTreeSet<_> = forest
                .ids()
                .filter(|other| guard.ancestors_of(*other).contains(&id))
                .collect();
            prop_assert_eq!(guard.descendants_of(id), expected);
        }
    }

    #[test]
    fn accepted_assignment_keeps_forest((forest, parent, child) in arb_forest_with_pair()) {
        for policy in [ReparentPolicy::Reject, ReparentPolicy::Detach] {
            let guard = HierarchyGuard::new(&forest).with_policy(policy);
            if let Ok(assignment) = guard.validate_assignment(parent, Some(child)) {
                let mut next = forest.clone();
                next.apply(&assignment);
                prop_assert!(!has_cycles(&next), "policy {policy} produced a cycle");
                let after = HierarchyGuard::new(&next);
                for id in next.ids() {
                    prop_assert!(!after.descendants_of(id).contains(&id));
                }
            }
        }
    }

    #[test]
    fn rejection_reason_matches_first_failing_check((forest, parent, child) in arb_forest_with_pair()) {
        let guard = HierarchyGuard::new(&forest);
        let result = guard.validate_assignment(parent, Some(child));
        let expected_kind = if forest.parent_of(child).is_some() {
            "already"
        } else if parent == child {
            "self"
        } else if guard.descendants_of(child).contains(&parent) {
            "cycle"
        } else {
            "ok"
        };
        let got_kind = match result {
            Ok(_) => "ok",
            Err(RejectionReason::ChildAlreadyHasParent { .. }) => "already",
            Err(RejectionReason::SelfParenting { .. }) => "self",
            Err(RejectionReason::CycleWouldForm { .. }) => "cycle",
            Err(RejectionReason::NoChildSelected) => "none",
        };
        prop_assert_eq!(got_kind, expected_kind);
    }

    #[test]
    fn candidates_never_include_child_or_descendants((forest, _parent, child) in arb_forest_with_pair()) {
        let guard = HierarchyGuard::new(&forest);
        let candidates = guard.eligible_parent_candidates(child, forest.ids());
        let below = guard.descendants_of(child);
        prop_assert!(!candidates.contains(&child));
        prop_assert!(candidates.is_disjoint(&below));
        for candidate in &candidates {
            prop_assert!(forest.parent_of(*candidate).is_none());
        }
    }

    #[test]
    fn candidates_agree_with_validation_for_roots((forest, child) in arb_forest_with_root()) {
        prop_assert!(forest.parent_of(child).is_none());
        let guard = HierarchyGuard::new(&forest);
        for candidate in guard.eligible_parent_candidates(child, forest.ids()) {
            prop_assert!(guard.validate_assignment(candidate, Some(child)).is_ok());
        }
    }

    #[test]
    fn subtree_is_node_plus_descendants(forest in arb_forest()) {
        let guard = HierarchyGuard::new(&forest);
        for id in forest.ids() {
            let subtree = guard.subtree_of(id);
            prop_assert_eq!(subtree.first().copied(), Some(id));
            let rest: BTreeSet<_> = subtree.into_iter().skip(1).collect();
            prop_assert_eq!(rest, guard.descendants_of(id));
        }
    }
}
