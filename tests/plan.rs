//! Bracket plan math: stage sequences, loser-round sizing, placement ranks.

use arm_tournament_web::{ordinal, Bracket, BracketPlan, StageKind};

#[test]
fn capacity_is_next_power_of_two() {
    for (n, capacity) in [(2, 2), (3, 4), (4, 4), (5, 8), (8, 8), (9, 16), (33, 64)] {
        let plan = BracketPlan::new(n).unwrap();
        assert_eq!(plan.capacity, capacity, "n={n}");
    }
}

#[test]
fn minimal_brackets_have_no_loser_rounds() {
    for n in [2, 3] {
        let plan = BracketPlan::new(n).unwrap();
        assert_eq!(plan.lb_rounds, 0);
        assert!(plan.lb_profile.is_empty());
    }
    assert_eq!(BracketPlan::new(2).unwrap().stages.len(), 3); // W1, Final, GF
    assert_eq!(BracketPlan::new(3).unwrap().stages.len(), 4); // W1, W2, Final, GF
}

#[test]
fn stage_sequence_interleaves_brackets() {
    let plan = BracketPlan::new(8).unwrap();
    let rounds: Vec<Vec<(Bracket, u32)>> =
        plan.stages.iter().map(|s| s.rounds.clone()).collect();
    assert_eq!(
        rounds,
        vec![
            vec![(Bracket::Winner, 1)],
            vec![(Bracket::Winner, 2), (Bracket::Loser, 1)],
            vec![(Bracket::Loser, 2)],
            vec![(Bracket::Winner, 3), (Bracket::Loser, 3)],
            vec![(Bracket::Loser, 4)],
            vec![(Bracket::Winner, 4)], // Final
            vec![(Bracket::Winner, 5)], // Grand Final
        ]
    );
    assert_eq!(plan.stages[5].kind, StageKind::Final);
    assert_eq!(plan.stages[6].kind, StageKind::GrandFinal);
}

/// Sizing chain for a field with byes: survivors always match what the next
/// round expects, and the loser bracket narrows to a single survivor.
#[test]
fn loser_round_profiles_are_consistent() {
    for n in 4..=33 {
        let plan = BracketPlan::new(n).unwrap();
        let mut survivors = 0;
        for (i, p) in plan.lb_profile.iter().enumerate() {
            let r = i as u32 + 1;
            let expected_in = if r == 1 {
                n - plan.capacity / 2
            } else if r % 2 == 0 {
                survivors + (plan.capacity >> (r / 2 + 1))
            } else {
                survivors
            };
            assert_eq!(p.incoming, expected_in, "n={n} round {r}");
            assert_eq!(p.incoming, p.byes + 2 * p.bouts, "n={n} round {r}");
            survivors = p.survivors();
        }
        assert_eq!(survivors, 1, "loser bracket must narrow to one, n={n}");
    }
}

#[test]
fn known_profile_for_five_competitors() {
    let plan = BracketPlan::new(5).unwrap();
    let as_tuples: Vec<_> = plan
        .lb_profile
        .iter()
        .map(|p| (p.incoming, p.byes, p.bouts))
        .collect();
    assert_eq!(as_tuples, vec![(1, 1, 0), (3, 1, 1), (2, 0, 1), (2, 0, 1)]);
}

#[test]
fn placement_ranks_partition_the_tail() {
    // 16 competitors: 1st-4th direct, then blocks 5/6, 7/8, 9-12, 13-16.
    let plan = BracketPlan::new(16).unwrap();
    assert_eq!(plan.placement_base_rank(4), 5);
    assert_eq!(plan.placement_base_rank(3), 7);
    assert_eq!(plan.placement_base_rank(2), 9);
    assert_eq!(plan.placement_base_rank(1), 13);

    let plan = BracketPlan::new(8).unwrap();
    assert_eq!(plan.placement_base_rank(2), 5);
    assert_eq!(plan.placement_base_rank(1), 7);
}

#[test]
fn labels() {
    let plan = BracketPlan::new(8).unwrap();
    assert_eq!(plan.round_label(Bracket::Winner, 1), "Winner Bracket Round 1");
    assert_eq!(plan.round_label(Bracket::Winner, 3), "Winner Bracket Final");
    assert_eq!(plan.round_label(Bracket::Winner, 4), "Final");
    assert_eq!(plan.round_label(Bracket::Winner, 5), "Grand Final");
    assert_eq!(plan.round_label(Bracket::Loser, 4), "Loser Bracket Final");
    assert_eq!(plan.round_label(Bracket::Loser, 2), "Loser Bracket Round 2");

    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(4), "4th");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(12), "12th");
    assert_eq!(ordinal(21), "21st");
}
