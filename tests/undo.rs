//! Undo: exact restoration of bouts, rankings, stage pointer, and the
//! completion flag; bounded history; empty-stack no-op.

use arm_tournament_web::{
    BoutId, Bracket, Competitor, Engine, History, MemoryStore, SeedingPolicy, HISTORY_LIMIT,
};

fn roster(n: usize) -> Vec<Competitor> {
    (0..n)
        .map(|i| Competitor::new(format!("C{i}"), (n - i) as u32))
        .collect()
}

fn engine(n: usize) -> Engine<MemoryStore, ()> {
    Engine::initialize(roster(n), SeedingPolicy::WeightRanked, MemoryStore::new(), ()).unwrap()
}

fn wid(round: u32, seq: u32) -> BoutId {
    BoutId::new(Bracket::Winner, round, seq)
}

#[test]
fn undo_restores_presubmission_state_exactly() {
    let mut e = engine(4);
    let s = e.tournament().seed_order.clone();
    e.submit_result(wid(1, 0), s[0]).unwrap();

    let bouts_before = e.tournament().bouts.clone();
    let rankings_before = e.tournament().rankings.clone();
    let stage_before = e.tournament().current_stage;
    let completed_before = e.tournament().completed;

    // This submission completes the opening stage and creates two new bouts.
    e.submit_result(wid(1, 1), s[2]).unwrap();
    assert!(e.tournament().bouts.len() > bouts_before.len());

    e.undo();
    assert_eq!(e.tournament().bouts, bouts_before);
    assert_eq!(e.tournament().rankings, rankings_before);
    assert_eq!(e.tournament().current_stage, stage_before);
    assert_eq!(e.tournament().completed, completed_before);
}

#[test]
fn undo_reopens_a_completed_tournament() {
    let mut e = engine(2);
    let s = e.tournament().seed_order.clone();
    e.submit_result(wid(1, 0), s[0]).unwrap();
    e.submit_result(wid(2, 0), s[0]).unwrap();
    assert!(e.is_complete());
    assert_eq!(e.rankings().len(), 2);

    e.undo();
    assert!(!e.is_complete());
    assert!(e.rankings().is_empty(), "undone ranks are retracted");
    // The Final is pending again.
    let f = e.tournament().bout(wid(2, 0)).unwrap();
    assert!(f.winner.is_none());

    // Replaying the result completes the tournament again.
    e.submit_result(wid(2, 0), s[1]).unwrap();
    assert!(e.is_complete());
    assert_eq!(e.rankings().get(&1), Some(&s[1]));
}

#[test]
fn undo_with_empty_history_is_a_noop() {
    let mut e = engine(4);
    let bouts_before = e.tournament().bouts.clone();
    let stage_before = e.tournament().current_stage;
    e.undo();
    assert_eq!(e.tournament().bouts, bouts_before);
    assert_eq!(e.tournament().current_stage, stage_before);
}

#[test]
fn undo_is_single_step_only() {
    let mut e = engine(4);
    let s = e.tournament().seed_order.clone();
    e.submit_result(wid(1, 0), s[0]).unwrap();
    e.submit_result(wid(1, 1), s[2]).unwrap();

    e.undo(); // back to one result
    e.undo(); // back to none
    e.undo(); // nothing left; no-op
    assert!(e.tournament().bouts.iter().all(|b| b.is_bye || b.winner.is_none()));
    assert!(e.tournament().history.is_empty());
}

#[test]
fn history_stack_is_bounded() {
    let mut h = History::default();
    for _ in 0..(HISTORY_LIMIT + 8) {
        h.record(&[]);
    }
    assert_eq!(h.len(), HISTORY_LIMIT);
}
