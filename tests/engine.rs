//! Engine boundary: input validation, persistence behavior, and the
//! completion notifier contract.

use arm_tournament_web::{
    BoutId, Bracket, Competitor, CompletionNotifier, Engine, JsonFileStore, MemoryStore,
    Rankings, SeedingPolicy, SnapshotStore, StoreError, Tournament, TournamentError,
    TournamentId,
};
use std::sync::{Arc, Mutex};

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
fn rejects_unknown_bout() {
    let mut e = engine(4);
    let s = e.tournament().seed_order.clone();
    let missing = BoutId::new(Bracket::Loser, 9, 0);
    assert_eq!(
        e.submit_result(missing, s[0]),
        Err(TournamentError::UnknownBout(missing))
    );
}

#[test]
fn rejects_winner_outside_the_bout() {
    let mut e = engine(4);
    let s = e.tournament().seed_order.clone();
    let before = e.tournament().bouts.clone();
    // Seeds 2 and 3 fight bout W1.1; seed 0 is not in it.
    let err = e.submit_result(wid(1, 1), s[0]).unwrap_err();
    assert_eq!(
        err,
        TournamentError::InvalidWinner {
            bout: wid(1, 1),
            competitor: s[0],
        }
    );
    assert_eq!(e.tournament().bouts, before, "state unchanged on rejection");
    assert!(e.tournament().history.is_empty());
}

#[test]
fn rejects_double_submission() {
    let mut e = engine(4);
    let s = e.tournament().seed_order.clone();
    e.submit_result(wid(1, 0), s[0]).unwrap();
    assert_eq!(
        e.submit_result(wid(1, 0), s[1]),
        Err(TournamentError::BoutAlreadyDecided(wid(1, 0)))
    );
}

#[test]
fn rejects_results_for_byes() {
    let mut e = engine(3);
    let s = e.tournament().seed_order.clone();
    assert_eq!(
        e.submit_result(wid(1, 0), s[0]),
        Err(TournamentError::ByeBout(wid(1, 0)))
    );
}

#[test]
fn snapshot_round_trips_through_a_shared_store() {
    let store = Arc::new(MemoryStore::new());
    let mut e = Engine::initialize(
        roster(4),
        SeedingPolicy::WeightRanked,
        store.clone(),
        (),
    )
    .unwrap();
    let s = e.tournament().seed_order.clone();
    e.submit_result(wid(1, 0), s[0]).unwrap();
    e.submit_result(wid(1, 1), s[2]).unwrap();
    let id = e.tournament().id;
    let live = e.tournament().clone();
    drop(e);

    let restored = Engine::restore(id, store, ()).unwrap().unwrap();
    let t = restored.tournament();
    assert_eq!(t.bouts, live.bouts);
    assert_eq!(t.rankings, live.rankings);
    assert_eq!(t.current_stage, live.current_stage);
    assert_eq!(t.completed, live.completed);
    assert_eq!(t.history.len(), live.history.len());
    assert_eq!(t.seed_order, live.seed_order);
}

#[test]
fn restore_or_initialize_falls_back_to_fresh_seeding() {
    let store = Arc::new(MemoryStore::new());
    let id = TournamentId::new_v4();
    let e = Engine::restore_or_initialize(
        id,
        roster(4),
        SeedingPolicy::WeightRanked,
        store.clone(),
        (),
    )
    .unwrap();
    assert_eq!(e.tournament().id, id);
    drop(e);
    // The fresh seed was persisted under the requested id.
    let again = Engine::restore(id, store, ()).unwrap();
    assert!(again.is_some());
}

#[test]
fn file_store_round_trips() {
    let dir = std::env::temp_dir().join(format!("arm-tournament-{}", TournamentId::new_v4()));
    let store = JsonFileStore::new(&dir).unwrap();
    let mut e = Engine::initialize(roster(5), SeedingPolicy::WeightRanked, store, ()).unwrap();
    let s = e.tournament().seed_order.clone();
    e.submit_result(BoutId::new(Bracket::Winner, 1, 3), s[3])
        .unwrap();
    let id = e.tournament().id;
    let bouts = e.tournament().bouts.clone();
    drop(e);

    let store = JsonFileStore::new(&dir).unwrap();
    let restored = Engine::restore(id, store, ()).unwrap().unwrap();
    assert_eq!(restored.tournament().bouts, bouts);
    std::fs::remove_dir_all(&dir).ok();
}

/// A store that always fails.
struct BrokenStore;

impl SnapshotStore for BrokenStore {
    fn save(&self, _tournament: &Tournament) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")))
    }

    fn load(&self, _id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")))
    }
}

#[test]
fn store_failure_is_a_warning_not_a_crash() {
    let mut e =
        Engine::initialize(roster(4), SeedingPolicy::WeightRanked, BrokenStore, ()).unwrap();
    assert!(e.last_store_warning().is_some());
    let s = e.tournament().seed_order.clone();
    e.submit_result(wid(1, 0), s[0]).unwrap();
    assert!(e.last_store_warning().is_some());
    assert!(e.tournament().bout(wid(1, 0)).unwrap().is_resolved());
}

#[test]
fn restore_treats_store_failure_as_a_miss() {
    let found = Engine::restore(TournamentId::new_v4(), BrokenStore, ()).unwrap();
    assert!(found.is_none());
}

/// Records every completion callback.
#[derive(Clone, Default)]
struct RecordingNotifier {
    calls: Arc<Mutex<Vec<Rankings>>>,
}

impl CompletionNotifier for RecordingNotifier {
    fn tournament_completed(&self, _id: TournamentId, final_rankings: &Rankings) {
        self.calls.lock().unwrap().push(final_rankings.clone());
    }
}

#[test]
fn notifier_fires_once_with_final_rankings() {
    let notifier = RecordingNotifier::default();
    let calls = notifier.calls.clone();
    let mut e = Engine::initialize(
        roster(2),
        SeedingPolicy::WeightRanked,
        MemoryStore::new(),
        notifier,
    )
    .unwrap();
    let s = e.tournament().seed_order.clone();
    e.submit_result(wid(1, 0), s[0]).unwrap();
    assert!(calls.lock().unwrap().is_empty());
    e.submit_result(wid(2, 0), s[0]).unwrap();

    let seen = calls.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), 2);
    assert_eq!(seen[0].get(&1), Some(&s[0]));
}

#[test]
fn reset_discards_bouts_and_reseeds() {
    let mut e = engine(4);
    let s = e.tournament().seed_order.clone();
    let id = e.tournament().id;
    e.submit_result(wid(1, 0), s[0]).unwrap();
    e.submit_result(wid(1, 1), s[2]).unwrap();

    let roster_again = e.tournament().competitors.clone();
    e.reset(roster_again, SeedingPolicy::WeightRanked).unwrap();
    let t = e.tournament();
    assert_eq!(t.id, id, "reset keeps the tournament identity");
    assert_eq!(t.bouts.len(), 2, "back to the opening round");
    assert!(t.bouts.iter().all(|b| b.winner.is_none()));
    assert!(t.rankings.is_empty());
    assert!(t.history.is_empty());
    assert!(!t.completed);
}
