//! Integration tests for seeding: opening-round shape and bye handling.

use arm_tournament_web::{
    Bracket, Competitor, Engine, MemoryStore, SeedingPolicy, Tournament, TournamentError,
};
use std::collections::HashSet;

fn roster(n: usize) -> Vec<Competitor> {
    // Descending weights, so weight-ranked seeding keeps roster order.
    (0..n)
        .map(|i| Competitor::new(format!("C{i}"), (n - i) as u32))
        .collect()
}

fn engine(n: usize) -> Engine<MemoryStore, ()> {
    Engine::initialize(roster(n), SeedingPolicy::WeightRanked, MemoryStore::new(), ()).unwrap()
}

#[test]
fn rejects_fields_smaller_than_two() {
    for n in 0..2 {
        let err = Engine::initialize(
            roster(n),
            SeedingPolicy::WeightRanked,
            MemoryStore::new(),
            (),
        )
        .unwrap_err();
        assert_eq!(err, TournamentError::FieldTooSmall { provided: n });
    }
}

#[test]
fn rejects_duplicate_names() {
    let competitors = vec![
        Competitor::new("Sam", 10),
        Competitor::new("sam ", 8),
        Competitor::new("Alex", 9),
    ];
    let err = Engine::initialize(
        competitors,
        SeedingPolicy::WeightRanked,
        MemoryStore::new(),
        (),
    )
    .unwrap_err();
    assert_eq!(err, TournamentError::DuplicateCompetitorName);
}

/// capacity - N byes, (N - byes)/2 real bouts, every competitor exactly once.
#[test]
fn opening_round_shape_for_all_small_fields() {
    for n in 2..=33 {
        let e = engine(n);
        let t = e.tournament();
        let capacity = n.next_power_of_two();
        let byes = capacity - n;

        let opening: Vec<_> = t
            .bouts
            .iter()
            .filter(|b| b.bracket() == Bracket::Winner && b.round() == 1)
            .collect();
        assert_eq!(
            opening.iter().filter(|b| b.is_bye).count(),
            byes,
            "byes for n={n}"
        );
        assert_eq!(
            opening.iter().filter(|b| !b.is_bye).count(),
            (n - byes) / 2,
            "real bouts for n={n}"
        );

        let mut seen = HashSet::new();
        for b in &opening {
            for slot in [b.home, b.away].into_iter().flatten() {
                assert!(seen.insert(slot), "competitor drawn twice for n={n}");
            }
        }
        assert_eq!(seen.len(), n, "everyone drawn for n={n}");
    }
}

#[test]
fn weight_ranked_gives_byes_to_heaviest_seeds() {
    let e = engine(6); // capacity 8, 2 byes
    let t = e.tournament();
    assert_eq!(t.seed_order.len(), 6);
    // Heaviest two sit out round one.
    let bye_ids: Vec<_> = t
        .bouts
        .iter()
        .filter(|b| b.is_bye)
        .filter_map(|b| b.home)
        .collect();
    assert_eq!(bye_ids, t.seed_order[..2].to_vec());
}

/// Byes resolve before anyone can observe them pending.
#[test]
fn byes_resolve_immediately() {
    for n in [3, 5, 6, 7, 9, 12] {
        let e = engine(n);
        for b in &e.tournament().bouts {
            if b.is_bye {
                assert_eq!(b.winner, b.home, "bye unresolved for n={n}");
            }
        }
    }
}

#[test]
fn shuffle_policy_still_draws_everyone_once() {
    let e = Engine::initialize(
        roster(7),
        SeedingPolicy::RandomShuffle,
        MemoryStore::new(),
        (),
    )
    .unwrap();
    let t: &Tournament = e.tournament();
    let mut seen = HashSet::new();
    for b in &t.bouts {
        for slot in [b.home, b.away].into_iter().flatten() {
            assert!(seen.insert(slot));
        }
    }
    assert_eq!(seen.len(), 7);
    assert_eq!(t.seed_order.len(), 7);
}
