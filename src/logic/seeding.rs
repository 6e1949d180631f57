//! Seeding: order the roster per policy and synthesize the opening round.

use crate::models::{
    Bout, BoutId, Bracket, CompetitorId, SeedingPolicy, Tournament, TournamentError,
};
use rand::seq::SliceRandom;

/// Order competitor ids per the seeding policy. Weight-ranked sorts by
/// descending weight (stable, so roster order breaks ties); shuffle is
/// uniform.
pub fn seed_order(tournament: &Tournament) -> Vec<CompetitorId> {
    let mut order: Vec<CompetitorId> = tournament.competitors.iter().map(|c| c.id).collect();
    match tournament.policy {
        SeedingPolicy::WeightRanked => {
            order.sort_by_key(|id| {
                std::cmp::Reverse(tournament.competitor(*id).map(|c| c.weight).unwrap_or(0))
            });
        }
        SeedingPolicy::RandomShuffle => {
            order.shuffle(&mut rand::thread_rng());
        }
    }
    order
}

/// Seed the bracket: fix the seed order and create the Winner-bracket opening
/// round. The top `capacity - N` seeds take byes (low sequence numbers), the
/// rest pair consecutively in seeded order.
pub fn seed(tournament: &mut Tournament) -> Result<(), TournamentError> {
    let plan = tournament.plan()?;
    tournament.seed_order = seed_order(tournament);

    let byes = plan.capacity - plan.field_size;
    let label = plan.round_label(Bracket::Winner, 1);
    let mut bouts = Vec::with_capacity(plan.capacity / 2);
    for (seq, id) in tournament.seed_order[..byes].iter().enumerate() {
        bouts.push(Bout::bye(
            BoutId::new(Bracket::Winner, 1, seq as u32),
            *id,
            label.clone(),
        ));
    }
    for (i, pair) in tournament.seed_order[byes..].chunks(2).enumerate() {
        bouts.push(Bout::new(
            BoutId::new(Bracket::Winner, 1, (byes + i) as u32),
            pair[0],
            pair[1],
            label.clone(),
        ));
    }
    tournament.bouts = bouts;
    tournament.current_stage = 0;
    Ok(())
}

/// Auto-resolve byes: a bye's winner is its sole competitor. Runs as an
/// immediate follow-up pass after any mutation that can introduce a bye, so
/// readers never observe a pending bye.
pub fn resolve_byes(tournament: &mut Tournament) {
    for b in &mut tournament.bouts {
        if b.is_bye && b.winner.is_none() {
            b.winner = b.home.or(b.away);
        }
    }
}
