//! Placement table, recomputed in full from the bout list after every
//! mutation. Recomputing (rather than patching) keeps rankings exact across
//! undo: a rank exists if and only if its determining bout currently has a
//! winner.

use crate::models::{BoutId, Bracket, BracketPlan, Rankings, Tournament};

/// Derive the placement table from resolved bouts.
///
/// Priority: Grand Final winner/loser take 1st/2nd; without a Grand Final the
/// Final decides 1st/2nd only when its home (Winner-bracket) side won,
/// otherwise both ranks wait for the reset bout. The Loser-bracket Final's
/// loser takes 3rd, the round before it decides 4th, and earlier Loser
/// rounds fill the tail in blocks resolved by placement bouts.
pub fn compute_rankings(tournament: &Tournament, plan: &BracketPlan) -> Rankings {
    let mut ranks = Rankings::new();

    let final_bout = tournament.bout(BoutId::new(Bracket::Winner, plan.final_round(), 0));
    let grand_final =
        tournament.bout(BoutId::new(Bracket::Winner, plan.grand_final_round(), 0));
    if let Some(gf) = grand_final {
        if let (Some(w), Some(l)) = (gf.winner, gf.loser()) {
            ranks.insert(1, w);
            ranks.insert(2, l);
        }
    } else if let Some(f) = final_bout {
        if let (Some(w), Some(l)) = (f.winner, f.loser()) {
            if f.winner == f.home {
                ranks.insert(1, w);
                ranks.insert(2, l);
            }
        }
    }

    match plan.field_size {
        2 => {}
        3 => {
            // Minimal bracket: the opening bout's loser is out in 3rd, known
            // the moment that bout resolves.
            if let Some(l) = tournament
                .round_bouts(Bracket::Winner, 1)
                .iter()
                .find(|b| !b.is_bye)
                .and_then(|b| b.loser())
            {
                ranks.insert(3, l);
            }
        }
        _ => {
            if let Some(l) = tournament
                .bout(BoutId::new(Bracket::Loser, plan.lb_final_round(), 0))
                .and_then(|b| b.loser())
            {
                ranks.insert(3, l);
            }
            if let Some(l) = tournament
                .round_bouts(Bracket::Loser, plan.lb_final_round() - 1)
                .iter()
                .find(|b| !b.is_bye)
                .and_then(|b| b.loser())
            {
                ranks.insert(4, l);
            }
            placement_blocks(tournament, plan, &mut ranks);
        }
    }
    ranks
}

/// Ranks 5th onward: each placement-eligible Loser round's losers form one
/// block, later rounds ranking above earlier ones. A block only ranks once
/// its source round is complete; pairs wait for their placement bout.
fn placement_blocks(tournament: &Tournament, plan: &BracketPlan, ranks: &mut Rankings) {
    for r in plan.placement_source_rounds() {
        let bouts = tournament.round_bouts(Bracket::Loser, r);
        if bouts.is_empty() || !bouts.iter().all(|b| b.is_bye || b.is_resolved()) {
            continue;
        }
        let mut losers: Vec<_> = bouts.iter().filter_map(|b| b.loser()).collect();
        if losers.is_empty() {
            continue;
        }
        losers.sort_by_key(|id| tournament.seed_pos(*id).unwrap_or(usize::MAX));
        let base = plan.placement_base_rank(r);
        let skip = losers.len() % 2;
        if skip == 1 {
            ranks.insert(base, losers[0]);
        }
        for j in 0..(losers.len() - skip) / 2 {
            let bout = tournament.bout(BoutId::new(Bracket::Placement, r, j as u32));
            if let Some((w, l)) = bout.and_then(|b| Some((b.winner?, b.loser()?))) {
                let best = base + skip as u32 + 2 * j as u32;
                ranks.insert(best, w);
                ranks.insert(best + 1, l);
            }
        }
    }
}
