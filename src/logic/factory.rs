//! Stage synthesis: pure construction of the next round's bouts from prior
//! results.
//!
//! Lineage rules:
//! - Winner round r+1 pairs the winners of Winner round r consecutively in
//!   sequence order; opening byes hold the low sequence numbers, so bye
//!   survivors lead the pairing order in round 2.
//! - Loser minor rounds (odd) pair the prior Loser round's survivors
//!   consecutively. Loser major rounds (even) merge the losers just dropped
//!   from the Winner bracket with the prior Loser round's survivors; in a
//!   full round the dropper takes the home slot against the survivor of the
//!   same index. When the plan calls for byes, the combined population is
//!   re-ordered by seed position, the earliest-seeded prefix byes out, and
//!   the remainder pairs consecutively.
//! - The Final pairs the sole Winner-bracket survivor (home) against the
//!   sole Loser-bracket survivor (away); the Grand Final repeats that
//!   pairing.
//!
//! Synthesis is idempotent: rounds that already have bouts are skipped, and
//! placement bouts are never regenerated.

use crate::models::{
    ordinal, Bout, BoutId, Bracket, BracketPlan, CompetitorId, Tournament, TournamentError,
};

/// Winners of a round in sequence order, bye survivors included.
fn round_winners(
    tournament: &Tournament,
    bracket: Bracket,
    round: u32,
) -> Result<Vec<CompetitorId>, TournamentError> {
    let mut bouts = tournament.round_bouts(bracket, round);
    bouts.sort_by_key(|b| b.id.seq);
    bouts
        .iter()
        .map(|b| {
            b.winner.ok_or_else(|| {
                TournamentError::InternalInconsistency(format!(
                    "bout {} feeds a later round but has no winner",
                    b.id
                ))
            })
        })
        .collect()
}

/// Losers of a round's real bouts in sequence order. Byes produce no loser.
fn round_losers(
    tournament: &Tournament,
    bracket: Bracket,
    round: u32,
) -> Result<Vec<CompetitorId>, TournamentError> {
    let mut bouts = tournament.round_bouts(bracket, round);
    bouts.sort_by_key(|b| b.id.seq);
    bouts
        .iter()
        .filter(|b| !b.is_bye)
        .map(|b| {
            b.loser().ok_or_else(|| {
                TournamentError::InternalInconsistency(format!(
                    "bout {} feeds a later round but has no loser",
                    b.id
                ))
            })
        })
        .collect()
}

/// Synthesize every bout of the given stage from resolved prior rounds.
/// Returns only bouts that do not already exist.
pub fn synthesize_stage(
    tournament: &Tournament,
    plan: &BracketPlan,
    stage_idx: usize,
) -> Result<Vec<Bout>, TournamentError> {
    let stage = plan.stages.get(stage_idx).ok_or_else(|| {
        TournamentError::InternalInconsistency(format!("no stage {}", stage_idx))
    })?;
    let mut out = Vec::new();
    for &(bracket, round) in &stage.rounds {
        if !tournament.round_bouts(bracket, round).is_empty() {
            continue;
        }
        match bracket {
            Bracket::Winner if round == plan.final_round() => {
                out.push(final_bout(tournament, plan)?);
            }
            Bracket::Winner if round == plan.grand_final_round() => {
                out.push(grand_final_bout(tournament, plan)?);
            }
            Bracket::Winner => out.extend(winner_round(tournament, plan, round)?),
            Bracket::Loser => out.extend(loser_round(tournament, plan, round)?),
            Bracket::Placement => {
                return Err(TournamentError::InternalInconsistency(
                    "placement rounds are not part of the stage sequence".to_string(),
                ))
            }
        }
    }
    Ok(out)
}

fn winner_round(
    tournament: &Tournament,
    plan: &BracketPlan,
    round: u32,
) -> Result<Vec<Bout>, TournamentError> {
    if round < 2 || round > plan.wb_rounds {
        return Err(TournamentError::InternalInconsistency(format!(
            "winner round {} cannot be synthesized",
            round
        )));
    }
    let pop = round_winners(tournament, Bracket::Winner, round - 1)?;
    let expected = plan.capacity >> (round - 1);
    if pop.len() != expected {
        return Err(TournamentError::InternalInconsistency(format!(
            "winner round {} expects {} entrants, found {}",
            round,
            expected,
            pop.len()
        )));
    }
    let label = plan.round_label(Bracket::Winner, round);
    Ok(pop
        .chunks(2)
        .enumerate()
        .map(|(seq, pair)| {
            Bout::new(
                BoutId::new(Bracket::Winner, round, seq as u32),
                pair[0],
                pair[1],
                label.clone(),
            )
        })
        .collect())
}

fn loser_round(
    tournament: &Tournament,
    plan: &BracketPlan,
    round: u32,
) -> Result<Vec<Bout>, TournamentError> {
    let profile = plan
        .lb_profile
        .get(round as usize - 1)
        .copied()
        .ok_or_else(|| {
            TournamentError::InternalInconsistency(format!(
                "loser round {} outside the plan",
                round
            ))
        })?;
    let droppers = if round == 1 {
        round_losers(tournament, Bracket::Winner, 1)?
    } else if round % 2 == 0 {
        round_losers(tournament, Bracket::Winner, round / 2 + 1)?
    } else {
        Vec::new()
    };
    let survivors = if round == 1 {
        Vec::new()
    } else {
        round_winners(tournament, Bracket::Loser, round - 1)?
    };
    if droppers.len() + survivors.len() != profile.incoming {
        return Err(TournamentError::InternalInconsistency(format!(
            "loser round {} expects {} entrants, found {}",
            round,
            profile.incoming,
            droppers.len() + survivors.len()
        )));
    }

    let label = plan.round_label(Bracket::Loser, round);
    let mut bouts = Vec::with_capacity(profile.byes + profile.bouts);
    if profile.byes == 0 && round % 2 == 0 {
        // Full major round: fresh dropper meets the survivor of the same index.
        for (seq, (d, s)) in droppers.iter().zip(survivors.iter()).enumerate() {
            bouts.push(Bout::new(
                BoutId::new(Bracket::Loser, round, seq as u32),
                *d,
                *s,
                label.clone(),
            ));
        }
    } else if profile.byes == 0 {
        let pop = if round == 1 { droppers } else { survivors };
        for (seq, pair) in pop.chunks(2).enumerate() {
            bouts.push(Bout::new(
                BoutId::new(Bracket::Loser, round, seq as u32),
                pair[0],
                pair[1],
                label.clone(),
            ));
        }
    } else {
        // Short round: byes go to the earliest-seeded prefix, the rest pair
        // consecutively in seed order.
        let mut pop: Vec<CompetitorId> = droppers.into_iter().chain(survivors).collect();
        pop.sort_by_key(|id| tournament.seed_pos(*id).unwrap_or(usize::MAX));
        for (seq, id) in pop[..profile.byes].iter().enumerate() {
            bouts.push(Bout::bye(
                BoutId::new(Bracket::Loser, round, seq as u32),
                *id,
                label.clone(),
            ));
        }
        for (i, pair) in pop[profile.byes..].chunks(2).enumerate() {
            bouts.push(Bout::new(
                BoutId::new(Bracket::Loser, round, (profile.byes + i) as u32),
                pair[0],
                pair[1],
                label.clone(),
            ));
        }
    }
    Ok(bouts)
}

/// The sole Winner-bracket survivor meets the sole Loser-bracket survivor.
fn final_bout(tournament: &Tournament, plan: &BracketPlan) -> Result<Bout, TournamentError> {
    let wb_survivor = sole(
        round_winners(tournament, Bracket::Winner, plan.wb_rounds)?,
        "winner bracket survivor",
    )?;
    let lb_survivor = match plan.field_size {
        2 => sole(
            round_losers(tournament, Bracket::Winner, 1)?,
            "opening round loser",
        )?,
        3 => sole(
            round_losers(tournament, Bracket::Winner, 2)?,
            "winner bracket final loser",
        )?,
        _ => sole(
            round_winners(tournament, Bracket::Loser, plan.lb_final_round())?,
            "loser bracket survivor",
        )?,
    };
    Ok(Bout::new(
        BoutId::new(Bracket::Winner, plan.final_round(), 0),
        wb_survivor,
        lb_survivor,
        plan.round_label(Bracket::Winner, plan.final_round()),
    ))
}

/// Bracket reset: the Final's two competitors meet again, same slots.
fn grand_final_bout(
    tournament: &Tournament,
    plan: &BracketPlan,
) -> Result<Bout, TournamentError> {
    let final_id = BoutId::new(Bracket::Winner, plan.final_round(), 0);
    let f = tournament
        .bout(final_id)
        .ok_or(TournamentError::UnknownBout(final_id))?;
    match (f.home, f.away) {
        (Some(home), Some(away)) => Ok(Bout::new(
            BoutId::new(Bracket::Winner, plan.grand_final_round(), 0),
            home,
            away,
            plan.round_label(Bracket::Winner, plan.grand_final_round()),
        )),
        _ => Err(TournamentError::InternalInconsistency(
            "final bout is missing a competitor".to_string(),
        )),
    }
}

/// Placement bouts for the losers of a completed Loser round: losers ordered
/// by seed, an odd straggler takes the block's best rank outright, the rest
/// pair consecutively, best ranks first. Never regenerated once created.
pub fn placement_bouts(
    tournament: &Tournament,
    plan: &BracketPlan,
    lb_round: u32,
) -> Result<Vec<Bout>, TournamentError> {
    if !tournament
        .round_bouts(Bracket::Placement, lb_round)
        .is_empty()
    {
        return Ok(Vec::new());
    }
    let mut losers = round_losers(tournament, Bracket::Loser, lb_round)?;
    if losers.len() < 2 {
        return Ok(Vec::new());
    }
    losers.sort_by_key(|id| tournament.seed_pos(*id).unwrap_or(usize::MAX));
    let skip = losers.len() % 2;
    let base = plan.placement_base_rank(lb_round) + skip as u32;
    Ok(losers[skip..]
        .chunks(2)
        .enumerate()
        .map(|(j, pair)| {
            let best = base + 2 * j as u32;
            Bout::new(
                BoutId::new(Bracket::Placement, lb_round, j as u32),
                pair[0],
                pair[1],
                format!("Placement {}/{}", ordinal(best), ordinal(best + 1)),
            )
        })
        .collect())
}

fn sole(mut ids: Vec<CompetitorId>, what: &str) -> Result<CompetitorId, TournamentError> {
    if ids.len() != 1 {
        return Err(TournamentError::InternalInconsistency(format!(
            "expected exactly one {}, found {}",
            what,
            ids.len()
        )));
    }
    Ok(ids.remove(0))
}
