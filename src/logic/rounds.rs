//! Round state machine: stage completion, advancement, and stage-pointer
//! recovery after an undo.

use crate::logic::{factory, seeding};
use crate::models::{BoutId, Bracket, BracketPlan, StageKind, Tournament, TournamentError};

/// A stage is complete when every non-bye bout tagged with its rounds has a
/// winner. A stage whose rounds hold only byes is complete as soon as it
/// materializes. An unmaterialized stage is not complete.
pub fn stage_complete(tournament: &Tournament, plan: &BracketPlan, stage_idx: usize) -> bool {
    let Some(stage) = plan.stages.get(stage_idx) else {
        return false;
    };
    stage.rounds.iter().all(|&(bracket, round)| {
        let bouts = tournament.round_bouts(bracket, round);
        !bouts.is_empty() && bouts.iter().all(|b| b.is_bye || b.is_resolved())
    })
}

fn stage_materialized(tournament: &Tournament, plan: &BracketPlan, stage_idx: usize) -> bool {
    plan.stages[stage_idx]
        .rounds
        .iter()
        .all(|&(bracket, round)| !tournament.round_bouts(bracket, round).is_empty())
}

/// Advance through the stage sequence as far as results allow: for every
/// completed stage, emit its placement bouts, synthesize the next stage, run
/// the bye pass, and continue (a freshly created stage may itself be complete
/// when it holds only byes). The Grand Final is only created when the
/// Loser-bracket side takes the Final.
pub fn advance(tournament: &mut Tournament) -> Result<(), TournamentError> {
    let plan = tournament.plan()?;
    loop {
        if !stage_complete(tournament, &plan, tournament.current_stage) {
            return Ok(());
        }
        emit_placements(tournament, &plan, tournament.current_stage)?;
        match plan.stages[tournament.current_stage].kind {
            StageKind::GrandFinal => return Ok(()),
            StageKind::Final => {
                if !bracket_reset_required(tournament, &plan)? {
                    return Ok(());
                }
            }
            StageKind::Rounds => {}
        }
        let next = tournament.current_stage + 1;
        if next >= plan.stages.len() {
            return Ok(());
        }
        if !stage_materialized(tournament, &plan, next) {
            let new_bouts = factory::synthesize_stage(tournament, &plan, next)?;
            if new_bouts.is_empty() {
                return Err(TournamentError::InternalInconsistency(format!(
                    "stage \"{}\" completed but \"{}\" yielded no bouts",
                    plan.stages[tournament.current_stage].label, plan.stages[next].label
                )));
            }
            log::info!(
                "Stage \"{}\" complete; created {} bout(s) for \"{}\"",
                plan.stages[tournament.current_stage].label,
                new_bouts.len(),
                plan.stages[next].label
            );
            tournament.bouts.extend(new_bouts);
            seeding::resolve_byes(tournament);
        }
        tournament.current_stage = next;
    }
}

/// The Winner-bracket survivor holds the Final's home slot; a win by the away
/// (Loser-bracket) side forces the Grand Final.
fn bracket_reset_required(
    tournament: &Tournament,
    plan: &BracketPlan,
) -> Result<bool, TournamentError> {
    let final_id = BoutId::new(Bracket::Winner, plan.final_round(), 0);
    let f = tournament
        .bout(final_id)
        .ok_or(TournamentError::UnknownBout(final_id))?;
    Ok(f.winner.is_some() && f.winner == f.away)
}

fn emit_placements(
    tournament: &mut Tournament,
    plan: &BracketPlan,
    stage_idx: usize,
) -> Result<(), TournamentError> {
    let rounds = plan.stages[stage_idx].rounds.clone();
    for (bracket, round) in rounds {
        if bracket == Bracket::Loser && plan.placement_source_rounds().contains(&round) {
            let bouts = factory::placement_bouts(tournament, plan, round)?;
            if !bouts.is_empty() {
                log::info!(
                    "Loser round {} complete; created {} placement bout(s)",
                    round,
                    bouts.len()
                );
                tournament.bouts.extend(bouts);
            }
        }
    }
    Ok(())
}

/// First stage with an unresolved non-bye bout; used to restore the stage
/// pointer after an undo. Falls back to the last materialized stage when
/// everything created so far is resolved.
pub fn recompute_current_stage(tournament: &Tournament, plan: &BracketPlan) -> usize {
    let mut last = 0;
    for idx in 0..plan.stages.len() {
        if !stage_materialized(tournament, plan, idx) {
            break;
        }
        last = idx;
        if !stage_complete(tournament, plan, idx) {
            return idx;
        }
    }
    last
}

/// The terminal bout is decided: either the Winner-bracket survivor took the
/// Final outright, or the Grand Final has a winner.
pub fn terminal_decided(tournament: &Tournament, plan: &BracketPlan) -> bool {
    let gf = tournament.bout(BoutId::new(
        Bracket::Winner,
        plan.grand_final_round(),
        0,
    ));
    if let Some(gf) = gf {
        return gf.is_resolved();
    }
    match tournament.bout(BoutId::new(Bracket::Winner, plan.final_round(), 0)) {
        Some(f) => f.winner.is_some() && f.winner == f.home,
        None => false,
    }
}

/// Complete once the terminal bout is decided and nothing (placement bouts
/// included) is left pending, so the final rankings cover every competitor.
pub fn tournament_complete(tournament: &Tournament, plan: &BracketPlan) -> bool {
    terminal_decided(tournament, plan) && tournament.bouts.iter().all(|b| b.is_resolved())
}
