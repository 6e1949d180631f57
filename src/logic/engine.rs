//! Tournament controller: owns the state, applies mutations, and talks to
//! the external collaborators (store, completion notifier).
//!
//! Single-writer: every mutation is applied synchronously and in full before
//! control returns. Hosts with concurrent callers serialize access around the
//! engine.

use crate::logic::{ranking, rounds, seeding};
use crate::models::{
    Bout, BoutId, Bracket, Competitor, CompetitorId, Rankings, SeedingPolicy, Tournament,
    TournamentError, TournamentId,
};
use crate::store::SnapshotStore;

/// Called exactly once per false-to-true transition of the completion flag,
/// with the final rankings.
pub trait CompletionNotifier {
    fn tournament_completed(&self, id: TournamentId, final_rankings: &Rankings);
}

/// No-op notifier.
impl CompletionNotifier for () {
    fn tournament_completed(&self, _id: TournamentId, _final_rankings: &Rankings) {}
}

/// Maps a competitor id to a human-readable label. Presentation only: the
/// engine itself compares competitors by id, never by name.
pub trait NameResolver {
    fn display_name(&self, id: CompetitorId) -> Option<String>;
}

impl NameResolver for Tournament {
    fn display_name(&self, id: CompetitorId) -> Option<String> {
        self.competitor(id).map(|c| c.name.clone())
    }
}

/// The engine: exclusive owner of one tournament's state.
pub struct Engine<S: SnapshotStore, N: CompletionNotifier> {
    tournament: Tournament,
    store: S,
    notifier: N,
    last_store_warning: Option<String>,
}

impl<S: SnapshotStore, N: CompletionNotifier> std::fmt::Debug for Engine<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tournament", &self.tournament.id)
            .field("completed", &self.tournament.completed)
            .finish_non_exhaustive()
    }
}

impl<S: SnapshotStore, N: CompletionNotifier> Engine<S, N> {
    /// Seed a fresh tournament and persist the opening snapshot.
    pub fn initialize(
        competitors: Vec<Competitor>,
        policy: SeedingPolicy,
        store: S,
        notifier: N,
    ) -> Result<Self, TournamentError> {
        let tournament = boot(Tournament::with_roster(competitors, policy)?)?;
        log::info!(
            "Seeded tournament {} with {} competitors",
            tournament.id,
            tournament.competitors.len()
        );
        let mut engine = Self {
            tournament,
            store,
            notifier,
            last_store_warning: None,
        };
        engine.persist();
        Ok(engine)
    }

    /// Re-attach to a stored tournament. Returns None when the store has no
    /// snapshot under this id (a load failure is logged and treated as a
    /// miss); a snapshot that loads but fails validation is rejected
    /// outright.
    pub fn restore(
        id: TournamentId,
        store: S,
        notifier: N,
    ) -> Result<Option<Self>, TournamentError> {
        match load_snapshot(&store, id) {
            Some(tournament) => {
                tournament.validate()?;
                Ok(Some(Self {
                    tournament,
                    store,
                    notifier,
                    last_store_warning: None,
                }))
            }
            None => Ok(None),
        }
    }

    /// Restore if a snapshot exists under `id`, otherwise seed fresh from
    /// the roster, reusing `id` so later restores find the snapshot.
    pub fn restore_or_initialize(
        id: TournamentId,
        competitors: Vec<Competitor>,
        policy: SeedingPolicy,
        store: S,
        notifier: N,
    ) -> Result<Self, TournamentError> {
        if let Some(tournament) = load_snapshot(&store, id) {
            tournament.validate()?;
            return Ok(Self {
                tournament,
                store,
                notifier,
                last_store_warning: None,
            });
        }
        let mut tournament = boot(Tournament::with_roster(competitors, policy)?)?;
        tournament.id = id;
        log::info!(
            "No snapshot for {}; seeded fresh with {} competitors",
            id,
            tournament.competitors.len()
        );
        let mut engine = Self {
            tournament,
            store,
            notifier,
            last_store_warning: None,
        };
        engine.persist();
        Ok(engine)
    }

    /// Record a winner for a pending bout. Validation happens here at the
    /// boundary; once accepted, every downstream step must succeed.
    pub fn submit_result(
        &mut self,
        bout_id: BoutId,
        winner: CompetitorId,
    ) -> Result<&Tournament, TournamentError> {
        let t = &mut self.tournament;
        let plan = t.plan()?;
        let bout = t.bout(bout_id).ok_or(TournamentError::UnknownBout(bout_id))?;
        if bout.is_bye {
            return Err(TournamentError::ByeBout(bout_id));
        }
        if bout.is_resolved() {
            return Err(TournamentError::BoutAlreadyDecided(bout_id));
        }
        if !bout.has_competitor(winner) {
            return Err(TournamentError::InvalidWinner {
                bout: bout_id,
                competitor: winner,
            });
        }

        t.history.record(&t.bouts);
        if let Some(b) = t.bout_mut(bout_id) {
            b.winner = Some(winner);
        }
        log::info!("Bout {} won by {}", bout_id, winner);

        rounds::advance(t)?;
        t.rankings = ranking::compute_rankings(t, &plan);
        if rounds::tournament_complete(t, &plan) && !t.completed {
            t.completed = true;
            log::info!("Tournament {} complete", t.id);
            self.notifier.tournament_completed(t.id, &t.rankings);
        }
        self.persist();
        Ok(&self.tournament)
    }

    /// Roll back the most recent result submission. A no-op with no
    /// observable effect when the history stack is empty.
    pub fn undo(&mut self) -> &Tournament {
        let Some(bouts) = self.tournament.history.undo() else {
            return &self.tournament;
        };
        let t = &mut self.tournament;
        t.bouts = bouts;
        if let Ok(plan) = t.plan() {
            t.current_stage = rounds::recompute_current_stage(t, &plan);
            t.rankings = ranking::compute_rankings(t, &plan);
            t.completed = rounds::tournament_complete(t, &plan);
        }
        log::info!("Undid last result for tournament {}", t.id);
        self.persist();
        &self.tournament
    }

    /// Discard all bouts and re-seed from the given roster. Keeps the
    /// tournament's identity so the stored snapshot is replaced in place.
    pub fn reset(
        &mut self,
        competitors: Vec<Competitor>,
        policy: SeedingPolicy,
    ) -> Result<&Tournament, TournamentError> {
        let mut fresh = boot(Tournament::with_roster(competitors, policy)?)?;
        fresh.id = self.tournament.id;
        log::info!("Reset tournament {}", fresh.id);
        self.tournament = fresh;
        self.persist();
        Ok(&self.tournament)
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn rankings(&self) -> &Rankings {
        &self.tournament.rankings
    }

    pub fn is_complete(&self) -> bool {
        self.tournament.completed
    }

    /// Label of the current stage, e.g. "Winner Bracket Round 2 / Loser
    /// Bracket Round 1".
    pub fn current_stage_label(&self) -> String {
        self.tournament
            .plan()
            .ok()
            .and_then(|plan| {
                plan.stages
                    .get(self.tournament.current_stage)
                    .map(|s| s.label.clone())
            })
            .unwrap_or_default()
    }

    /// Bouts, optionally filtered by bracket and resolved state.
    pub fn bouts(&self, bracket: Option<Bracket>, resolved: Option<bool>) -> Vec<&Bout> {
        self.tournament
            .bouts
            .iter()
            .filter(|b| bracket.map_or(true, |br| b.bracket() == br))
            .filter(|b| resolved.map_or(true, |r| b.is_resolved() == r))
            .collect()
    }

    /// Warning from the most recent store interaction, if it failed. The
    /// engine keeps running on in-memory state regardless.
    pub fn last_store_warning(&self) -> Option<&str> {
        self.last_store_warning.as_deref()
    }

    fn persist(&mut self) {
        match self.store.save(&self.tournament) {
            Ok(()) => self.last_store_warning = None,
            Err(e) => {
                log::warn!("Persisting tournament {} failed: {}", self.tournament.id, e);
                self.last_store_warning = Some(e.to_string());
            }
        }
    }
}

/// Load a snapshot, degrading a store failure to a miss with a warning.
fn load_snapshot<S: SnapshotStore>(store: &S, id: TournamentId) -> Option<Tournament> {
    match store.load(id) {
        Ok(found) => found,
        Err(e) => {
            log::warn!("Store load for {} failed: {}", id, e);
            None
        }
    }
}

/// Seed the opening round, resolve byes, and prime the rankings table.
fn boot(mut tournament: Tournament) -> Result<Tournament, TournamentError> {
    seeding::seed(&mut tournament)?;
    seeding::resolve_byes(&mut tournament);
    let plan = tournament.plan()?;
    tournament.rankings = ranking::compute_rankings(&tournament, &plan);
    Ok(tournament)
}
