//! Tournament state and errors.

use crate::logic::history::History;
use crate::models::bout::{Bout, BoutId, Bracket};
use crate::models::bracket::BracketPlan;
use crate::models::competitor::{Competitor, CompetitorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Need at least 2 competitors to run a bracket.
    FieldTooSmall { provided: usize },
    /// A competitor with this name already exists (names are unique, case-insensitive).
    DuplicateCompetitorName,
    /// No bout with this id exists.
    UnknownBout(BoutId),
    /// The bout already has a recorded winner.
    BoutAlreadyDecided(BoutId),
    /// Byes resolve automatically; results cannot be submitted for them.
    ByeBout(BoutId),
    /// The submitted winner is not one of the bout's two competitors.
    InvalidWinner {
        bout: BoutId,
        competitor: CompetitorId,
    },
    /// A referenced competitor is not in the roster.
    UnknownCompetitor(CompetitorId),
    /// Structural corruption; the engine refuses to continue on such state.
    InternalInconsistency(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::FieldTooSmall { provided } => {
                write!(f, "Need at least 2 competitors, got {}", provided)
            }
            TournamentError::DuplicateCompetitorName => {
                write!(f, "A competitor with this name already exists")
            }
            TournamentError::UnknownBout(id) => write!(f, "No bout {}", id),
            TournamentError::BoutAlreadyDecided(id) => {
                write!(f, "Bout {} already has a winner", id)
            }
            TournamentError::ByeBout(id) => {
                write!(f, "Bout {} is a bye and resolves automatically", id)
            }
            TournamentError::InvalidWinner { bout, competitor } => {
                write!(f, "Competitor {} is not in bout {}", competitor, bout)
            }
            TournamentError::UnknownCompetitor(id) => {
                write!(f, "Competitor {} is not in the roster", id)
            }
            TournamentError::InternalInconsistency(msg) => {
                write!(f, "Internal inconsistency: {}", msg)
            }
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Placement table: rank (1st..) to competitor. Populated incrementally as
/// placement-determining bouts resolve.
pub type Rankings = BTreeMap<u32, CompetitorId>;

/// How the bracket is seeded from the roster.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// Descending seeding weight; roster order breaks ties.
    #[default]
    WeightRanked,
    /// Uniform random shuffle.
    RandomShuffle,
}

/// Full tournament state: roster, bouts, stage pointer, rankings, history.
/// Owned exclusively by the engine; this is also the persisted snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub created_at: DateTime<Utc>,
    /// The roster. Immutable once the bracket is seeded.
    pub competitors: Vec<Competitor>,
    pub policy: SeedingPolicy,
    /// Competitor ids in seeded order; position is the seed.
    pub seed_order: Vec<CompetitorId>,
    /// Every bout created so far, in creation order.
    pub bouts: Vec<Bout>,
    /// Index into the plan's stage sequence.
    pub current_stage: usize,
    pub rankings: Rankings,
    pub completed: bool,
    /// Snapshots of prior bout lists, for undo.
    pub history: History,
}

impl Tournament {
    /// Create an unseeded tournament from a roster. Validates the field size
    /// and name uniqueness; seeding fills `seed_order` and the opening round.
    pub fn with_roster(
        competitors: Vec<Competitor>,
        policy: SeedingPolicy,
    ) -> Result<Self, TournamentError> {
        if competitors.len() < 2 {
            return Err(TournamentError::FieldTooSmall {
                provided: competitors.len(),
            });
        }
        let mut seen = HashSet::new();
        for c in &competitors {
            if !seen.insert(c.name.trim().to_ascii_lowercase()) {
                return Err(TournamentError::DuplicateCompetitorName);
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            competitors,
            policy,
            seed_order: Vec::new(),
            bouts: Vec::new(),
            current_stage: 0,
            rankings: Rankings::new(),
            completed: false,
            history: History::default(),
        })
    }

    /// The bracket plan for this field size. Derived, never stored.
    pub fn plan(&self) -> Result<BracketPlan, TournamentError> {
        BracketPlan::new(self.competitors.len())
    }

    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    /// Seed position of a competitor (0 = top seed).
    pub fn seed_pos(&self, id: CompetitorId) -> Option<usize> {
        self.seed_order.iter().position(|&s| s == id)
    }

    pub fn bout(&self, id: BoutId) -> Option<&Bout> {
        self.bouts.iter().find(|b| b.id == id)
    }

    pub fn bout_mut(&mut self, id: BoutId) -> Option<&mut Bout> {
        self.bouts.iter_mut().find(|b| b.id == id)
    }

    /// All bouts of one bracket round, in sequence order (creation order
    /// within a round is sequence order).
    pub fn round_bouts(&self, bracket: Bracket, round: u32) -> Vec<&Bout> {
        self.bouts
            .iter()
            .filter(|b| b.id.bracket == bracket && b.id.round == round)
            .collect()
    }

    /// Structural soundness check, applied to restored snapshots. A bout
    /// referencing a competitor outside the roster is unrecoverable.
    pub fn validate(&self) -> Result<(), TournamentError> {
        let plan = self.plan()?;
        let roster: HashSet<CompetitorId> = self.competitors.iter().map(|c| c.id).collect();
        if self.seed_order.len() != roster.len()
            || !self.seed_order.iter().all(|id| roster.contains(id))
        {
            return Err(TournamentError::InternalInconsistency(
                "seed order is not a permutation of the roster".to_string(),
            ));
        }
        for b in &self.bouts {
            for slot in [b.home, b.away, b.winner].into_iter().flatten() {
                if !roster.contains(&slot) {
                    return Err(TournamentError::UnknownCompetitor(slot));
                }
            }
            if let Some(w) = b.winner {
                if !b.has_competitor(w) {
                    return Err(TournamentError::InternalInconsistency(format!(
                        "bout {} won by a competitor outside its slots",
                        b.id
                    )));
                }
            }
            if b.is_bye && !(b.home.is_some() ^ b.away.is_some()) {
                return Err(TournamentError::InternalInconsistency(format!(
                    "bye bout {} must have exactly one competitor",
                    b.id
                )));
            }
            if !b.is_bye && (b.home.is_none() || b.away.is_none()) {
                return Err(TournamentError::InternalInconsistency(format!(
                    "bout {} is missing a competitor",
                    b.id
                )));
            }
        }
        if self.current_stage >= plan.stages.len() {
            return Err(TournamentError::InternalInconsistency(
                "stage pointer past the end of the stage sequence".to_string(),
            ));
        }
        Ok(())
    }
}
