//! Bout (a single bracket match), bracket tags, and stable bout identifiers.

use crate::models::competitor::CompetitorId;
use serde::{Deserialize, Serialize};

/// Which bracket a bout belongs to.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Bracket {
    Winner,
    Loser,
    Placement,
}

/// Stable bout identifier, derived from bracket, round, and position in the
/// round. Survives serialization round-trips unchanged, unlike a generated id.
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct BoutId {
    pub bracket: Bracket,
    pub round: u32,
    pub seq: u32,
}

impl BoutId {
    pub fn new(bracket: Bracket, round: u32, seq: u32) -> Self {
        Self { bracket, round, seq }
    }
}

impl std::fmt::Display for BoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.bracket {
            Bracket::Winner => "W",
            Bracket::Loser => "L",
            Bracket::Placement => "P",
        };
        write!(f, "{}{}.{}", tag, self.round, self.seq)
    }
}

/// A single bout. `home`/`away` may be empty only on a bye, where exactly one
/// slot is populated and the winner is set by the auto-resolution pass before
/// the bout is ever shown as pending.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bout {
    pub id: BoutId,
    pub home: Option<CompetitorId>,
    pub away: Option<CompetitorId>,
    /// None if not yet decided.
    pub winner: Option<CompetitorId>,
    pub is_bye: bool,
    /// Human-readable stage description, e.g. "Winner Bracket Round 2".
    pub stage_label: String,
}

impl Bout {
    pub fn new(
        id: BoutId,
        home: CompetitorId,
        away: CompetitorId,
        stage_label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            home: Some(home),
            away: Some(away),
            winner: None,
            is_bye: false,
            stage_label: stage_label.into(),
        }
    }

    /// A bye: one populated slot, auto-resolved by the follow-up pass.
    pub fn bye(id: BoutId, competitor: CompetitorId, stage_label: impl Into<String>) -> Self {
        Self {
            id,
            home: Some(competitor),
            away: None,
            winner: None,
            is_bye: true,
            stage_label: stage_label.into(),
        }
    }

    pub fn bracket(&self) -> Bracket {
        self.id.bracket
    }

    pub fn round(&self) -> u32 {
        self.id.round
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    /// Whether the given competitor occupies one of the two slots.
    pub fn has_competitor(&self, id: CompetitorId) -> bool {
        self.home == Some(id) || self.away == Some(id)
    }

    /// The defeated side, once a winner is recorded. Byes have no loser.
    pub fn loser(&self) -> Option<CompetitorId> {
        let w = self.winner?;
        if self.is_bye {
            return None;
        }
        if self.home == Some(w) {
            self.away
        } else {
            self.home
        }
    }
}
