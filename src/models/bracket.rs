//! Bracket plan: capacity, stage sequence, and per-round sizing, all derived
//! from the field size once at seeding time.
//!
//! The plan is the single authority on bracket shape. Winner rounds are always
//! exactly full (opening byes keep them topped up), so only Loser rounds need
//! a sizing profile: how many competitors arrive, how many receive a bye, and
//! how many bouts are fought. Those counts depend only on the field size,
//! which lets placement base ranks be fixed before a single bout is decided.

use crate::models::bout::Bracket;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};

/// Sizing of one Loser-bracket round.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoserRoundProfile {
    /// Competitors entering the round (survivors plus any fresh droppers).
    pub incoming: usize,
    /// Byes granted to the earliest-seeded prefix.
    pub byes: usize,
    /// Real bouts fought.
    pub bouts: usize,
}

impl LoserRoundProfile {
    /// Competitors leaving the round alive.
    pub fn survivors(&self) -> usize {
        self.byes + self.bouts
    }
}

/// What a stage contributes to the tournament timeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Ordinary bracket rounds, possibly one from each bracket concurrently.
    Rounds,
    Final,
    GrandFinal,
}

/// One element of the ordered stage sequence. A stage groups the bracket
/// rounds that become available at the same moment, e.g. Winner round 2 and
/// Loser round 1 are both pending once the opening round completes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub rounds: Vec<(Bracket, u32)>,
    pub label: String,
    pub kind: StageKind,
}

/// Complete bracket shape for a field of N competitors.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketPlan {
    /// Number of competitors, N.
    pub field_size: usize,
    /// Smallest power of two >= N.
    pub capacity: usize,
    /// Winner-bracket round count (log2 of capacity).
    pub wb_rounds: u32,
    /// Loser-bracket round count; 0 for the N <= 3 minimal brackets.
    pub lb_rounds: u32,
    /// Sizing per Loser round, index r-1 for round r.
    pub lb_profile: Vec<LoserRoundProfile>,
    pub stages: Vec<Stage>,
}

impl BracketPlan {
    /// Derive the plan for a field of `n` competitors. Fields of 2 and 3 use
    /// the minimal brackets documented in DESIGN.md instead of the general
    /// power-of-two scheme.
    pub fn new(n: usize) -> Result<Self, TournamentError> {
        if n < 2 {
            return Err(TournamentError::FieldTooSmall { provided: n });
        }
        let capacity = n.next_power_of_two();
        let wb_rounds = capacity.trailing_zeros();
        let lb_rounds = if n <= 3 { 0 } else { 2 * (wb_rounds - 1) };
        let lb_profile = lb_profile(n, capacity, lb_rounds);

        let mut plan = Self {
            field_size: n,
            capacity,
            wb_rounds,
            lb_rounds,
            lb_profile,
            stages: Vec::new(),
        };
        plan.stages = plan.build_stages();
        Ok(plan)
    }

    /// Winner round number reserved for the Final.
    pub fn final_round(&self) -> u32 {
        self.wb_rounds + 1
    }

    /// Winner round number reserved for the Grand Final.
    pub fn grand_final_round(&self) -> u32 {
        self.wb_rounds + 2
    }

    /// The last Loser round, i.e. the Loser-bracket Final. 0 when there is no
    /// Loser bracket.
    pub fn lb_final_round(&self) -> u32 {
        self.lb_rounds
    }

    /// Loser rounds whose losers contest placement bouts: everything below
    /// the two rounds that decide 3rd and 4th directly.
    pub fn placement_source_rounds(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.lb_rounds.saturating_sub(2)
    }

    /// Best rank contested by the losers of Loser round `r`. Rank 5 belongs
    /// to the latest eligible round; earlier eliminations rank below later
    /// ones.
    pub fn placement_base_rank(&self, r: u32) -> u32 {
        let mut base = 5;
        for later in (r + 1)..=self.lb_rounds.saturating_sub(2) {
            base += self.lb_profile[later as usize - 1].bouts as u32;
        }
        base
    }

    /// Index into `stages` of the stage containing the given round.
    pub fn stage_of(&self, bracket: Bracket, round: u32) -> Option<usize> {
        self.stages
            .iter()
            .position(|s| s.rounds.contains(&(bracket, round)))
    }

    /// Human-readable label for a bracket round, used on bouts.
    pub fn round_label(&self, bracket: Bracket, round: u32) -> String {
        match bracket {
            Bracket::Winner if round == self.final_round() => "Final".to_string(),
            Bracket::Winner if round == self.grand_final_round() => "Grand Final".to_string(),
            Bracket::Winner if round == self.wb_rounds && self.wb_rounds >= 2 => {
                "Winner Bracket Final".to_string()
            }
            Bracket::Winner => format!("Winner Bracket Round {}", round),
            Bracket::Loser if round == self.lb_rounds => "Loser Bracket Final".to_string(),
            Bracket::Loser => format!("Loser Bracket Round {}", round),
            Bracket::Placement => format!("Placement Round {}", round),
        }
    }

    fn build_stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        let rounds_stage = |rounds: Vec<(Bracket, u32)>| Stage {
            label: rounds
                .iter()
                .map(|&(b, r)| self.round_label(b, r))
                .collect::<Vec<_>>()
                .join(" / "),
            rounds,
            kind: StageKind::Rounds,
        };

        stages.push(rounds_stage(vec![(Bracket::Winner, 1)]));
        if self.field_size == 3 {
            stages.push(rounds_stage(vec![(Bracket::Winner, 2)]));
        }
        if self.field_size >= 4 {
            for j in 1..self.wb_rounds {
                stages.push(rounds_stage(vec![
                    (Bracket::Winner, j + 1),
                    (Bracket::Loser, 2 * j - 1),
                ]));
                stages.push(rounds_stage(vec![(Bracket::Loser, 2 * j)]));
            }
        }
        stages.push(Stage {
            rounds: vec![(Bracket::Winner, self.final_round())],
            label: "Final".to_string(),
            kind: StageKind::Final,
        });
        stages.push(Stage {
            rounds: vec![(Bracket::Winner, self.grand_final_round())],
            label: "Grand Final".to_string(),
            kind: StageKind::GrandFinal,
        });
        stages
    }
}

/// Per-round Loser-bracket sizing. Round 2j-1 merges nothing and round 2j
/// receives the losers of Winner round j+1; both target capacity/2^(j+1)
/// survivors. When fewer competitors arrive than two per target slot, the
/// shortfall is absorbed by byes; the counts here mirror exactly what the
/// factory will build.
fn lb_profile(n: usize, capacity: usize, lb_rounds: u32) -> Vec<LoserRoundProfile> {
    let mut profile = Vec::with_capacity(lb_rounds as usize);
    let mut survivors = 0usize;
    for r in 1..=lb_rounds {
        let j = (r as usize + 1) / 2;
        let incoming = if r == 1 {
            // Opening-round losers: only non-bye bouts produce one.
            n - capacity / 2
        } else if r % 2 == 0 {
            survivors + (capacity >> (j + 1))
        } else {
            survivors
        };
        let target = capacity >> (j + 1);
        let byes = (2 * target).saturating_sub(incoming).min(incoming);
        let bouts = (incoming - byes) / 2;
        survivors = byes + bouts;
        profile.push(LoserRoundProfile {
            incoming,
            byes,
            bouts,
        });
    }
    profile
}

/// English ordinal for a rank: 1 -> "1st", 12 -> "12th".
pub fn ordinal(rank: u32) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", rank, suffix)
}
