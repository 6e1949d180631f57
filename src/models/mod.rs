//! Data structures for the tournament: competitors, bouts, bracket plan, state.

mod bout;
mod bracket;
mod competitor;
mod tournament;

pub use bout::{Bout, BoutId, Bracket};
pub use bracket::{ordinal, BracketPlan, LoserRoundProfile, Stage, StageKind};
pub use competitor::{roster_from_csv, Competitor, CompetitorId, RosterError};
pub use tournament::{
    Rankings, SeedingPolicy, Tournament, TournamentError, TournamentId,
};
