//! Arm-wrestling tournament organizer: double-elimination bracket engine
//! with models, logic, and pluggable snapshot persistence.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    compute_rankings, CompletionNotifier, Engine, History, NameResolver, HISTORY_LIMIT,
};
pub use models::{
    ordinal, roster_from_csv, Bout, BoutId, Bracket, BracketPlan, Competitor, CompetitorId,
    Rankings, RosterError, SeedingPolicy, Stage, StageKind, Tournament, TournamentError,
    TournamentId,
};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore, StoreError};
