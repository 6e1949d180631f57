//! Bracket logic: seeding, stage synthesis, round progression, rankings,
//! history, and the owning engine.

mod engine;
mod factory;
pub mod history;
mod ranking;
mod rounds;
mod seeding;

pub use engine::{CompletionNotifier, Engine, NameResolver};
pub use factory::{placement_bouts, synthesize_stage};
pub use history::{History, HISTORY_LIMIT};
pub use ranking::compute_rankings;
pub use rounds::{
    advance, recompute_current_stage, stage_complete, terminal_decided, tournament_complete,
};
pub use seeding::{resolve_byes, seed, seed_order};
