// Round-robin fixtures, slot scheduling and the league-to-knockout format.
pub mod commands;
pub mod db;
pub mod logic;

pub use commands::{
    clear_schedule, evaluate_format, generate_schedule, schedule_repechage,
    FormatRequest, RepechageScheduleRequest, ScheduleRequest, ScheduleSummary, TeamEntry,
};
pub use db::SqliteMatchStore;
pub use logic::{
    config::EngineConfig,
    error::{EngineError, EngineResult, StoreError},
    operation_lock::TournamentLocks,
    store::{MatchStore, MemoryStore},
};
