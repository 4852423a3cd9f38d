// Fixture generation, slot scheduling and the league-to-knockout format.
pub mod round_robin;
pub mod schedule_generator;

pub mod format;
pub mod knockout_round;
pub mod ranking;
pub mod repechage;
