// Custom types that are widely used are defined here.
use sqlx::SqlitePool;

pub type Db = SqlitePool;

// Identifiers owned by the host application. The engine treats them as opaque.
pub type TeamId = String;
pub type TournamentId = String;

// Identifiers of repechage and knockout matches, generated by the format plan.
pub type MatchId = String;

// Round numbers start from 1.
pub type RoundNumber = u32;

// Bracket positions 1..=8.
pub type SeedPosition = u8;

// Type conversions.
pub mod convert {
    use std::fmt::Display;

    use crate::logic::error::EngineError;

    // Convert between integers, reporting overflow as a validation error.
    pub fn int<N1: Display + Copy, N2: TryFrom<N1>>(num: N1) -> Result<N2, EngineError> {
        match num.try_into() {
            Ok(n) => Ok(n),
            Err(_) => Err(EngineError::Validation(format!("number out of range: {num}")))
        }
    }
}
