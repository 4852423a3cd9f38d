// Maps a finished league table into the qualification plan and the knockout bracket.
use std::collections::HashSet;

use log::info;
use serde::{Deserialize, Serialize};

use crate::logic::{
    competition::{
        knockout_round::{build_seeds, KnockoutTree, Seed, KNOCKOUT_SIZE},
        ranking::{rank_standings, TeamStanding, LEAGUE_CRITERIA},
        repechage::{repechage_size, RepechagePlan, MIN_ELIMINATED},
    },
    config::FormatConfig,
    error::{EngineError, EngineResult},
};

// Teams that go straight to the quarterfinals.
pub const DIRECT_QUALIFIERS: usize = 6;

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct FormatPlan {
    pub standings: Vec<TeamStanding>,   // Ranked.
    pub direct_qualifiers: Vec<TeamStanding>,
    pub repechage: RepechagePlan,
    pub eliminated: Vec<TeamStanding>,
    pub seeds: Vec<Seed>,
    pub knockout: KnockoutTree,
    pub notes: Vec<String>,
}

// Check the team count and the team identities.
fn validate(standings: &[TeamStanding], bounds: &FormatConfig) -> EngineResult<()> {
    let count = standings.len();

    if bounds.min_teams > bounds.max_teams {
        return Err(EngineError::Validation(format!(
            "minimum team count {} is greater than the maximum {}", bounds.min_teams, bounds.max_teams
        )));
    }

    if count < bounds.min_teams || count > bounds.max_teams {
        return Err(EngineError::Validation(format!(
            "the format needs between {} and {} teams, got {count}", bounds.min_teams, bounds.max_teams
        )));
    }

    if count < KNOCKOUT_SIZE {
        return Err(EngineError::Validation(format!(
            "at least {KNOCKOUT_SIZE} teams are needed for the knockout stage, got {count}"
        )));
    }

    let mut ids = HashSet::new();
    for standing in standings.iter() {
        if standing.team.id.trim().is_empty() {
            return Err(EngineError::Validation(format!("team \"{}\" has no identifier", standing.team.name)));
        }
        if !ids.insert(standing.team.id.as_str()) {
            return Err(EngineError::Validation(format!("team {} appears more than once", standing.team.id)));
        }
    }

    return Ok(());
}

fn eliminated_phrase(count: usize) -> String {
    match count {
        0 => "No team was eliminated".to_string(),
        1 => "Only 1 team was eliminated".to_string(),
        n => format!("Only {n} teams were eliminated"),
    }
}

// Build the whole plan from unranked standings.
pub fn evaluate(standings: Vec<TeamStanding>, bounds: &FormatConfig) -> EngineResult<FormatPlan> {
    validate(&standings, bounds)?;

    let standings = rank_standings(standings, &LEAGUE_CRITERIA);
    let direct_qualifiers = standings[..DIRECT_QUALIFIERS].to_vec();

    let remaining = &standings[DIRECT_QUALIFIERS..];
    let group_size = repechage_size(remaining.len());
    let repechage = RepechagePlan::build(remaining[..group_size].to_vec());
    let eliminated = remaining[group_size..].to_vec();

    let mut notes = Vec::new();
    if group_size < 4 {
        notes.push(format!(
            "The repechage was reduced to {group_size} teams because only {} teams finished outside the direct qualification places.",
            remaining.len()
        ));
    }
    if eliminated.len() < MIN_ELIMINATED {
        notes.push(format!(
            "{} because of the total team count of {}.",
            eliminated_phrase(eliminated.len()), standings.len()
        ));
    }

    // The repechage logs its own notes.
    for note in notes.iter() {
        info!("{note}");
    }
    notes.extend(repechage.notes.iter().cloned());

    let seeds = build_seeds(&direct_qualifiers, &repechage)?;
    let knockout = KnockoutTree::build(&seeds)?;

    info!(
        "Format for {} teams: {} direct, {} in repechage, {} eliminated",
        standings.len(), direct_qualifiers.len(), group_size, eliminated.len()
    );

    return Ok(FormatPlan {
        standings,
        direct_qualifiers,
        repechage,
        eliminated,
        seeds,
        knockout,
        notes,
    });
}
