// Functions the host application calls. Requests and replies are plain serde types.
use std::collections::HashSet;

use log::info;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::logic::{
    competition::{
        format::{evaluate, FormatPlan},
        ranking::TeamStanding,
        repechage::RepechagePlan,
        round_robin::generate_rounds,
        schedule_generator::SlotScheduler,
    },
    config::{EngineConfig, FormatConfig},
    error::{EngineError, EngineResult},
    store::MatchStore,
    team::TeamRef,
    time::{date_to_string, option_iso_date_format},
    types::{RoundNumber, TournamentId},
};

// A team as the host sends it. Both fields are required but checked here.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone)]
pub struct TeamEntry {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl TeamEntry {
    pub fn build(id: &str, name: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone)]
pub struct ScheduleRequest {
    pub tournament_id: TournamentId,
    pub teams: Vec<TeamEntry>,
    #[serde(default, with = "option_iso_date_format")]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct ScheduleSummary {
    pub matches_created: u64,
    pub rounds: usize,
    pub round_numbers: Vec<RoundNumber>,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone)]
pub struct FormatRequest {
    pub standings: Vec<TeamStanding>,
    #[serde(default)]
    pub min_teams: Option<usize>,
    #[serde(default)]
    pub max_teams: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone)]
pub struct RepechageScheduleRequest {
    pub tournament_id: TournamentId,
    pub repechage: RepechagePlan,
    #[serde(default, with = "option_iso_date_format")]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub timezone: Option<String>,
}

fn validate_tournament_id(tournament_id: &str) -> EngineResult<()> {
    if tournament_id.trim().is_empty() {
        return Err(EngineError::Validation("tournament identifier is missing".to_string()));
    }
    return Ok(());
}

// Turn the host's team entries into team references, rejecting anything incomplete.
fn validate_teams(entries: &[TeamEntry], min_teams: usize) -> EngineResult<Vec<TeamRef>> {
    if entries.len() < min_teams {
        return Err(EngineError::Validation(format!(
            "at least {min_teams} teams are required, got {}", entries.len()
        )));
    }

    let mut teams = Vec::new();
    let mut seen = HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let id = entry.id.as_deref().map(str::trim).unwrap_or_default();
        let name = entry.name.as_deref().map(str::trim).unwrap_or_default();

        if id.is_empty() {
            return Err(EngineError::Validation(format!("team entry {} has no identifier", i + 1)));
        }
        if name.is_empty() {
            return Err(EngineError::Validation(format!("team {id} has no name")));
        }
        if !seen.insert(id.to_string()) {
            return Err(EngineError::Validation(format!("team {id} is listed more than once")));
        }

        teams.push(TeamRef::build(id, name));
    }

    return Ok(teams);
}

// Generate the round-robin fixture list, place it into slots and persist it in one batch.
// `now` decides the start date when the request has none.
pub async fn generate_schedule<S: MatchStore>(store: &S, config: &EngineConfig, request: &ScheduleRequest, now: OffsetDateTime) -> EngineResult<ScheduleSummary> {
    validate_tournament_id(&request.tournament_id)?;
    let teams = validate_teams(&request.teams, config.scheduler.min_teams)?;

    let scheduler = SlotScheduler::build(&config.scheduler, request.timezone.as_deref())?;
    let start = scheduler.start_date(request.start_date, now)?;

    let rounds = generate_rounds(&teams);
    let matches = scheduler.schedule(store, &request.tournament_id, &rounds, start).await?;

    // Only a complete schedule ever reaches the store.
    let matches_created = store.insert_matches(&matches).await?;
    info!(
        "Created {matches_created} matches for tournament {} starting {}",
        request.tournament_id, date_to_string(start)
    );

    return Ok(ScheduleSummary {
        matches_created,
        rounds: rounds.len(),
        round_numbers: rounds.iter().map(|r| r.number).collect(),
    });
}

// Remove every stored match of the tournament, so that generation can be re-run from scratch.
pub async fn clear_schedule<S: MatchStore>(store: &S, tournament_id: &str) -> EngineResult<u64> {
    validate_tournament_id(tournament_id)?;

    let removed = store.clear_tournament(tournament_id).await?;
    info!("Removed {removed} matches from tournament {tournament_id}");

    return Ok(removed);
}

// Build the qualification plan and the knockout bracket from final standings.
pub fn evaluate_format(config: &EngineConfig, request: FormatRequest) -> EngineResult<FormatPlan> {
    let bounds = FormatConfig {
        min_teams: request.min_teams.unwrap_or(config.format.min_teams),
        max_teams: request.max_teams.unwrap_or(config.format.max_teams),
    };

    return evaluate(request.standings, &bounds);
}

// Place the two legs of every repechage tie into free slots.
// Without a start date they begin the Monday after the tournament's last stored match.
pub async fn schedule_repechage<S: MatchStore>(store: &S, config: &EngineConfig, request: &RepechageScheduleRequest, now: OffsetDateTime) -> EngineResult<ScheduleSummary> {
    validate_tournament_id(&request.tournament_id)?;

    let rounds = request.repechage.leg_rounds(config.scheduler.locale);
    if rounds.is_empty() {
        info!("Tournament {} has no repechage matches to schedule", request.tournament_id);
        return Ok(ScheduleSummary::default());
    }

    let scheduler = SlotScheduler::build(&config.scheduler, request.timezone.as_deref())?;
    let last_match = match request.start_date {
        Some(_) => None,
        None => store.latest_match_date(&request.tournament_id).await?,
    };
    let start = scheduler.start_date_after(request.start_date, last_match, now)?;

    let matches = scheduler.schedule(store, &request.tournament_id, &rounds, start).await?;
    let matches_created = store.insert_matches(&matches).await?;

    return Ok(ScheduleSummary {
        matches_created,
        rounds: rounds.len(),
        round_numbers: rounds.iter().map(|r| r.number).collect(),
    });
}
