// Places round-robin pairings into concrete match slots.
mod reservations;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use time_tz::Tz;

use crate::logic::{
    competition::round_robin::{Pairing, Round},
    config::SchedulerConfig,
    error::{EngineError, EngineResult},
    store::{MatchStore, OccupiedSlot},
    time::{add_days, date_to_string, is_match_day, iso_date_format, local_date, next_monday_after, resolve_start_date, resolve_timezone, to_instant, TimeOfDay},
    types::{RoundNumber, TeamId, TournamentId},
};

use self::reservations::Reservations;

// Matches only ever leave the engine unplayed. Later states belong to the host.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[derive(sqlx::Type)]
pub enum MatchStatus {
    #[default]
    Scheduled,
}

// A pairing bound to a slot, ready to be handed to the match store.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
pub struct MatchCandidate {
    pub tournament_id: TournamentId,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub round: RoundNumber,
    pub round_label: String,
    #[serde(with = "iso_date_format")]
    pub date: Date,  // Local calendar date in the schedule's timezone.
    pub time_slot: TimeOfDay,
    #[serde(with = "time::serde::rfc3339")]
    pub kickoff: OffsetDateTime,
    pub venue: String,
    pub status: MatchStatus,
    pub home_score: Option<u8>,
    pub away_score: Option<u8>,
}

impl MatchCandidate {
    pub fn slot(&self) -> OccupiedSlot {
        OccupiedSlot {
            date: self.date,
            time_slot: self.time_slot,
        }
    }
}

pub struct SlotScheduler<'a> {
    config: &'a SchedulerConfig,
    tz: &'static Tz,
}

impl<'a> SlotScheduler<'a> {
    // Build a scheduler for the given timezone, or the configured default if none is given.
    pub fn build(config: &'a SchedulerConfig, timezone: Option<&str>) -> EngineResult<Self> {
        let name = match timezone {
            Some(tz) if !tz.trim().is_empty() => tz.trim(),
            _ => config.default_timezone.as_str(),
        };

        return Ok(Self {
            config,
            tz: resolve_timezone(name)?,
        });
    }

    pub fn timezone(&self) -> &'static Tz {
        self.tz
    }

    // Get the Monday the schedule starts on.
    pub fn start_date(&self, explicit: Option<Date>, now: OffsetDateTime) -> EngineResult<Date> {
        let today = local_date(now, self.tz);
        let start = resolve_start_date(explicit, today)?;
        debug!("Schedule starts on {} (requested: {:?}, today: {})", date_to_string(start), explicit.map(date_to_string), date_to_string(today));

        return Ok(start);
    }

    // Same as above, but without an explicit date the start also moves past the last stored match day.
    pub fn start_date_after(&self, explicit: Option<Date>, last_match: Option<Date>, now: OffsetDateTime) -> EngineResult<Date> {
        if explicit.is_some() {
            return self.start_date(explicit, now);
        }

        let today = local_date(now, self.tz);
        let after = match last_match {
            Some(date) if date > today => date,
            _ => today,
        };

        let start = next_monday_after(after)?;
        debug!("Schedule starts on {} (last stored match: {:?}, today: {})", date_to_string(start), last_match.map(date_to_string), date_to_string(today));

        return Ok(start);
    }

    // Give every pairing a free slot, round by round.
    // Nothing is persisted here. Any store failure aborts the whole run.
    pub async fn schedule<S: MatchStore>(&self, store: &S, tournament_id: &str, rounds: &[Round], start: Date) -> EngineResult<Vec<MatchCandidate>> {
        let mut reservations = Reservations::default();
        let mut matches = Vec::new();

        // Never search days earlier than the last placed match.
        let mut day_offset: u32 = 0;

        for round in rounds {
            let label = match &round.label {
                Some(label) => label.clone(),
                None => self.config.locale.round_label(round.number),
            };

            for pairing in round.pairings.iter() {
                let (date, time_slot, offset) = self.find_slot(store, tournament_id, start, day_offset, &mut reservations, pairing).await?;
                day_offset = offset;

                debug!("{pairing} -> {} {time_slot}", date_to_string(date));
                matches.push(self.build_candidate(tournament_id, pairing, &label, date, time_slot)?);
            }
        }

        info!("Scheduled {} matches in {} rounds for tournament {tournament_id}", matches.len(), rounds.len());
        return Ok(matches);
    }

    // Scan forward day by day for the first slot that is free both in the store and in this run.
    async fn find_slot<S: MatchStore>(&self, store: &S, tournament_id: &str, start: Date, from_offset: u32,
    reservations: &mut Reservations, pairing: &Pairing) -> EngineResult<(Date, TimeOfDay, u32)> {
        for offset in from_offset..self.config.max_scan_days {
            let date = add_days(start, offset as i64)?;
            if !is_match_day(date) { continue; }

            // The store is read once per day and run.
            if !reservations.is_loaded(date) {
                match store.occupied_slots(tournament_id, date, date).await {
                    Ok(slots) => reservations.load(date, &slots),
                    Err(e) => {
                        warn!("Reading existing matches of {tournament_id} for {} failed: {e}", date_to_string(date));
                        return Err(e.into());
                    }
                }
            }

            for time_slot in self.config.time_slots.iter() {
                if reservations.claim(date, *time_slot) {
                    return Ok((date, *time_slot, offset));
                }
            }
        }

        warn!("No free slot for {pairing} within {} days of {}", self.config.max_scan_days, date_to_string(start));
        return Err(EngineError::SlotsExhausted {
            pairing: pairing.to_string(),
            days_scanned: self.config.max_scan_days,
        });
    }

    fn build_candidate(&self, tournament_id: &str, pairing: &Pairing, label: &str, date: Date, time_slot: TimeOfDay) -> EngineResult<MatchCandidate> {
        Ok(MatchCandidate {
            tournament_id: tournament_id.to_string(),
            home_id: pairing.home.clone(),
            away_id: pairing.away.clone(),
            round: pairing.round,
            round_label: label.to_string(),
            date,
            time_slot,
            kickoff: to_instant(date, time_slot, self.tz)?,
            venue: self.config.locale.venue_placeholder().to_string(),
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
        })
    }
}
