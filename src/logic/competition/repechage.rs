// The play-in stage for teams just below the direct qualification places.
use log::info;
use ordinal::ToOrdinal as _;
use serde::{Deserialize, Serialize};

use crate::logic::{
    competition::{knockout_round::{TieBreak, KNOCKOUT_TIE_BREAKS}, ranking::TeamStanding, round_robin::{Pairing, Round}},
    config::Locale,
    team::TeamRef,
    types::MatchId,
};

// How many teams the repechage takes when there are enough of them.
pub const PREFERRED_GROUP_SIZE: usize = 4;

// How many teams should go out when the team count allows it.
pub const MIN_ELIMINATED: usize = 3;

// Get the size of the repechage group from the number of teams left after direct qualification.
//
//  remaining | 0 1 2 3 4 5 6 7 8+
//  group     | 0 1 2 2 4 2 3 4 4
pub fn repechage_size(remaining: usize) -> usize {
    // Keep three teams out where possible.
    let size = PREFERRED_GROUP_SIZE.min(remaining.saturating_sub(MIN_ELIMINATED));

    match (size, remaining) {
        (0..=1, 4..) => PREFERRED_GROUP_SIZE,
        (0..=1, 2..=3) => 2,
        (0..=1, _) => remaining,
        _ => size,
    }
}

// One two-legged repechage tie.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
pub struct RepechageMatch {
    pub id: MatchId,
    pub label: String,  // E.g. "7 vs 10".
    pub higher_seed: Option<TeamRef>,
    pub lower_seed: Option<TeamRef>,
    pub higher_rank: u32,
    pub lower_rank: u32,
    pub legs: u8,
    pub tie_breaks: Vec<TieBreak>,
}

impl RepechageMatch {
    fn build(id: &str, higher: &TeamStanding, lower: &TeamStanding) -> Self {
        Self {
            id: id.to_string(),
            label: format!("{} vs {}", higher.rank, lower.rank),
            higher_seed: Some(higher.team.clone()),
            lower_seed: Some(lower.team.clone()),
            higher_rank: higher.rank,
            lower_rank: lower.rank,
            legs: 2,
            tie_breaks: KNOCKOUT_TIE_BREAKS.to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct RepechagePlan {
    pub candidates: Vec<TeamStanding>,
    pub matches: Vec<RepechageMatch>,
    pub auto_qualified: Vec<TeamStanding>,  // Go straight to the knockout without playing.
    pub notes: Vec<String>,
}

impl RepechagePlan {
    // Build the bracket for ranked candidates, best first.
    pub fn build(candidates: Vec<TeamStanding>) -> Self {
        let mut plan = Self {
            candidates: candidates.clone(),

            ..Default::default()
        };

        match candidates.as_slice() {
            [] => (),
            [only] => {
                plan.auto_qualified.push(only.clone());
                plan.notes.push(format!(
                    "{} ({}) is the only repechage team and qualifies automatically.",
                    only.team.name, only.rank.to_ordinal_string()
                ));
            },
            [first, second] => {
                plan.auto_qualified = vec![first.clone(), second.clone()];
                plan.notes.push(format!(
                    "Both repechage teams ({} and {}) qualify automatically, no repechage match is needed.",
                    first.team.name, second.team.name
                ));
            },
            [best, second, third] => {
                plan.auto_qualified.push(best.clone());
                plan.matches.push(RepechageMatch::build("REP1", second, third));
                plan.notes.push(format!(
                    "{} ({}) qualifies automatically as the best-ranked repechage team.",
                    best.team.name, best.rank.to_ordinal_string()
                ));
            },
            [a, b, c, d, ..] => {
                plan.matches.push(RepechageMatch::build("REP1", a, d));
                plan.matches.push(RepechageMatch::build("REP2", b, c));
            },
        }

        for note in plan.notes.iter() {
            info!("{note}");
        }

        return plan;
    }

    pub fn get_match(&self, id: &str) -> Option<&RepechageMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    // Turn the ties into two schedulable rounds.
    // The lower seed hosts the first leg and the higher seed the return leg.
    pub fn leg_rounds(&self, locale: Locale) -> Vec<Round> {
        let mut first_leg = Vec::new();
        let mut second_leg = Vec::new();

        for tie in self.matches.iter() {
            let (higher, lower) = match (&tie.higher_seed, &tie.lower_seed) {
                (Some(h), Some(l)) => (h, l),
                _ => continue,
            };

            first_leg.push(Pairing::build(&lower.id, &higher.id, 1));
            second_leg.push(Pairing::build(&higher.id, &lower.id, 2));
        }

        if first_leg.is_empty() { return Vec::new(); }

        return vec![
            Round::build(1, first_leg).with_label(&locale.repechage_leg_label(1)),
            Round::build(2, second_leg).with_label(&locale.repechage_leg_label(2)),
        ];
    }
}
