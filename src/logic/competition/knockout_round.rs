// Seeds and the match tree of the eight-team knockout stage.
use ordinal::ToOrdinal as _;
use serde::{Deserialize, Serialize};

use crate::logic::{
    competition::{ranking::TeamStanding, repechage::RepechagePlan},
    error::{EngineError, EngineResult},
    team::TeamRef,
    types::{convert, MatchId, SeedPosition},
};

// Number of teams in the knockout stage.
pub const KNOCKOUT_SIZE: usize = 8;

// How a tie level on aggregate is settled, in order.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    ExtraTime,
    Penalties,
}

pub const KNOCKOUT_TIE_BREAKS: [TieBreak; 2] = [TieBreak::ExtraTime, TieBreak::Penalties];

// A seed that can only be filled once repechage results exist.
// Kept as data. Resolving it is up to the host.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SeedRule {
    WinnerOf {
        match_id: MatchId,
    },
    // Depends on whether the better-ranked team of `tie` goes through.
    IfHigherSeedWins {
        tie: MatchId,
        then: Box<SeedRule>,
        otherwise: Box<SeedRule>,
    },
}

impl SeedRule {
    fn winner_of(match_id: &str) -> Self {
        SeedRule::WinnerOf { match_id: match_id.to_string() }
    }

    // Get the repechage matches this rule waits for, without duplicates.
    pub fn referenced_matches(&self) -> Vec<MatchId> {
        let mut ids = Vec::new();
        self.collect_matches(&mut ids);
        return ids;
    }

    fn collect_matches(&self, ids: &mut Vec<MatchId>) {
        match self {
            SeedRule::WinnerOf { match_id } => {
                if !ids.contains(match_id) { ids.push(match_id.clone()); }
            },
            SeedRule::IfHigherSeedWins { tie, then, otherwise } => {
                if !ids.contains(tie) { ids.push(tie.clone()); }
                then.collect_matches(ids);
                otherwise.collect_matches(ids);
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedSource {
    Team {
        team: TeamRef,
    },
    Conditional {
        placeholder: String,
        rule: SeedRule,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
pub struct Seed {
    pub position: SeedPosition,
    pub source: SeedSource,
}

impl Seed {
    fn team(position: SeedPosition, team: &TeamRef) -> Self {
        Self {
            position,
            source: SeedSource::Team { team: team.clone() },
        }
    }

    fn conditional(position: SeedPosition, placeholder: String, rule: SeedRule) -> Self {
        Self {
            position,
            source: SeedSource::Conditional { placeholder, rule },
        }
    }
}

// Fill the eight seeds from the direct qualifiers and the repechage outcome.
pub fn build_seeds(direct: &[TeamStanding], repechage: &RepechagePlan) -> EngineResult<Vec<Seed>> {
    let mut seeds = Vec::new();
    for (i, standing) in direct.iter().enumerate() {
        seeds.push(Seed::team(convert::int(i + 1)?, &standing.team));
    }

    let next: SeedPosition = convert::int(seeds.len() + 1)?;
    let auto = &repechage.auto_qualified;

    match (auto.len(), repechage.matches.as_slice()) {
        (2.., _) => {
            seeds.push(Seed::team(next, &auto[0].team));
            seeds.push(Seed::team(next + 1, &auto[1].team));
        },
        (1, [tie]) => {
            seeds.push(Seed::team(next, &auto[0].team));
            seeds.push(Seed::conditional(
                next + 1,
                format!("Winner of {}", tie.label),
                SeedRule::winner_of(&tie.id),
            ));
        },
        (0, [outer, inner]) => {
            // The lower seed of the outer tie always takes the last slot if it goes through,
            // which leaves the earlier slot to the winner of the inner tie.
            seeds.push(Seed::conditional(
                next,
                format!(
                    "{} if it wins {}, otherwise winner of {}",
                    seed_name(outer.higher_rank), outer.label, inner.label
                ),
                SeedRule::IfHigherSeedWins {
                    tie: outer.id.clone(),
                    then: Box::new(SeedRule::winner_of(&outer.id)),
                    otherwise: Box::new(SeedRule::winner_of(&inner.id)),
                },
            ));
            seeds.push(Seed::conditional(
                next + 1,
                format!(
                    "Winner of {} if the {} wins {}, otherwise {}",
                    inner.label, seed_name(outer.higher_rank), outer.label, seed_name(outer.lower_rank)
                ),
                SeedRule::IfHigherSeedWins {
                    tie: outer.id.clone(),
                    then: Box::new(SeedRule::winner_of(&inner.id)),
                    otherwise: Box::new(SeedRule::winner_of(&outer.id)),
                },
            ));
        },
        _ => (),
    }

    if seeds.len() != KNOCKOUT_SIZE {
        return Err(EngineError::Validation(format!(
            "{} seeds could be filled, the knockout stage needs {KNOCKOUT_SIZE}", seeds.len()
        )));
    }

    return Ok(seeds);
}

fn seed_name(rank: u32) -> String {
    format!("{}-ranked team", rank.to_ordinal_string())
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KnockoutStage {
    Quarterfinal,
    Semifinal,
    ThirdPlace,
    Final,
}

// Who takes one side of a knockout match.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    Seed {
        position: SeedPosition,
        team: TeamRef,
    },
    ConditionalSeed {
        position: SeedPosition,
        placeholder: String,
        rule: SeedRule,
    },
    WinnerOf {
        match_id: MatchId,
    },
    LoserOf {
        match_id: MatchId,
    },
}

impl Participant {
    fn from_seed(seed: &Seed) -> Self {
        match &seed.source {
            SeedSource::Team { team } => Participant::Seed {
                position: seed.position,
                team: team.clone(),
            },
            SeedSource::Conditional { placeholder, rule } => Participant::ConditionalSeed {
                position: seed.position,
                placeholder: placeholder.clone(),
                rule: rule.clone(),
            },
        }
    }

    fn winner_of(match_id: &str) -> Self {
        Participant::WinnerOf { match_id: match_id.to_string() }
    }

    fn loser_of(match_id: &str) -> Self {
        Participant::LoserOf { match_id: match_id.to_string() }
    }

    // Get the match this participant comes from, if any.
    pub fn source_match(&self) -> Option<&str> {
        match self {
            Participant::WinnerOf { match_id } | Participant::LoserOf { match_id } => Some(match_id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
pub struct KnockoutMatch {
    pub id: MatchId,
    pub label: String,
    pub stage: KnockoutStage,
    pub legs: u8,
    pub tie_breaks: Vec<TieBreak>,
    pub home: Participant,
    pub away: Participant,
}

impl KnockoutMatch {
    fn build(id: &str, label: &str, stage: KnockoutStage, legs: u8, home: Participant, away: Participant) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            stage,
            legs,
            tie_breaks: KNOCKOUT_TIE_BREAKS.to_vec(),
            home,
            away,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct KnockoutTree {
    pub matches: Vec<KnockoutMatch>,
}

// Quarterfinal pairings by seed position.
const QUARTERFINALS: [(SeedPosition, SeedPosition); 4] = [(1, 8), (2, 7), (3, 6), (4, 5)];

impl KnockoutTree {
    // Build the tree from the eight seeds.
    pub fn build(seeds: &[Seed]) -> EngineResult<Self> {
        let mut matches = Vec::new();

        for (i, (home, away)) in QUARTERFINALS.iter().enumerate() {
            let id = format!("QF{}", i + 1);
            matches.push(KnockoutMatch::build(
                &id,
                &format!("Quarterfinal {} ({home} vs {away})", i + 1),
                KnockoutStage::Quarterfinal,
                2,
                Participant::from_seed(find_seed(seeds, *home)?),
                Participant::from_seed(find_seed(seeds, *away)?),
            ));
        }

        // The top half meets the bottom half so that seeds 1 and 2 can only meet in the final.
        matches.push(KnockoutMatch::build("SF1", "Semifinal 1", KnockoutStage::Semifinal, 2,
            Participant::winner_of("QF1"), Participant::winner_of("QF4")));
        matches.push(KnockoutMatch::build("SF2", "Semifinal 2", KnockoutStage::Semifinal, 2,
            Participant::winner_of("QF2"), Participant::winner_of("QF3")));

        matches.push(KnockoutMatch::build("THIRD", "Third place", KnockoutStage::ThirdPlace, 1,
            Participant::loser_of("SF1"), Participant::loser_of("SF2")));
        matches.push(KnockoutMatch::build("FINAL", "Final", KnockoutStage::Final, 1,
            Participant::winner_of("SF1"), Participant::winner_of("SF2")));

        return Ok(Self { matches });
    }

    pub fn get_match(&self, id: &str) -> Option<&KnockoutMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn matches_in_stage(&self, stage: KnockoutStage) -> Vec<&KnockoutMatch> {
        self.matches.iter().filter(|m| m.stage == stage).collect()
    }
}

fn find_seed(seeds: &[Seed], position: SeedPosition) -> EngineResult<&Seed> {
    match seeds.iter().find(|s| s.position == position) {
        Some(seed) => Ok(seed),
        None => Err(EngineError::Validation(format!("seed {position} is missing")))
    }
}
