// Round-robin pairings generated with the circle method.
use serde::{Deserialize, Serialize};

use crate::logic::{team::TeamRef, types::{RoundNumber, TeamId}};

// A single head-to-head fixture.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq, Eq)]
pub struct Pairing {
    pub home: TeamId,
    pub away: TeamId,
    pub round: RoundNumber,
}

impl Pairing {
    pub fn build(home: &str, away: &str, round: RoundNumber) -> Self {
        Self {
            home: home.to_string(),
            away: away.to_string(),
            round,
        }
    }

    // Check if the team plays in this pairing.
    pub fn involves(&self, team_id: &str) -> bool {
        self.home == team_id || self.away == team_id
    }
}

impl std::fmt::Display for Pairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs {} (round {})", self.home, self.away, self.round)
    }
}

// All pairings played in one round.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct Round {
    pub number: RoundNumber,
    pub pairings: Vec<Pairing>,

    // Replaces the default "Round {n}" label when set.
    #[serde(default)]
    pub label: Option<String>,
}

impl Round {
    pub fn build(number: RoundNumber, pairings: Vec<Pairing>) -> Self {
        Self {
            number,
            pairings,

            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

// Generate a single round-robin where every team meets every other team once.
// Fewer than two teams give an empty result. Duplicate IDs are not checked here.
pub fn generate_rounds(teams: &[TeamRef]) -> Vec<Round> {
    if teams.len() < 2 { return Vec::new(); }

    // None stands for the bye. Whoever draws it sits the round out.
    let mut positions: Vec<Option<&TeamRef>> = teams.iter().map(Some).collect();
    if positions.len() % 2 != 0 {
        positions.push(None);
    }

    let slots = positions.len();
    let mut rounds = Vec::with_capacity(slots - 1);

    for round_index in 0..slots - 1 {
        let number = (round_index + 1) as RoundNumber;
        let mut pairings = Vec::with_capacity(slots / 2);

        for i in 0..slots / 2 {
            let (first, second) = match (positions[i], positions[slots - 1 - i]) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };

            // Alternating who hosts keeps home games balanced over the rounds.
            let pairing = match round_index % 2 {
                0 => Pairing::build(&first.id, &second.id, number),
                _ => Pairing::build(&second.id, &first.id, number),
            };
            pairings.push(pairing);
        }

        rounds.push(Round::build(number, pairings));

        // The first team stays put, the last one moves to the second position.
        positions[1..].rotate_right(1);
    }

    return rounds;
}

// Get how many pairings a round-robin of this many teams has.
pub fn total_pairings(no_of_teams: usize) -> usize {
    no_of_teams * no_of_teams.saturating_sub(1) / 2
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    fn teams(n: usize) -> Vec<TeamRef> {
        (1..=n).map(|i| TeamRef::build(&format!("t{i}"), &format!("Team {i}"))).collect()
    }

    // Every unordered pair once, nobody twice in a round, nobody against themselves.
    fn assert_complete(rounds: &[Round], n: usize) {
        let mut seen = HashSet::new();
        for round in rounds {
            let mut playing = HashSet::new();
            for pairing in round.pairings.iter() {
                assert_ne!(pairing.home, pairing.away);
                assert!(playing.insert(pairing.home.clone()), "{} twice in round {}", pairing.home, round.number);
                assert!(playing.insert(pairing.away.clone()), "{} twice in round {}", pairing.away, round.number);
                assert_eq!(pairing.round, round.number);

                let key = if pairing.home < pairing.away {
                    (pairing.home.clone(), pairing.away.clone())
                } else {
                    (pairing.away.clone(), pairing.home.clone())
                };
                assert!(seen.insert(key), "{pairing} repeated");
            }
        }

        assert_eq!(seen.len(), total_pairings(n));
    }

    #[test]
    fn too_few_teams_give_nothing() {
        assert!(generate_rounds(&[]).is_empty());
        assert!(generate_rounds(&teams(1)).is_empty());
    }

    #[test]
    fn two_teams_play_once() {
        let rounds = generate_rounds(&teams(2));
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].pairings, vec![Pairing::build("t1", "t2", 1)]);
    }

    #[test]
    fn even_team_counts() {
        for n in [4, 6, 8, 10, 14] {
            let rounds = generate_rounds(&teams(n));
            assert_eq!(rounds.len(), n - 1);
            assert!(rounds.iter().all(|r| r.pairings.len() == n / 2));
            assert_complete(&rounds, n);
        }
    }

    #[test]
    fn odd_team_counts_have_one_idle_team_per_round() {
        for n in [3, 5, 7, 9, 13] {
            let rounds = generate_rounds(&teams(n));
            assert_eq!(rounds.len(), n);
            assert!(rounds.iter().all(|r| r.pairings.len() == (n - 1) / 2));
            assert_complete(&rounds, n);

            // Each team sits out exactly once.
            let mut idle: HashMap<String, usize> = HashMap::new();
            for round in rounds.iter() {
                for team in teams(n) {
                    if !round.pairings.iter().any(|p| p.involves(&team.id)) {
                        *idle.entry(team.id).or_default() += 1;
                    }
                }
            }
            assert_eq!(idle.len(), n);
            assert!(idle.values().all(|count| *count == 1));
        }
    }

    #[test]
    fn first_round_pairs_opposite_positions() {
        let rounds = generate_rounds(&teams(4));
        assert_eq!(rounds[0].pairings, vec![
            Pairing::build("t1", "t4", 1),
            Pairing::build("t2", "t3", 1),
        ]);

        // After rotation t4 sits next to the fixed team, and hosting flips.
        assert_eq!(rounds[1].pairings, vec![
            Pairing::build("t3", "t1", 2),
            Pairing::build("t2", "t4", 2),
        ]);
    }

    #[test]
    fn home_games_stay_balanced() {
        let n = 8;
        let rounds = generate_rounds(&teams(n));
        let mut homes: HashMap<String, usize> = HashMap::new();
        for pairing in rounds.iter().flat_map(|r| r.pairings.iter()) {
            *homes.entry(pairing.home.clone()).or_default() += 1;
        }

        // 7 matches each; nobody should be stuck with all of them at home or away.
        for team in teams(n) {
            let count = homes.get(&team.id).copied().unwrap_or(0);
            assert!((2..=5).contains(&count), "{} has {count} home games", team.id);
        }
    }
}
