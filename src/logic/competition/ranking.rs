// Functions and methods for ranking teams in a league table.
use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::logic::team::TeamRef;

// A team's line in the final league table.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct TeamStanding {
    pub team: TeamRef,
    pub points: u16,
    pub wins: u16,
    pub draws: u16,
    pub losses: u16,
    pub goals_for: u16,
    pub goals_against: u16,

    // Derived when ranking, anything given in the input is overwritten.
    #[serde(default)]
    pub goal_difference: i32,
    #[serde(default)]
    pub rank: u32,
}

impl TeamStanding {
    pub fn build(team: TeamRef, points: u16, wins: u16, draws: u16, losses: u16, goals_for: u16, goals_against: u16) -> Self {
        Self {
            team,
            points,
            wins,
            draws,
            losses,
            goals_for,
            goals_against,
            goal_difference: goals_for as i32 - goals_against as i32,

            ..Default::default()
        }
    }
}

// What the table is sorted by, in priority order.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Eq, Hash, PartialEq)]
#[derive(Clone, Copy)]
pub enum RankCriteria {
    Points,
    GoalDifference,
    GoalsFor,
    Wins,
    Name,   // Alphabetical, so that the order is always deterministic.
}

pub const LEAGUE_CRITERIA: [RankCriteria; 5] = [
    RankCriteria::Points,
    RankCriteria::GoalDifference,
    RankCriteria::GoalsFor,
    RankCriteria::Wins,
    RankCriteria::Name,
];

type CmpFunc = fn (&TeamStanding, &TeamStanding) -> Ordering;

// Compare functions here. Better teams come first.

fn compare_points(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.points.cmp(&a.points)
}

fn compare_goal_difference(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.goal_difference.cmp(&a.goal_difference)
}

fn compare_goals_for(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.goals_for.cmp(&a.goals_for)
}

fn compare_wins(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.wins.cmp(&a.wins)
}

fn compare_name(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    a.team.name.cmp(&b.team.name)
}

// Get the available sort functions.
pub fn get_sort_functions() -> HashMap<RankCriteria, CmpFunc> {
    let mut functions: HashMap<RankCriteria, CmpFunc> = HashMap::new();
    functions.insert(RankCriteria::Points, compare_points);
    functions.insert(RankCriteria::GoalDifference, compare_goal_difference);
    functions.insert(RankCriteria::GoalsFor, compare_goals_for);
    functions.insert(RankCriteria::Wins, compare_wins);
    functions.insert(RankCriteria::Name, compare_name);
    return functions;
}

// Sort the standings with the given criteria and number them from 1.
pub fn rank_standings(mut standings: Vec<TeamStanding>, criteria: &[RankCriteria]) -> Vec<TeamStanding> {
    let sort_functions = get_sort_functions();

    for standing in standings.iter_mut() {
        standing.goal_difference = standing.goals_for as i32 - standing.goals_against as i32;
    }

    standings.sort_by(|a, b| {
        let mut order = Ordering::Equal;
        for criterium in criteria.iter() {
            order = sort_functions[criterium](a, b);

            if order.is_ne() { break; }
        }

        // Identical names are left to the ID.
        order.then_with(|| a.team.id.cmp(&b.team.id))
    });

    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = (i + 1) as u32;
    }

    return standings;
}
