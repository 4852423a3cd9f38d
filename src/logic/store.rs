// The persisted match store the scheduler reads through and writes to.
use std::{collections::HashSet, sync::Mutex};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::logic::{competition::schedule_generator::MatchCandidate, error::StoreError, time::{iso_date_format, TimeOfDay}};

// A (date, time of day) pair already taken by a persisted match.
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct OccupiedSlot {
    #[serde(with = "iso_date_format")]
    pub date: Date,
    pub time_slot: TimeOfDay,
}

#[allow(async_fn_in_trait)]
pub trait MatchStore {
    // Get the slots taken by the tournament's matches between two dates, inclusive.
    async fn occupied_slots(&self, tournament_id: &str, from: Date, to: Date) -> Result<Vec<OccupiedSlot>, StoreError>;

    // Persist a batch of matches. Either all of them are stored or none.
    // Return how many were stored.
    async fn insert_matches(&self, matches: &[MatchCandidate]) -> Result<u64, StoreError>;

    // Remove every match of the tournament. Return how many were removed.
    async fn clear_tournament(&self, tournament_id: &str) -> Result<u64, StoreError>;

    // Get the date of the tournament's last stored match, if it has any.
    async fn latest_match_date(&self, tournament_id: &str) -> Result<Option<Date>, StoreError>;
}

// A store that keeps the matches in memory. Handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    matches: Mutex<Vec<MatchCandidate>>,
}

impl MemoryStore {
    pub fn build() -> Self {
        Self::default()
    }

    // Get a copy of the tournament's stored matches.
    pub fn matches(&self, tournament_id: &str) -> Result<Vec<MatchCandidate>, StoreError> {
        let matches = self.lock()?;
        return Ok(matches.iter().filter(|m| m.tournament_id == tournament_id).cloned().collect());
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<MatchCandidate>>, StoreError> {
        self.matches.lock().map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl MatchStore for MemoryStore {
    async fn occupied_slots(&self, tournament_id: &str, from: Date, to: Date) -> Result<Vec<OccupiedSlot>, StoreError> {
        let matches = self.lock()?;
        let slots = matches.iter()
            .filter(|m| m.tournament_id == tournament_id && m.date >= from && m.date <= to)
            .map(|m| m.slot())
            .collect();

        return Ok(slots);
    }

    async fn insert_matches(&self, batch: &[MatchCandidate]) -> Result<u64, StoreError> {
        let mut matches = self.lock()?;

        // Check the whole batch before touching anything.
        let mut taken: HashSet<(String, OccupiedSlot)> = matches.iter()
            .map(|m| (m.tournament_id.clone(), m.slot()))
            .collect();

        for candidate in batch {
            if !taken.insert((candidate.tournament_id.clone(), candidate.slot())) {
                return Err(StoreError::Conflict(format!(
                    "{} {} is already taken in tournament {}",
                    candidate.date, candidate.time_slot, candidate.tournament_id
                )));
            }
        }

        matches.extend_from_slice(batch);
        return Ok(batch.len() as u64);
    }

    async fn clear_tournament(&self, tournament_id: &str) -> Result<u64, StoreError> {
        let mut matches = self.lock()?;
        let before = matches.len();
        matches.retain(|m| m.tournament_id != tournament_id);

        return Ok((before - matches.len()) as u64);
    }

    async fn latest_match_date(&self, tournament_id: &str) -> Result<Option<Date>, StoreError> {
        let matches = self.lock()?;
        return Ok(matches.iter().filter(|m| m.tournament_id == tournament_id).map(|m| m.date).max());
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::logic::competition::schedule_generator::MatchStatus;

    fn candidate(tournament_id: &str, date: Date, slot: &str) -> MatchCandidate {
        MatchCandidate {
            tournament_id: tournament_id.to_string(),
            home_id: "a".to_string(),
            away_id: "b".to_string(),
            round: 1,
            round_label: "Round 1".to_string(),
            date,
            time_slot: TimeOfDay::parse(slot).unwrap(),
            kickoff: datetime!(2024-01-01 22:00 UTC),
            venue: "To be confirmed".to_string(),
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    #[tokio::test]
    async fn occupied_slots_are_filtered_by_tournament_and_dates() {
        let store = MemoryStore::build();
        store.insert_matches(&[
            candidate("cup", date!(2024-01-01), "16:00"),
            candidate("cup", date!(2024-01-02), "16:00"),
            candidate("league", date!(2024-01-01), "18:00"),
        ]).await.unwrap();

        let slots = store.occupied_slots("cup", date!(2024-01-01), date!(2024-01-01)).await.unwrap();
        assert_eq!(slots, vec![OccupiedSlot { date: date!(2024-01-01), time_slot: TimeOfDay::parse("16:00").unwrap() }]);
    }

    #[tokio::test]
    async fn conflicting_batch_stores_nothing() {
        let store = MemoryStore::build();
        store.insert_matches(&[candidate("cup", date!(2024-01-01), "16:00")]).await.unwrap();

        let result = store.insert_matches(&[
            candidate("cup", date!(2024-01-01), "18:00"),
            candidate("cup", date!(2024-01-01), "16:00"),
        ]).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.matches("cup").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_slot_in_other_tournament_is_fine() {
        let store = MemoryStore::build();
        let stored = store.insert_matches(&[
            candidate("cup", date!(2024-01-01), "16:00"),
            candidate("league", date!(2024-01-01), "16:00"),
        ]).await.unwrap();
        assert_eq!(stored, 2);
    }

    #[tokio::test]
    async fn clearing_only_touches_one_tournament() {
        let store = MemoryStore::build();
        store.insert_matches(&[
            candidate("cup", date!(2024-01-01), "16:00"),
            candidate("cup", date!(2024-01-01), "18:00"),
            candidate("league", date!(2024-01-01), "16:00"),
        ]).await.unwrap();

        assert_eq!(store.latest_match_date("cup").await.unwrap(), Some(date!(2024-01-01)));
        assert_eq!(store.clear_tournament("cup").await.unwrap(), 2);
        assert!(store.matches("cup").unwrap().is_empty());
        assert_eq!(store.matches("league").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn latest_date_per_tournament() {
        let store = MemoryStore::build();
        assert_eq!(store.latest_match_date("cup").await.unwrap(), None);

        store.insert_matches(&[
            candidate("cup", date!(2024-03-05), "16:00"),
            candidate("cup", date!(2024-03-04), "16:00"),
            candidate("league", date!(2024-05-01), "16:00"),
        ]).await.unwrap();
        assert_eq!(store.latest_match_date("cup").await.unwrap(), Some(date!(2024-03-05)));
    }
}
