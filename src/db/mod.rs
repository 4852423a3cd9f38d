// The SQLite match store.
mod tournament_match;

use log::{debug, info};
use sqlx::{Sqlite, migrate::MigrateDatabase, sqlite::SqlitePoolOptions};
use time::Date;

use crate::logic::{
    competition::schedule_generator::MatchCandidate,
    error::StoreError,
    store::{MatchStore, OccupiedSlot},
    types::Db,
};

// Connect to the database at the URL and bring its schema up to date.
// "sqlite::memory:" gives a throwaway database.
pub async fn setup(url: &str) -> Result<Db, StoreError> {
    if !url.contains(":memory:") && !Sqlite::database_exists(url).await? {
        info!("Creating database {url}");
        Sqlite::create_database(url).await?;
    }

    // Every connection to an in-memory database is a database of its own.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let db = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url).await?;

    sqlx::migrate!("sql/migrations").run(&db).await?;

    return Ok(db);
}

#[derive(Debug, Clone)]
pub struct SqliteMatchStore {
    pub db: Db,
}

impl SqliteMatchStore {
    pub fn build(db: Db) -> Self {
        Self { db }
    }

    // Get the tournament's matches in calendar order.
    pub async fn matches(&self, tournament_id: &str) -> Result<Vec<MatchCandidate>, StoreError> {
        return MatchCandidate::fetch_tournament(&self.db, tournament_id).await;
    }
}

impl MatchStore for SqliteMatchStore {
    async fn occupied_slots(&self, tournament_id: &str, from: Date, to: Date) -> Result<Vec<OccupiedSlot>, StoreError> {
        return OccupiedSlot::fetch_range(&self.db, tournament_id, from, to).await;
    }

    async fn insert_matches(&self, matches: &[MatchCandidate]) -> Result<u64, StoreError> {
        let mut tx = self.db.begin().await?;

        let mut stored = 0;
        for candidate in matches {
            stored += candidate.save(&mut tx).await?;
        }

        // Dropping the transaction on an error above rolls everything back.
        tx.commit().await?;
        debug!("Stored {stored} matches");

        return Ok(stored);
    }

    async fn clear_tournament(&self, tournament_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM TournamentMatch
            WHERE tournament_id = $1"
        ).bind(tournament_id)
        .execute(&self.db).await?;

        return Ok(result.rows_affected());
    }

    async fn latest_match_date(&self, tournament_id: &str) -> Result<Option<Date>, StoreError> {
        return MatchCandidate::fetch_latest_date(&self.db, tournament_id).await;
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::logic::{competition::schedule_generator::MatchStatus, time::TimeOfDay};

    fn candidate(tournament_id: &str, date: Date, slot: &str) -> MatchCandidate {
        MatchCandidate {
            tournament_id: tournament_id.to_string(),
            home_id: "home".to_string(),
            away_id: "away".to_string(),
            round: 2,
            round_label: "Round 2".to_string(),
            date,
            time_slot: TimeOfDay::parse(slot).unwrap(),
            kickoff: datetime!(2024-01-02 00:00 UTC),
            venue: "To be confirmed".to_string(),
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    async fn store() -> SqliteMatchStore {
        SqliteMatchStore::build(setup("sqlite::memory:").await.unwrap())
    }

    #[tokio::test]
    async fn matches_survive_a_round_trip() {
        let store = store().await;
        let original = candidate("cup", date!(2024-01-01), "18:00");

        assert_eq!(store.insert_matches(&[original.clone()]).await.unwrap(), 1);
        assert_eq!(store.matches("cup").await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn occupied_slots_in_range() {
        let store = store().await;
        store.insert_matches(&[
            candidate("cup", date!(2024-01-01), "16:00"),
            candidate("cup", date!(2024-01-02), "20:00"),
            candidate("cup", date!(2024-01-08), "16:00"),
            candidate("league", date!(2024-01-02), "16:00"),
        ]).await.unwrap();

        let slots = store.occupied_slots("cup", date!(2024-01-02), date!(2024-01-07)).await.unwrap();
        assert_eq!(slots, vec![OccupiedSlot { date: date!(2024-01-02), time_slot: TimeOfDay::parse("20:00").unwrap() }]);
    }

    #[tokio::test]
    async fn conflicting_batch_is_rolled_back() {
        let store = store().await;
        store.insert_matches(&[candidate("cup", date!(2024-01-01), "16:00")]).await.unwrap();

        let result = store.insert_matches(&[
            candidate("cup", date!(2024-01-01), "18:00"),
            candidate("cup", date!(2024-01-01), "16:00"),
        ]).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.matches("cup").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clearing_a_tournament() {
        let store = store().await;
        store.insert_matches(&[
            candidate("cup", date!(2024-01-01), "16:00"),
            candidate("league", date!(2024-01-01), "16:00"),
        ]).await.unwrap();

        assert_eq!(store.latest_match_date("cup").await.unwrap(), Some(date!(2024-01-01)));
        assert_eq!(store.clear_tournament("cup").await.unwrap(), 1);
        assert_eq!(store.latest_match_date("cup").await.unwrap(), None);
        assert!(store.matches("cup").await.unwrap().is_empty());
        assert_eq!(store.matches("league").await.unwrap().len(), 1);
    }
}
