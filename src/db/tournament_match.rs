use futures::TryStreamExt as _;
use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow};
use time::Date;

use crate::logic::{
    competition::schedule_generator::MatchCandidate,
    error::StoreError,
    store::OccupiedSlot,
    time::TimeOfDay,
    types::Db,
};

// Time slots are stored as "HH:MM" text.
fn time_slot_from_row(row: &SqliteRow) -> sqlx::Result<TimeOfDay> {
    let text: String = row.try_get("time_slot")?;
    TimeOfDay::parse(&text).map_err(|e| sqlx::Error::Decode(e.to_string().into()))
}

impl FromRow<'_, SqliteRow> for MatchCandidate {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            tournament_id: row.try_get("tournament_id")?,
            home_id: row.try_get("home_id")?,
            away_id: row.try_get("away_id")?,
            round: row.try_get("round")?,
            round_label: row.try_get("round_label")?,
            date: row.try_get("match_date")?,
            time_slot: time_slot_from_row(row)?,
            kickoff: row.try_get("kickoff")?,
            venue: row.try_get("venue")?,
            status: row.try_get("status")?,
            home_score: row.try_get("home_score")?,
            away_score: row.try_get("away_score")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for OccupiedSlot {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            date: row.try_get("match_date")?,
            time_slot: time_slot_from_row(row)?,
        })
    }
}

impl MatchCandidate {
    pub async fn fetch_tournament(db: &Db, tournament_id: &str) -> Result<Vec<Self>, StoreError> {
        let matches = sqlx::query_as(
            "SELECT * FROM TournamentMatch
            WHERE tournament_id = $1
            ORDER BY match_date, time_slot"
        ).bind(tournament_id)
        .fetch(db)
        .try_collect().await?;

        return Ok(matches);
    }

    pub async fn fetch_latest_date(db: &Db, tournament_id: &str) -> Result<Option<Date>, StoreError> {
        let date = sqlx::query_scalar(
            "SELECT match_date FROM TournamentMatch
            WHERE tournament_id = $1
            ORDER BY match_date DESC
            LIMIT 1"
        ).bind(tournament_id)
        .fetch_optional(db).await?;

        return Ok(date);
    }

    // Insert the match inside the given transaction.
    pub async fn save(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO TournamentMatch
            (tournament_id, home_id, away_id, round, round_label, match_date, time_slot, kickoff, venue, status, home_score, away_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ).bind(&self.tournament_id)
        .bind(&self.home_id)
        .bind(&self.away_id)
        .bind(self.round)
        .bind(&self.round_label)
        .bind(self.date)
        .bind(self.time_slot.to_string())
        .bind(self.kickoff)
        .bind(&self.venue)
        .bind(self.status)
        .bind(self.home_score)
        .bind(self.away_score)
        .execute(&mut **tx).await;

        match result {
            Ok(r) => Ok(r.rows_affected()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::Conflict(format!(
                "{} {} is already taken in tournament {}", self.date, self.time_slot, self.tournament_id
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

impl OccupiedSlot {
    // Get the slots taken between two dates, inclusive.
    pub async fn fetch_range(db: &Db, tournament_id: &str, from: Date, to: Date) -> Result<Vec<Self>, StoreError> {
        let slots = sqlx::query_as::<_, Self>(
            "SELECT match_date, time_slot FROM TournamentMatch
            WHERE tournament_id = $1 AND match_date BETWEEN $2 AND $3
            ORDER BY match_date, time_slot"
        ).bind(tournament_id)
        .bind(from)
        .bind(to)
        .fetch(db)
        .try_collect().await?;

        return Ok(slots);
    }
}
