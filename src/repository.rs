use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::error::Result;
use crate::model::{Match, MatchId, MatchPrediction, Outcome, Score, UserId};

pub trait MatchRepository {
    fn all_matches(&self) -> Result<Vec<Match>>;

    fn matches_for_stage(&self, stage: &str) -> Result<Vec<Match>> {
        Ok(self
            .all_matches()?
            .into_iter()
            .filter(|m| m.stage == stage)
            .collect())
    }

    fn find_match(&self, id: MatchId) -> Result<Option<Match>> {
        Ok(self.all_matches()?.into_iter().find(|m| m.id == id))
    }

    fn upsert_match(&mut self, m: &Match) -> Result<()>;
}

pub trait PredictionRepository {
    fn all_predictions(&self) -> Result<Vec<MatchPrediction>>;

    fn predictions_for_user(&self, user_id: UserId) -> Result<Vec<MatchPrediction>> {
        Ok(self
            .all_predictions()?
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect())
    }

    /// Replaces any earlier prediction by the same user for the same match.
    fn upsert_prediction(&mut self, prediction: &MatchPrediction) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    matches: Vec<Match>,
    predictions: Vec<MatchPrediction>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches(matches: Vec<Match>) -> Self {
        Self {
            matches,
            predictions: Vec::new(),
        }
    }

    pub fn set_predictions(&mut self, predictions: Vec<MatchPrediction>) {
        self.predictions = predictions;
    }
}

impl MatchRepository for InMemoryRepository {
    fn all_matches(&self) -> Result<Vec<Match>> {
        Ok(self.matches.clone())
    }

    fn upsert_match(&mut self, m: &Match) -> Result<()> {
        match self.matches.iter_mut().find(|existing| existing.id == m.id) {
            Some(existing) => *existing = m.clone(),
            None => self.matches.push(m.clone()),
        }
        Ok(())
    }
}

impl PredictionRepository for InMemoryRepository {
    fn all_predictions(&self) -> Result<Vec<MatchPrediction>> {
        Ok(self.predictions.clone())
    }

    fn upsert_prediction(&mut self, prediction: &MatchPrediction) -> Result<()> {
        match self
            .predictions
            .iter_mut()
            .find(|p| p.user_id == prediction.user_id && p.match_id == prediction.match_id)
        {
            Some(existing) => existing.prediction = prediction.prediction,
            None => self.predictions.push(prediction.clone()),
        }
        Ok(())
    }
}

pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened sqlite db");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Upserts every match inside one transaction.
    pub fn upsert_matches(&mut self, matches: &[Match]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for m in matches {
            upsert_match_row(&tx, m)?;
        }
        tx.commit()?;
        Ok(matches.len())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            utc_time TEXT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            stage TEXT NOT NULL,
            home_goals INTEGER NULL,
            away_goals INTEGER NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_stage ON matches(stage);

        CREATE TABLE IF NOT EXISTS match_predictions (
            user_id INTEGER NOT NULL,
            match_id INTEGER NOT NULL,
            prediction TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, match_id)
        );
        "#,
    )?;
    Ok(())
}

fn upsert_match_row(conn: &Connection, m: &Match) -> Result<()> {
    conn.execute(
        "INSERT INTO matches(id, utc_time, home_team, away_team, stage, home_goals, away_goals)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            utc_time = excluded.utc_time,
            home_team = excluded.home_team,
            away_team = excluded.away_team,
            stage = excluded.stage,
            home_goals = excluded.home_goals,
            away_goals = excluded.away_goals",
        params![
            m.id,
            m.date.map(|d| d.to_rfc3339()),
            m.home,
            m.away,
            m.stage,
            m.score.map(|s| s.home),
            m.score.map(|s| s.away),
        ],
    )?;
    Ok(())
}

fn match_from_row(row: &Row<'_>) -> rusqlite::Result<Match> {
    let date = row
        .get::<_, Option<String>>(1)?
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|err| {
                    rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(err))
                })
        })
        .transpose()?;
    let home_goals: Option<u32> = row.get(5)?;
    let away_goals: Option<u32> = row.get(6)?;
    let score = match (home_goals, away_goals) {
        (Some(home), Some(away)) => Some(Score::new(home, away)),
        _ => None,
    };
    Ok(Match {
        id: row.get(0)?,
        date,
        home: row.get(2)?,
        away: row.get(3)?,
        stage: row.get(4)?,
        score,
    })
}

fn prediction_from_row(row: &Row<'_>) -> rusqlite::Result<MatchPrediction> {
    let raw: String = row.get(2)?;
    let prediction = raw
        .parse::<Outcome>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err)))?;
    Ok(MatchPrediction {
        user_id: row.get(0)?,
        match_id: row.get(1)?,
        prediction,
    })
}

impl MatchRepository for SqliteRepository {
    fn all_matches(&self) -> Result<Vec<Match>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, utc_time, home_team, away_team, stage, home_goals, away_goals
             FROM matches ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], match_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn matches_for_stage(&self, stage: &str) -> Result<Vec<Match>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, utc_time, home_team, away_team, stage, home_goals, away_goals
             FROM matches WHERE stage = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![stage], match_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn find_match(&self, id: MatchId) -> Result<Option<Match>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, utc_time, home_team, away_team, stage, home_goals, away_goals
                 FROM matches WHERE id = ?1",
                params![id],
                match_from_row,
            )
            .optional()?;
        Ok(found)
    }

    fn upsert_match(&mut self, m: &Match) -> Result<()> {
        upsert_match_row(&self.conn, m)
    }
}

impl PredictionRepository for SqliteRepository {
    fn all_predictions(&self) -> Result<Vec<MatchPrediction>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, match_id, prediction FROM match_predictions
             ORDER BY user_id ASC, match_id ASC",
        )?;
        let rows = stmt.query_map([], prediction_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn predictions_for_user(&self, user_id: UserId) -> Result<Vec<MatchPrediction>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, match_id, prediction FROM match_predictions
             WHERE user_id = ?1 ORDER BY match_id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], prediction_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn upsert_prediction(&mut self, prediction: &MatchPrediction) -> Result<()> {
        self.conn.execute(
            "INSERT INTO match_predictions(user_id, match_id, prediction, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, match_id) DO UPDATE SET
                prediction = excluded.prediction,
                updated_at = excluded.updated_at",
            params![
                prediction.user_id,
                prediction.match_id,
                prediction.prediction.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
