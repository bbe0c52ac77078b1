use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PredictorError;

pub type MatchId = u32;
pub type UserId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub home: String,
    pub away: String,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

impl Match {
    pub fn new(id: MatchId, home: &str, away: &str, stage: &str) -> Self {
        Self {
            id,
            date: None,
            home: home.to_string(),
            away: away.to_string(),
            stage: stage.to_string(),
            score: None,
        }
    }

    pub fn with_score(mut self, home: u32, away: u32) -> Self {
        self.score = Some(Score::new(home, away));
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.score.map(Outcome::from_score)
    }
}

/// Home/draw/away classification of a final score. Also the value users predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn from_score(score: Score) -> Self {
        if score.home > score.away {
            Outcome::Home
        } else if score.home < score.away {
            Outcome::Away
        } else {
            Outcome::Draw
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = PredictorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Outcome::Home),
            "draw" => Ok(Outcome::Draw),
            "away" => Ok(Outcome::Away),
            _ => Err(PredictorError::InvalidOutcome(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub name: String,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    // Wire name is "loses".
    #[serde(rename = "loses", alias = "losses")]
    pub losses: u32,
    pub goals_scored: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub points: u32,
}

impl TeamStanding {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub teams: Vec<TeamStanding>,
}

impl Group {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            teams: Vec::new(),
        }
    }

    pub fn team(&self, name: &str) -> Option<&TeamStanding> {
        self.teams.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPrediction {
    pub user_id: UserId,
    pub match_id: MatchId,
    pub prediction: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedMatch {
    #[serde(flatten)]
    pub fixture: Match,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAction {
    pub name: String,
    pub method: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMatches {
    pub id: UserId,
    pub matches: Vec<PredictedMatch>,
    pub actions: Vec<UserAction>,
}
