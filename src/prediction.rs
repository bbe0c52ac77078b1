use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{PredictorError, Result};
use crate::model::{
    Match, MatchId, MatchPrediction, Outcome, PredictedMatch, UserAction, UserId, UserMatches,
};
use crate::repository::{MatchRepository, PredictionRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionResult {
    /// No final score yet, or the user never predicted this match.
    Pending,
    Guessed,
    Missed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictionTally {
    pub guessed: usize,
    pub missed: usize,
    pub pending: usize,
}

/// Annotates `matches` with the predictions stored for `user_id`. Other users' rows are ignored.
pub fn project_user_matches(
    user_id: UserId,
    matches: &[Match],
    predictions: &[MatchPrediction],
) -> UserMatches {
    let by_match: HashMap<MatchId, Outcome> = predictions
        .iter()
        .filter(|p| p.user_id == user_id)
        .map(|p| (p.match_id, p.prediction))
        .collect();

    let matches = matches
        .iter()
        .map(|m| PredictedMatch {
            fixture: m.clone(),
            prediction: by_match.get(&m.id).copied(),
        })
        .collect();

    UserMatches {
        id: user_id,
        matches,
        actions: vec![predict_action(user_id)],
    }
}

pub fn prediction_result(m: &PredictedMatch) -> PredictionResult {
    let (Some(outcome), Some(prediction)) = (m.fixture.outcome(), m.prediction) else {
        return PredictionResult::Pending;
    };
    if outcome == prediction {
        PredictionResult::Guessed
    } else {
        PredictionResult::Missed
    }
}

pub fn prediction_tally(matches: &[PredictedMatch]) -> PredictionTally {
    let mut tally = PredictionTally::default();
    for m in matches {
        match prediction_result(m) {
            PredictionResult::Guessed => tally.guessed += 1,
            PredictionResult::Missed => tally.missed += 1,
            PredictionResult::Pending => tally.pending += 1,
        }
    }
    tally
}

/// Predictions stay editable until kickoff. Matches without a date are always open.
pub fn changes_allowed(m: &Match, now: DateTime<Utc>) -> bool {
    m.date.is_none_or(|kickoff| kickoff > now)
}

pub fn record_prediction<R>(
    repo: &mut R,
    user_id: UserId,
    match_id: MatchId,
    prediction: Outcome,
    now: DateTime<Utc>,
) -> Result<()>
where
    R: MatchRepository + PredictionRepository,
{
    let Some(target) = repo.find_match(match_id)? else {
        return Err(PredictorError::MatchNotFound(match_id));
    };
    if !changes_allowed(&target, now) {
        debug!(user_id, match_id, "prediction refused after kickoff");
        return Err(PredictorError::PredictionLocked(match_id));
    }

    repo.upsert_prediction(&MatchPrediction {
        user_id,
        match_id,
        prediction,
    })?;
    info!(user_id, match_id, %prediction, "prediction recorded");
    Ok(())
}

pub fn load_user_matches<R>(repo: &R, user_id: UserId) -> Result<UserMatches>
where
    R: MatchRepository + PredictionRepository,
{
    let matches = repo.all_matches()?;
    let predictions = repo.predictions_for_user(user_id)?;
    Ok(project_user_matches(user_id, &matches, &predictions))
}

fn predict_action(user_id: UserId) -> UserAction {
    UserAction {
        name: "predict match".to_string(),
        method: "PATCH".to_string(),
        href: format!("/api/user/{user_id}/match"),
    }
}
