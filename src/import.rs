use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{PredictorError, Result};
use crate::model::{Match, Score};

pub fn load_matches_file(path: &Path) -> Result<Vec<Match>> {
    let raw = fs::read_to_string(path)?;
    let matches = parse_matches_json(&raw)?;
    info!(path = %path.display(), count = matches.len(), "loaded matches");
    Ok(matches)
}

/// Parses a JSON array of match records. `null` or an empty body yields no matches.
///
/// Records missing `home`, `away` or `stage` are rejected here so the standings code
/// never sees them. A record without `id` takes its 1-based position.
pub fn parse_matches_json(raw: &str) -> Result<Vec<Match>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let v: Value = serde_json::from_str(trimmed)?;
    let Some(items) = v.as_array() else {
        return Err(PredictorError::invalid_match(0, "matches", "expected a JSON array of matches"));
    };

    let mut out = Vec::with_capacity(items.len());
    let mut seen_ids = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        let m = parse_match(index, item)?;
        if !seen_ids.insert(m.id) {
            return Err(PredictorError::invalid_match(
                index,
                "id",
                format!("duplicate id {}", m.id),
            ));
        }
        out.push(m);
    }
    Ok(out)
}

fn parse_match(index: usize, v: &Value) -> Result<Match> {
    if !v.is_object() {
        return Err(PredictorError::invalid_match(index, "record", "expected an object"));
    }

    let id = match v.get("id") {
        None | Some(Value::Null) => u32::try_from(index + 1)
            .map_err(|_| PredictorError::invalid_match(index, "id", "too many matches"))?,
        Some(raw) => raw
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                PredictorError::invalid_match(index, "id", "id must be a positive integer")
            })?,
    };

    let home = required_text(index, v, "home")?;
    let away = required_text(index, v, "away")?;
    let stage = required_text(index, v, "stage")?;

    let date = match v.get("date").and_then(|x| x.as_str()) {
        Some(raw) => Some(parse_date(index, raw)?),
        None => None,
    };

    let score = match v.get("score") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(parse_score(index, raw)?),
    };

    Ok(Match {
        id,
        date,
        home,
        away,
        stage,
        score,
    })
}

fn required_text(index: usize, v: &Value, field: &'static str) -> Result<String> {
    let text = v
        .get(field)
        .and_then(|x| x.as_str())
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(PredictorError::invalid_match(
            index,
            field,
            format!("missing {field}"),
        ));
    }
    Ok(text.to_string())
}

fn parse_date(index: usize, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|d| d.with_timezone(&Utc))
        .map_err(|err| PredictorError::invalid_match(index, "date", format!("bad date {raw:?}: {err}")))
}

fn parse_score(index: usize, v: &Value) -> Result<Score> {
    let goals = |side: &str| {
        v.get(side)
            .and_then(|x| x.as_u64())
            .and_then(|g| u32::try_from(g).ok())
    };
    match (goals("home"), goals("away")) {
        (Some(home), Some(away)) => Ok(Score::new(home, away)),
        _ => {
            warn!(index, "rejecting score without two non-negative goal counts");
            Err(PredictorError::invalid_match(
                index,
                "score",
                "score needs non-negative home and away goals",
            ))
        }
    }
}
