use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::model::{Group, UserMatches};
use crate::prediction::{PredictionResult, prediction_result};

pub struct ExportReport {
    pub groups: usize,
    pub teams: usize,
    pub predictions: usize,
}

/// Writes a "Standings" sheet and, when `user` is given, a "Predictions" sheet.
pub fn export_standings_xlsx(
    path: &Path,
    groups: &[Group],
    user: Option<&UserMatches>,
) -> Result<ExportReport> {
    let standings = standings_rows(groups);
    let predictions = user.map(prediction_rows).unwrap_or_default();

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &standings)?;
    }
    if !predictions.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_rows(sheet, &predictions)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    let report = ExportReport {
        groups: groups.len(),
        teams: standings.len().saturating_sub(1),
        predictions: predictions.len().saturating_sub(1),
    };
    info!(
        path = %path.display(),
        groups = report.groups,
        teams = report.teams,
        predictions = report.predictions,
        "standings exported"
    );
    Ok(report)
}

/// Header row plus one row per team, ranks restarting at 1 for each group.
pub fn standings_rows(groups: &[Group]) -> Vec<Vec<String>> {
    let mut rows = vec![
        ["Group", "Rank", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"]
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>(),
    ];
    for group in groups {
        for (idx, team) in group.teams.iter().enumerate() {
            rows.push(vec![
                group.name.clone(),
                (idx + 1).to_string(),
                team.name.clone(),
                team.matches_played.to_string(),
                team.wins.to_string(),
                team.draws.to_string(),
                team.losses.to_string(),
                team.goals_scored.to_string(),
                team.goals_against.to_string(),
                format!("{:+}", team.goal_difference),
                team.points.to_string(),
            ]);
        }
    }
    rows
}

fn prediction_rows(user: &UserMatches) -> Vec<Vec<String>> {
    let mut rows = vec![
        ["Match ID", "Stage", "Home", "Away", "Score", "Prediction", "Result"]
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>(),
    ];
    for m in &user.matches {
        let result = match prediction_result(m) {
            PredictionResult::Guessed => "guessed",
            PredictionResult::Missed => "missed",
            PredictionResult::Pending => "",
        };
        rows.push(vec![
            m.fixture.id.to_string(),
            m.fixture.stage.clone(),
            m.fixture.home.clone(),
            m.fixture.away.clone(),
            m.fixture.score.map(|s| s.to_string()).unwrap_or_default(),
            m.prediction.map(|p| p.to_string()).unwrap_or_default(),
            result.to_string(),
        ]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
