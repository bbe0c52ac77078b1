use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use wc_predictor::config::config;
use wc_predictor::export::export_standings_xlsx;
use wc_predictor::import::load_matches_file;
use wc_predictor::logging::init_logging;
use wc_predictor::repository::{MatchRepository, SqliteRepository};
use wc_predictor::standings::{compute_group, compute_groups};

fn main() -> Result<()> {
    let cfg = config();
    init_logging(&cfg.log)?;

    let file = parse_path_arg("--file")
        .or_else(|| cfg.matches_file.clone())
        .ok_or_else(|| anyhow!("no fixture file given (use --file or WC_MATCHES_FILE)"))?;
    let db_path = parse_path_arg("--db")
        .or_else(|| cfg.db_path.clone())
        .context("unable to resolve sqlite path")?;

    let matches = load_matches_file(&file)
        .with_context(|| format!("import fixtures from {}", file.display()))?;
    let mut repo = SqliteRepository::open(&db_path)?;
    let upserted = repo.upsert_matches(&matches)?;

    let stored = repo.all_matches()?;
    let groups = match parse_text_arg("--stage") {
        Some(stage) => vec![compute_group(&stored, &stage)],
        None => compute_groups(&stored),
    };

    eprintln!("Import complete");
    eprintln!("DB: {}", db_path.display());
    eprintln!("Matches upserted: {upserted}");
    println!(
        "{}",
        serde_json::to_string_pretty(&groups).context("serialize standings")?
    );

    if let Some(xlsx) = parse_path_arg("--xlsx") {
        let report = export_standings_xlsx(&xlsx, &groups, None)?;
        eprintln!(
            "Exported {} groups / {} teams to {}",
            report.groups,
            report.teams,
            xlsx.display()
        );
    }

    Ok(())
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    parse_text_arg(flag).map(PathBuf::from)
}

fn parse_text_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
