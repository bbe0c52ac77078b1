use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{Group, Match, Outcome, Score, TeamStanding};

const STAGE_GROUP_PREFIX: &str = "Group ";

const POINTS_WIN: u32 = 3;
const POINTS_DRAW: u32 = 1;

/// Computes ranked standings for every stage found in `matches`, in stage discovery order.
pub fn compute_groups(matches: &[Match]) -> Vec<Group> {
    let mut stages: Vec<&str> = Vec::new();
    let mut by_stage: HashMap<&str, Vec<&Match>> = HashMap::new();
    for m in matches {
        let bucket = by_stage.entry(m.stage.as_str()).or_default();
        if bucket.is_empty() {
            stages.push(m.stage.as_str());
        }
        bucket.push(m);
    }

    stages
        .into_iter()
        .map(|stage| {
            let bucket = by_stage.remove(stage).unwrap_or_default();
            Group {
                name: stage.to_string(),
                teams: rank_teams(&bucket),
            }
        })
        .collect()
}

/// Standings for a single stage. An unknown stage yields an empty group.
pub fn compute_group(matches: &[Match], stage: &str) -> Group {
    let bucket: Vec<&Match> = matches.iter().filter(|m| m.stage == stage).collect();
    Group {
        name: stage.to_string(),
        teams: rank_teams(&bucket),
    }
}

/// Only the `Group X` stages, named by their letter ("Group A" becomes "A").
pub fn group_stage_tables(matches: &[Match]) -> Vec<Group> {
    compute_groups(matches)
        .into_iter()
        .filter_map(|group| {
            let letter = group.name.strip_prefix(STAGE_GROUP_PREFIX)?.trim();
            if letter.is_empty() {
                return None;
            }
            Some(Group {
                name: letter.to_string(),
                teams: group.teams,
            })
        })
        .collect()
}

/// Points desc, then goal difference desc, then goals scored desc.
pub fn compare_standings(a: &TeamStanding, b: &TeamStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_difference.cmp(&a.goal_difference))
        .then(b.goals_scored.cmp(&a.goals_scored))
}

fn rank_teams(matches: &[&Match]) -> Vec<TeamStanding> {
    // Discovery order lives in `teams`; `index` only resolves names.
    let mut teams: Vec<TeamStanding> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for m in matches {
        let home = team_slot(&mut teams, &mut index, &m.home);
        let away = team_slot(&mut teams, &mut index, &m.away);
        if let Some(score) = m.score {
            apply_score(&mut teams, home, away, score);
        }
    }

    for team in &mut teams {
        team.goal_difference = signed_goals(team.goals_scored) - signed_goals(team.goals_against);
    }

    // `sort_by` is stable, so ties keep discovery order.
    teams.sort_by(compare_standings);
    teams
}

fn team_slot<'a>(
    teams: &mut Vec<TeamStanding>,
    index: &mut HashMap<&'a str, usize>,
    name: &'a str,
) -> usize {
    *index.entry(name).or_insert_with(|| {
        teams.push(TeamStanding::new(name));
        teams.len() - 1
    })
}

fn apply_score(teams: &mut [TeamStanding], home: usize, away: usize, score: Score) {
    record_side(&mut teams[home], score.home, score.away);
    record_side(&mut teams[away], score.away, score.home);

    match Outcome::from_score(score) {
        Outcome::Home => {
            award_win(&mut teams[home]);
            teams[away].losses += 1;
        }
        Outcome::Away => {
            award_win(&mut teams[away]);
            teams[home].losses += 1;
        }
        Outcome::Draw => {
            award_draw(&mut teams[home]);
            award_draw(&mut teams[away]);
        }
    }
}

fn record_side(team: &mut TeamStanding, scored: u32, conceded: u32) {
    team.matches_played += 1;
    team.goals_scored += u64::from(scored);
    team.goals_against += u64::from(conceded);
}

fn signed_goals(total: u64) -> i64 {
    i64::try_from(total).unwrap_or(i64::MAX)
}

fn award_win(team: &mut TeamStanding) {
    team.wins += 1;
    team.points += POINTS_WIN;
}

fn award_draw(team: &mut TeamStanding) {
    team.draws += 1;
    team.points += POINTS_DRAW;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(group: &Group) -> Vec<&str> {
        group.teams.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn draw_keeps_discovery_order() {
        let matches = vec![Match::new(1, "Team 1", "Team 2", "Group A").with_score(1, 1)];
        let groups = compute_groups(&matches);
        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["Team 1", "Team 2"]);
    }

    #[test]
    fn compare_prefers_points_over_goals() {
        let mut a = TeamStanding::new("a");
        a.points = 4;
        a.goal_difference = 1;
        a.goals_scored = 1;
        let mut b = TeamStanding::new("b");
        b.points = 2;
        b.goal_difference = 5;
        b.goals_scored = 10;
        assert_eq!(compare_standings(&a, &b), Ordering::Less);
        assert_eq!(compare_standings(&b, &a), Ordering::Greater);
        assert_eq!(compare_standings(&a, &a), Ordering::Equal);
    }

    #[test]
    fn group_stage_tables_skip_knockout_stages() {
        let matches = vec![
            Match::new(1, "Team 1", "Team 2", "Group B"),
            Match::new(2, "Team 3", "Team 4", "Round of 16"),
            Match::new(3, "Team 5", "Team 6", "Group A"),
        ];
        let groups = group_stage_tables(&matches);
        let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, vec!["B", "A"]);
    }
}
