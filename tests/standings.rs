use wc_predictor::model::{Group, Match, TeamStanding};
use wc_predictor::standings::{compute_group, compute_groups, group_stage_tables};

fn fixture(home: &str, away: &str, stage: &str) -> Match {
    Match::new(0, home, away, stage)
}

fn played(home: &str, away: &str, stage: &str, score: (u32, u32)) -> Match {
    fixture(home, away, stage).with_score(score.0, score.1)
}

fn group_a(matches: &[Match]) -> Group {
    compute_groups(matches)
        .into_iter()
        .find(|g| g.name == "Group A")
        .expect("group A should exist")
}

fn names(group: &Group) -> Vec<&str> {
    group.teams.iter().map(|t| t.name.as_str()).collect()
}

fn column<T>(group: &Group, f: impl Fn(&TeamStanding) -> T) -> Vec<T> {
    group.teams.iter().map(f).collect()
}

#[test]
fn teams_are_listed_in_discovery_order_home_before_away() {
    let matches = vec![
        fixture("Team 1", "Team 2", "Group A"),
        fixture("Team 3", "Team 4", "Group A"),
    ];
    let group = group_a(&matches);
    // Each match adds its home team, then its away team.
    assert_eq!(names(&group), vec!["Team 1", "Team 2", "Team 3", "Team 4"]);
}

#[test]
fn tied_teams_rank_in_per_match_discovery_order() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (1, 1)),
        played("Team 3", "Team 4", "Group A", (1, 1)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 1", "Team 2", "Team 3", "Team 4"]);
}

#[test]
fn teams_are_unique_within_a_group() {
    let matches = vec![
        fixture("Team 1", "Team 2", "Group A"),
        fixture("Team 2", "Team 1", "Group A"),
    ];
    assert_eq!(names(&group_a(&matches)), vec!["Team 1", "Team 2"]);
}

#[test]
fn unscored_matches_create_zeroed_teams() {
    let matches = vec![
        fixture("Team 1", "Team 2", "Group A"),
        fixture("Team 3", "Team 1", "Group A"),
    ];
    let group = group_a(&matches);
    assert_eq!(group.teams.len(), 3);
    for team in &group.teams {
        assert_eq!(team.matches_played, 0);
        assert_eq!(team.points, 0);
        assert_eq!(team.goal_difference, 0);
    }
}

#[test]
fn matches_played_counts_only_scored_matches() {
    let matches = vec![
        fixture("Team 1", "Team 2", "Group A"),
        played("Team 1", "Team 3", "Group A", (1, 2)),
        played("Team 3", "Team 1", "Group A", (1, 1)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 3", "Team 1", "Team 2"]);
    assert_eq!(column(&group, |t| t.matches_played), vec![2, 2, 0]);
}

#[test]
fn wins_and_losses_are_counted() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (2, 0)),
        played("Team 2", "Team 1", "Group A", (1, 2)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 1", "Team 2"]);
    assert_eq!(column(&group, |t| t.wins), vec![2, 0]);
    assert_eq!(column(&group, |t| t.losses), vec![0, 2]);
}

#[test]
fn draws_are_counted_for_both_sides() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (0, 0)),
        played("Team 2", "Team 1", "Group A", (2, 2)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 1", "Team 2"]);
    assert_eq!(column(&group, |t| t.draws), vec![2, 2]);
}

#[test]
fn points_are_three_per_win_and_one_per_draw() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (1, 0)),
        played("Team 2", "Team 1", "Group A", (2, 2)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 1", "Team 2"]);
    assert_eq!(column(&group, |t| t.points), vec![3 + 1, 1]);
}

#[test]
fn goals_scored_against_and_difference() {
    let matches = vec![played("Team 1", "Team 2", "Group A", (3, 5))];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 2", "Team 1"]);
    assert_eq!(column(&group, |t| t.goals_scored), vec![5, 3]);
    assert_eq!(column(&group, |t| t.goals_against), vec![3, 5]);
    assert_eq!(column(&group, |t| t.goal_difference), vec![2, -2]);
}

#[test]
fn ordered_by_points_descending() {
    let matches = vec![played("Team 1", "Team 2", "Group A", (0, 5))];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 2", "Team 1"]);
    assert_eq!(column(&group, |t| t.points), vec![3, 0]);
}

#[test]
fn equal_points_fall_back_to_goal_difference() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (2, 1)),
        played("Team 2", "Team 1", "Group A", (2, 0)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 2", "Team 1"]);
    assert_eq!(column(&group, |t| t.points), vec![3, 3]);
    assert_eq!(column(&group, |t| t.goal_difference), vec![1, -1]);
}

#[test]
fn equal_points_and_difference_fall_back_to_goals_scored() {
    let matches = vec![
        played("Team 2", "Team 1", "Group A", (1, 0)),
        played("Team 3", "Team 1", "Group A", (2, 1)),
        played("Team 3", "Team 2", "Group A", (0, 0)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 3", "Team 2", "Team 1"]);
    assert_eq!(column(&group, |t| t.points), vec![4, 4, 0]);
    assert_eq!(column(&group, |t| t.goal_difference), vec![1, 1, -2]);
    assert_eq!(column(&group, |t| t.goals_scored), vec![2, 1, 1]);
}

#[test]
fn points_outrank_goal_difference_and_goals_scored() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (1, 0)),
        played("Team 2", "Team 3", "Group A", (5, 5)),
        played("Team 2", "Team 1", "Group A", (0, 0)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 1", "Team 2", "Team 3"]);
    assert_eq!(column(&group, |t| t.points), vec![4, 2, 1]);
}

#[test]
fn full_ties_keep_discovery_order() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (1, 1)),
        played("Team 3", "Team 4", "Group A", (1, 1)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 1", "Team 2", "Team 3", "Team 4"]);
}

#[test]
fn teams_without_results_rank_below_winners() {
    let matches = vec![
        fixture("Team 1", "Team 2", "Group A"),
        played("Team 3", "Team 4", "Group A", (0, 1)),
    ];
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["Team 4", "Team 1", "Team 2", "Team 3"]);
}

#[test]
fn result_counts_add_up_and_difference_is_consistent() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (3, 1)),
        played("Team 3", "Team 4", "Group A", (0, 0)),
        played("Team 1", "Team 3", "Group A", (1, 2)),
        played("Team 2", "Team 4", "Group A", (4, 4)),
        fixture("Team 1", "Team 4", "Group A"),
        played("Team 2", "Team 3", "Group A", (0, 3)),
    ];
    let group = group_a(&matches);
    for team in &group.teams {
        assert_eq!(team.wins + team.draws + team.losses, team.matches_played);
        assert_eq!(
            team.goal_difference,
            team.goals_scored as i64 - team.goals_against as i64
        );
    }
}

#[test]
fn stages_are_isolated_and_kept_in_discovery_order() {
    let matches = vec![
        played("Team 1", "Team 2", "Group B", (1, 0)),
        played("Team 1", "Team 3", "Group A", (0, 2)),
        played("Team 2", "Team 1", "Group B", (0, 0)),
    ];
    let groups = compute_groups(&matches);
    let stage_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(stage_names, vec!["Group B", "Group A"]);

    let team1_b = groups[0].team("Team 1").expect("team 1 in B");
    assert_eq!(team1_b.matches_played, 2);
    assert_eq!(team1_b.points, 4);

    let team1_a = groups[1].team("Team 1").expect("team 1 in A");
    assert_eq!(team1_a.matches_played, 1);
    assert_eq!(team1_a.points, 0);
}

#[test]
fn unknown_stage_is_an_empty_group() {
    let matches = vec![played("Team 1", "Team 2", "Group A", (1, 0))];
    let group = compute_group(&matches, "Group H");
    assert_eq!(group.name, "Group H");
    assert!(group.teams.is_empty());
}

#[test]
fn single_stage_matches_full_computation() {
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (1, 0)),
        played("Team 5", "Team 6", "Group B", (2, 0)),
        played("Team 2", "Team 3", "Group A", (2, 2)),
    ];
    assert_eq!(compute_group(&matches, "Group A"), group_a(&matches));
}

#[test]
fn group_stage_tables_are_named_by_letter() {
    let letters = ["A", "B", "C", "D", "E", "F", "G", "H"];
    let matches: Vec<Match> = letters
        .iter()
        .map(|letter| fixture("Team 1", "Team 2", &format!("Group {letter}")))
        .collect();
    let groups = group_stage_tables(&matches);
    let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(group_names, letters);
}

#[test]
fn standings_serialize_with_api_field_names() {
    let matches = vec![played("Team 1", "Team 2", "Group A", (2, 0))];
    let json = serde_json::to_value(compute_groups(&matches)).expect("should serialize");
    let team = &json[0]["teams"][0];
    assert_eq!(json[0]["name"], "Group A");
    assert_eq!(team["name"], "Team 1");
    assert_eq!(team["matchesPlayed"], 1);
    assert_eq!(team["goalsScored"], 2);
    assert_eq!(team["goalsAgainst"], 0);
    assert_eq!(team["goalDifference"], 2);
    assert_eq!(json[0]["teams"][1]["loses"], 1);
}

#[test]
fn huge_goal_counts_do_not_overflow_totals() {
    let big = 4_000_000_000;
    let matches = vec![
        played("Team 1", "Team 2", "Group A", (big, 0)),
        played("Team 1", "Team 2", "Group A", (big, 0)),
    ];
    let group = group_a(&matches);
    let leader = group.team("Team 1").expect("team 1 should be listed");
    assert_eq!(leader.goals_scored, 8_000_000_000);
    assert_eq!(leader.goal_difference, 8_000_000_000);

    let trailer = group.team("Team 2").expect("team 2 should be listed");
    assert_eq!(trailer.goals_against, 8_000_000_000);
    assert_eq!(trailer.goal_difference, -8_000_000_000);
}

#[test]
fn parsed_huge_scores_feed_standings() {
    let raw = r#"[
        {"home": "A", "away": "B", "stage": "Group A", "score": {"home": 4000000000, "away": 0}},
        {"home": "A", "away": "B", "stage": "Group A", "score": {"home": 4000000000, "away": 0}}
    ]"#;
    let matches = wc_predictor::import::parse_matches_json(raw).expect("scores fit in u32");
    let group = group_a(&matches);
    assert_eq!(names(&group), vec!["A", "B"]);
    assert_eq!(group.teams[0].goals_scored, 8_000_000_000);
}
