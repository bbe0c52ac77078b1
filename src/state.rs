use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{Group, Outcome, PredictedMatch, UserId, UserMatches};
use crate::prediction::{PredictionTally, load_user_matches, prediction_tally, record_prediction};
use crate::repository::{MatchRepository, PredictionRepository};
use crate::standings::compute_groups;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Groups,
    Matches,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub user_id: UserId,
    pub groups: Vec<Group>,
    pub user: UserMatches,
    pub selected: usize,
    pub group_scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(user_id: UserId) -> Self {
        Self {
            screen: Screen::Groups,
            user_id,
            groups: Vec::new(),
            user: UserMatches {
                id: user_id,
                matches: Vec::new(),
                actions: Vec::new(),
            },
            selected: 0,
            group_scroll: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    /// Recomputes standings and the user's match list from the repository.
    pub fn refresh<R>(&mut self, repo: &R) -> Result<()>
    where
        R: MatchRepository + PredictionRepository,
    {
        let matches = repo.all_matches()?;
        self.groups = compute_groups(&matches);
        self.user = load_user_matches(repo, self.user_id)?;
        if self.selected >= self.user.matches.len() {
            self.selected = self.user.matches.len().saturating_sub(1);
        }
        Ok(())
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn select_next(&mut self) {
        if self.screen == Screen::Groups {
            self.group_scroll = self.group_scroll.saturating_add(1);
            return;
        }
        let total = self.user.matches.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        if self.screen == Screen::Groups {
            self.group_scroll = self.group_scroll.saturating_sub(1);
            return;
        }
        let total = self.user.matches.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 {
            total - 1
        } else {
            self.selected - 1
        };
    }

    pub fn selected_match(&self) -> Option<&PredictedMatch> {
        self.user.matches.get(self.selected)
    }

    pub fn tally(&self) -> PredictionTally {
        prediction_tally(&self.user.matches)
    }

    /// Records `outcome` for the selected match and refreshes. Failures only reach the console.
    pub fn predict_selected<R>(&mut self, repo: &mut R, outcome: Outcome, now: DateTime<Utc>)
    where
        R: MatchRepository + PredictionRepository,
    {
        let Some(selected) = self.selected_match() else {
            self.push_log("[INFO] No match selected");
            return;
        };
        let match_id = selected.fixture.id;
        let label = format!("{}-{}", selected.fixture.home, selected.fixture.away);

        match record_prediction(repo, self.user_id, match_id, outcome, now) {
            Ok(()) => {
                self.push_log(format!("[INFO] Predicted {outcome} for {label}"));
                if let Err(err) = self.refresh(repo) {
                    self.push_log(format!("[WARN] Refresh failed: {err}"));
                }
            }
            Err(err) => self.push_log(format!("[WARN] {err}")),
        }
    }
}
