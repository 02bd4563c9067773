use serde::Serialize;

/// Per-challenge lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeStatus {
    Locked,
    Active,
    Completed,
}

/// The four challenges, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeType {
    Puzzle,
    Video,
    Riddle,
    Maze,
}

/// What the page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Challenge(ChallengeType),
    Reward,
}

/// Every view, in tab order.
pub const ALL_VIEWS: [View; 5] = [
    View::Challenge(ChallengeType::Puzzle),
    View::Challenge(ChallengeType::Video),
    View::Challenge(ChallengeType::Riddle),
    View::Challenge(ChallengeType::Maze),
    View::Reward,
];

impl View {
    /// Numeric code used on the page bridge.
    pub fn code(self) -> u32 {
        match self {
            View::Challenge(ChallengeType::Puzzle) => 0,
            View::Challenge(ChallengeType::Video) => 1,
            View::Challenge(ChallengeType::Riddle) => 2,
            View::Challenge(ChallengeType::Maze) => 3,
            View::Reward => 4,
        }
    }

    /// Name used in the view snapshot.
    pub fn name(self) -> &'static str {
        match self {
            View::Challenge(ChallengeType::Puzzle) => "PUZZLE",
            View::Challenge(ChallengeType::Video) => "VIDEO",
            View::Challenge(ChallengeType::Riddle) => "RIDDLE",
            View::Challenge(ChallengeType::Maze) => "MAZE",
            View::Reward => "REWARD",
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(View::Challenge(ChallengeType::Puzzle)),
            1 => Some(View::Challenge(ChallengeType::Video)),
            2 => Some(View::Challenge(ChallengeType::Riddle)),
            3 => Some(View::Challenge(ChallengeType::Maze)),
            4 => Some(View::Reward),
            _ => None,
        }
    }
}

/// Tracked statuses. The video step has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressionState {
    pub puzzle: ChallengeStatus,
    pub riddle: ChallengeStatus,
    pub maze: ChallengeStatus,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            puzzle: ChallengeStatus::Active,
            riddle: ChallengeStatus::Locked,
            maze: ChallengeStatus::Locked,
        }
    }
}

/// Fixed successor of each challenge.
pub fn successor(challenge: ChallengeType) -> View {
    match challenge {
        ChallengeType::Puzzle => View::Challenge(ChallengeType::Video),
        ChallengeType::Video => View::Challenge(ChallengeType::Riddle),
        ChallengeType::Riddle => View::Challenge(ChallengeType::Maze),
        ChallengeType::Maze => View::Reward,
    }
}

/// Sequencer owning cross-challenge state. All transitions go through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    state: ProgressionState,
    view: View,
}

impl Progression {
    pub fn new() -> Self {
        Self {
            state: ProgressionState::default(),
            view: View::Challenge(ChallengeType::Puzzle),
        }
    }

    pub fn state(&self) -> ProgressionState {
        self.state
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Status of a challenge; `None` for the untracked video step.
    pub fn status(&self, challenge: ChallengeType) -> Option<ChallengeStatus> {
        match challenge {
            ChallengeType::Puzzle => Some(self.state.puzzle),
            ChallengeType::Video => None,
            ChallengeType::Riddle => Some(self.state.riddle),
            ChallengeType::Maze => Some(self.state.maze),
        }
    }

    fn status_mut(&mut self, challenge: ChallengeType) -> Option<&mut ChallengeStatus> {
        match challenge {
            ChallengeType::Puzzle => Some(&mut self.state.puzzle),
            ChallengeType::Video => None,
            ChallengeType::Riddle => Some(&mut self.state.riddle),
            ChallengeType::Maze => Some(&mut self.state.maze),
        }
    }

    /// Record completion of the displayed challenge and move to its successor.
    /// Returns the new view, or `None` when the completion is not applicable.
    pub fn on_challenge_complete(&mut self, challenge: ChallengeType) -> Option<View> {
        if self.view != View::Challenge(challenge) {
            return None;
        }
        if self.status(challenge) == Some(ChallengeStatus::Locked) {
            return None;
        }

        if let Some(status) = self.status_mut(challenge) {
            *status = ChallengeStatus::Completed;
        }
        let next = successor(challenge);
        if let View::Challenge(next_challenge) = next {
            if let Some(status) = self.status_mut(next_challenge) {
                if *status == ChallengeStatus::Locked {
                    *status = ChallengeStatus::Active;
                }
            }
        }
        self.view = next;
        log::info!("{:?} complete, showing {:?}", challenge, next);
        Some(next)
    }

    /// True if the page may switch to `view`.
    pub fn can_navigate(&self, view: View) -> bool {
        match view {
            View::Reward => self.state.maze == ChallengeStatus::Completed,
            // Reachable while it is the pending step: after the puzzle, before the riddle.
            View::Challenge(ChallengeType::Video) => {
                self.view == view
                    || (self.state.puzzle == ChallengeStatus::Completed
                        && self.state.riddle == ChallengeStatus::Locked)
            }
            View::Challenge(challenge) => matches!(
                self.status(challenge),
                Some(ChallengeStatus::Active | ChallengeStatus::Completed)
            ),
        }
    }

    /// Switch the displayed view. Disallowed targets are ignored.
    pub fn navigate(&mut self, view: View) -> bool {
        if !self.can_navigate(view) {
            return false;
        }
        self.view = view;
        true
    }

    /// Number of completed tracked challenges (0..=3).
    pub fn completed_count(&self) -> usize {
        [self.state.puzzle, self.state.riddle, self.state.maze]
            .iter()
            .filter(|&&s| s == ChallengeStatus::Completed)
            .count()
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}
