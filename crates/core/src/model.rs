#![forbid(unsafe_code)]

/// Image assigned to a profile created through plain login, before the user
/// picks their own.
pub const DEFAULT_PROFILE_IMAGE: &str = "default-profile.png";

/// Task difficulty tier. Determines the experience reward on completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Experience granted for completing a task of this tier.
    pub fn reward_points(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Reward for a raw stored label. Rows written by older builds may carry
    /// labels outside the current enum; those earn nothing rather than fail.
    pub fn reward_points_for_label(label: &str) -> u32 {
        Self::parse(label).map_or(0, Self::reward_points)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Open,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(TaskStatus::Open),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Whether the one-shot class/race assignment has happened yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupState {
    Pending,
    Finalized,
}

impl SetupState {
    pub fn as_str(self) -> &'static str {
        match self {
            SetupState::Pending => "pending",
            SetupState::Finalized => "finalized",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SetupState::Pending),
            "finalized" => Some(SetupState::Finalized),
            _ => None,
        }
    }
}
