#![forbid(unsafe_code)]

use ql_core::Progress;
use ql_storage::{EventRow, ProfileRow, RewardOutcome, TaskRow};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// Structured results handed to the presentation shell. The session never
// formats UI prose; the shell renders these however it likes.

#[derive(Clone, Debug, Serialize)]
pub struct ProfileView {
    pub name: String,
    pub profile_image: String,
    pub class: Option<String>,
    pub race: Option<String>,
    pub setup_state: String,
    pub experience: u32,
    pub level: u32,
    pub gold: u32,
}

impl From<ProfileRow> for ProfileView {
    fn from(row: ProfileRow) -> Self {
        Self {
            name: row.name,
            profile_image: row.profile_image,
            class: row.class,
            race: row.race,
            setup_state: row.setup_state.as_str().to_string(),
            experience: row.experience,
            level: row.level,
            gold: row.gold,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskView {
    pub id: i64,
    pub name: String,
    pub difficulty: String,
    pub due_date: String,
    pub status: String,
}

impl From<TaskRow> for TaskView {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            difficulty: row.difficulty,
            due_date: row.due_date,
            status: row.status.as_str().to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ProgressView {
    pub experience: u32,
    pub level: u32,
    pub gold: u32,
}

impl From<Progress> for ProgressView {
    fn from(progress: Progress) -> Self {
        Self {
            experience: progress.experience,
            level: progress.level,
            gold: progress.gold,
        }
    }
}

/// Everything the shell needs to render a completion: the finished task, the
/// points it granted, and the progression movement including level-up toasts.
#[derive(Clone, Debug, Serialize)]
pub struct CompletionOutcome {
    pub task: TaskView,
    pub points: u32,
    pub before: ProgressView,
    pub after: ProgressView,
    pub levels_gained: u32,
    pub gold_earned: u32,
}

impl CompletionOutcome {
    pub(crate) fn new(task: TaskRow, points: u32, reward: RewardOutcome) -> Self {
        Self {
            task: task.into(),
            points,
            before: reward.before.into(),
            after: reward.after.into(),
            levels_gained: reward.levels_gained,
            gold_earned: reward.gold_earned,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EventView {
    pub seq: i64,
    pub ts: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl From<EventRow> for EventView {
    fn from(row: EventRow) -> Self {
        let payload = serde_json::from_str(&row.payload_json)
            .unwrap_or(serde_json::Value::String(row.payload_json));
        Self {
            seq: row.seq,
            ts: ts_ms_to_rfc3339(row.ts_ms),
            event_type: row.event_type,
            payload,
        }
    }
}

pub(crate) fn ts_ms_to_rfc3339(ts_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ts_ms) * 1_000_000)
        .ok()
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts_ms.to_string())
}
