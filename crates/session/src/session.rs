#![forbid(unsafe_code)]

use crate::error::SessionError;
use crate::views::{CompletionOutcome, EventView, ProfileView, TaskView};
use ql_core::{Difficulty, DueDate, ProfileName, TaskStatus};
use ql_storage::{
    ProfileFinalizeRequest, SqliteStore, StoreError, TaskCreateRequest, TaskUpdateRequest,
};

const DEFAULT_HISTORY_LIMIT: usize = 50;

/// How the shell refers to a task. Ids are authoritative; a name resolves to
/// the first matching open task before the id-only store call runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskRef {
    Id(i64),
    Name(String),
}

/// One logged-in user's working context: the store handle plus the profile
/// every operation is scoped to. There is no other way to reach the store,
/// which keeps the single-active-session assumption explicit.
#[derive(Debug)]
pub struct Session {
    store: SqliteStore,
    profile: ProfileName,
}

impl Session {
    /// Login: validates the name, then upserts the profile (first login
    /// creates it with zero progression, later logins load it unchanged).
    ///
    /// On failure the store comes back with the error, so the caller can
    /// re-prompt and retry instead of losing the handle.
    pub fn login(mut store: SqliteStore, name: &str) -> Result<Self, (SessionError, SqliteStore)> {
        let profile = match ProfileName::try_new(name) {
            Ok(profile) => profile,
            Err(err) => return Err((err.into(), store)),
        };
        if let Err(err) = store.profile_create_or_load(&profile) {
            return Err((err.into(), store));
        }
        Ok(Self { store, profile })
    }

    pub fn profile_name(&self) -> &ProfileName {
        &self.profile
    }

    pub fn profile(&self) -> Result<ProfileView, SessionError> {
        let row = self
            .store
            .profile_get(&self.profile)?
            .ok_or(SessionError::Store(StoreError::UnknownProfile {
                name: self.profile.as_str().to_string(),
            }))?;
        Ok(row.into())
    }

    /// One-shot class/race assignment.
    pub fn finalize_profile(&mut self, class: &str, race: &str) -> Result<ProfileView, SessionError> {
        let row = self.store.profile_finalize(ProfileFinalizeRequest {
            name: self.profile.clone(),
            class: class.to_string(),
            race: race.to_string(),
        })?;
        Ok(row.into())
    }

    pub fn set_profile_image(&mut self, image: &str) -> Result<ProfileView, SessionError> {
        let row = self.store.profile_set_image(&self.profile, image)?;
        Ok(row.into())
    }

    /// Creates an open task. The difficulty label and due date are parsed up
    /// front, so invalid input never touches the store.
    pub fn add_task(
        &mut self,
        name: &str,
        difficulty: &str,
        due_date: &str,
    ) -> Result<TaskView, SessionError> {
        let difficulty =
            Difficulty::parse(difficulty.trim()).ok_or_else(|| SessionError::InvalidDifficulty {
                label: difficulty.to_string(),
            })?;
        let due_date = DueDate::parse(due_date)?;
        let row = self.store.task_create(TaskCreateRequest {
            owner: self.profile.clone(),
            name: name.to_string(),
            difficulty,
            due_date,
        })?;
        Ok(row.into())
    }

    pub fn tasks(&self, status: TaskStatus) -> Result<Vec<TaskView>, SessionError> {
        let rows = self.store.task_list(&self.profile, status)?;
        Ok(rows.into_iter().map(TaskView::from).collect())
    }

    /// Completes a task and applies its reward in sequence: mark done, map
    /// the stored difficulty to points (unknown labels earn zero), then add
    /// experience and resolve level-ups.
    pub fn complete_task(&mut self, task: &TaskRef) -> Result<CompletionOutcome, SessionError> {
        let id = self.resolve(task)?;
        let row = self.store.task_complete(&self.profile, id)?;
        let points = Difficulty::reward_points_for_label(&row.difficulty);
        let reward = self.store.profile_apply_reward(&self.profile, points)?;
        Ok(CompletionOutcome::new(row, points, reward))
    }

    /// Edits an open task in place. Untouched fields keep their stored
    /// values; new difficulty and due-date input is parsed before any store
    /// call, like `add_task`.
    pub fn update_task(
        &mut self,
        task: &TaskRef,
        name: Option<&str>,
        difficulty: Option<&str>,
        due_date: Option<&str>,
    ) -> Result<TaskView, SessionError> {
        let difficulty = difficulty
            .map(|label| {
                Difficulty::parse(label.trim()).ok_or_else(|| SessionError::InvalidDifficulty {
                    label: label.to_string(),
                })
            })
            .transpose()?;
        let due_date = due_date.map(DueDate::parse).transpose()?;
        let id = self.resolve(task)?;
        let row = self.store.task_update(TaskUpdateRequest {
            owner: self.profile.clone(),
            id,
            name: name.map(str::to_string),
            difficulty,
            due_date,
        })?;
        Ok(row.into())
    }

    pub fn delete_task(&mut self, task: &TaskRef) -> Result<TaskView, SessionError> {
        let id = self.resolve(task)?;
        let row = self.store.task_delete(&self.profile, id)?;
        Ok(row.into())
    }

    /// The newest `limit` journal entries, oldest first.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<EventView>, SessionError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let rows = self.store.events_tail(&self.profile, limit)?;
        Ok(rows.into_iter().map(EventView::from).collect())
    }

    fn resolve(&self, task: &TaskRef) -> Result<i64, SessionError> {
        match task {
            TaskRef::Id(id) => Ok(*id),
            TaskRef::Name(name) => self
                .store
                .task_find_open_by_name(&self.profile, name)?
                .ok_or(SessionError::TaskNotFound),
        }
    }
}
