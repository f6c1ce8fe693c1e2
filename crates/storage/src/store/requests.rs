#![forbid(unsafe_code)]

use ql_core::{Difficulty, DueDate, ProfileName};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskCreateRequest {
    pub owner: ProfileName,
    pub name: String,
    pub difficulty: Difficulty,
    pub due_date: DueDate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskUpdateRequest {
    pub owner: ProfileName,
    pub id: i64,
    pub name: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub due_date: Option<DueDate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileFinalizeRequest {
    pub name: ProfileName,
    pub class: String,
    pub race: String,
}
