#![forbid(unsafe_code)]

use ql_core::{DueDateError, ProfileNameError};
use ql_storage::StoreError;

#[derive(Debug)]
pub enum SessionError {
    InvalidName(ProfileNameError),
    InvalidDifficulty { label: String },
    InvalidDate(DueDateError),
    InvalidInput(&'static str),
    TaskNotFound,
    ProfileAlreadyFinalized,
    Store(StoreError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "invalid name: {err}"),
            Self::InvalidDifficulty { label } => {
                write!(f, "unknown difficulty {label:?} (expected easy, medium or hard)")
            }
            Self::InvalidDate(err) => write!(f, "invalid date: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::TaskNotFound => write!(f, "task not found"),
            Self::ProfileAlreadyFinalized => write!(f, "profile class/race already finalized"),
            Self::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ProfileNameError> for SessionError {
    fn from(value: ProfileNameError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<DueDateError> for SessionError {
    fn from(value: DueDateError) -> Self {
        Self::InvalidDate(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::TaskNotFound => Self::TaskNotFound,
            StoreError::ProfileAlreadyFinalized => Self::ProfileAlreadyFinalized,
            StoreError::InvalidInput(message) => Self::InvalidInput(message),
            other => Self::Store(other),
        }
    }
}
