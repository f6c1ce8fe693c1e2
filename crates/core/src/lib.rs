#![forbid(unsafe_code)]

pub mod due;
pub mod ids;
pub mod model;
pub mod progress;

pub use due::{DueDate, DueDateError};
pub use ids::{ProfileName, ProfileNameError};
pub use model::{Difficulty, SetupState, TaskStatus, DEFAULT_PROFILE_IMAGE};
pub use progress::{LevelUps, Progress, GOLD_PER_LEVEL, LEVEL_THRESHOLD};
