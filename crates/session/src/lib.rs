#![forbid(unsafe_code)]

mod error;
mod session;
mod views;

pub use error::SessionError;
pub use session::{Session, TaskRef};
pub use views::{CompletionOutcome, EventView, ProfileView, ProgressView, TaskView};
