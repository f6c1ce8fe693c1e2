#![forbid(unsafe_code)]

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A task due date in the canonical `YYYY-MM-DD` form.
///
/// The source history carried two incompatible input formats; only the ISO
/// form is accepted here. Anything else is rejected before it can reach the
/// store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DueDate(Date);

impl DueDate {
    pub fn parse(value: &str) -> Result<Self, DueDateError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DueDateError::Empty);
        }
        Date::parse(trimmed, ISO_DATE)
            .map(Self)
            .map_err(|_| DueDateError::Unparseable {
                input: trimmed.to_string(),
            })
    }

    pub fn date(&self) -> Date {
        self.0
    }
}

impl std::fmt::Display for DueDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.format(ISO_DATE) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DueDateError {
    Empty,
    Unparseable { input: String },
}

impl std::fmt::Display for DueDateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "due date is empty"),
            Self::Unparseable { input } => {
                write!(f, "due date {input:?} is not a valid YYYY-MM-DD date")
            }
        }
    }
}

impl std::error::Error for DueDateError {}
