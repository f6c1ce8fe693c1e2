#![forbid(unsafe_code)]

/// Profile identifier: the name the user logs in with.
///
/// Names are trimmed on construction; the trimmed form is what gets stored
/// and compared, so `"Ada"` and `" Ada "` are the same profile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProfileName(String);

impl ProfileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ProfileNameError> {
        let value = value.into();
        let trimmed = value.trim();
        validate_profile_name(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }
}

impl std::fmt::Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileNameError {
    Empty,
    TooLong,
    ContainsControl { index: usize },
}

impl std::fmt::Display for ProfileNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "profile name is empty"),
            Self::TooLong => write!(f, "profile name exceeds 64 characters"),
            Self::ContainsControl { index } => {
                write!(f, "profile name contains a control character at index {index}")
            }
        }
    }
}

impl std::error::Error for ProfileNameError {}

fn validate_profile_name(value: &str) -> Result<(), ProfileNameError> {
    if value.is_empty() {
        return Err(ProfileNameError::Empty);
    }
    if value.chars().count() > 64 {
        return Err(ProfileNameError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_control() {
            return Err(ProfileNameError::ContainsControl { index });
        }
    }
    Ok(())
}
