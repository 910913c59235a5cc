use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of a well-formed course reference (lowercase hex).
pub const COURSE_ID_LEN: usize = 24;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseIdError {
    #[error("course id must be {COURSE_ID_LEN} lowercase hex characters")]
    MalformedCourseId,

    #[error("learner id cannot be empty")]
    EmptyLearnerId,
}

/// Reference to a course document.
///
/// Course ids are opaque 24-character lowercase hex strings, generated when
/// a course is first persisted. Any other shape is rejected as malformed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(String);

impl CourseId {
    /// Generates a fresh course id.
    #[must_use]
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..COURSE_ID_LEN].to_owned())
    }

    /// Returns the underlying hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CourseId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let well_formed = s.len() == COURSE_ID_LEN
            && s.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(ParseIdError::MalformedCourseId);
        }
        Ok(Self(s.to_owned()))
    }
}

/// External identity subject for a learner.
///
/// Supplied by the identity provider and trusted as given; the only local
/// requirement is that it is non-empty after trimming.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LearnerId(String);

impl LearnerId {
    /// Creates a `LearnerId` from a raw subject string.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError::EmptyLearnerId` if the subject is empty or
    /// whitespace-only.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError::EmptyLearnerId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying subject string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LearnerId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CourseId({})", self.0)
    }
}

impl fmt::Debug for LearnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LearnerId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LearnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
