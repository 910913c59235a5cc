use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::CourseId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssignmentError {
    #[error("assignment title cannot be empty")]
    EmptyTitle,

    #[error("assignment description cannot be empty")]
    EmptyDescription,
}

/// Lifecycle status of an assignment. New assignments start active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentStatus {
    #[default]
    Active,
    Closed,
}

impl AssignmentStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// A course-scoped assignment created by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    course_id: CourseId,
    title: String,
    description: String,
    due_date: DateTime<Utc>,
    status: AssignmentStatus,
    created_at: DateTime<Utc>,
}

impl Assignment {
    /// Creates a new assignment.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError` when the title or description is blank.
    pub fn new(
        course_id: CourseId,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AssignmentError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AssignmentError::EmptyTitle);
        }
        let description = description.into();
        if description.trim().is_empty() {
            return Err(AssignmentError::EmptyDescription);
        }

        Ok(Self {
            course_id,
            title: title.trim().to_owned(),
            description,
            due_date,
            status: AssignmentStatus::Active,
            created_at,
        })
    }

    /// Reassembles an assignment from persisted parts, status included.
    #[must_use]
    pub fn from_persisted(
        course_id: CourseId,
        title: String,
        description: String,
        due_date: DateTime<Utc>,
        status: AssignmentStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            course_id,
            title,
            description,
            due_date,
            status,
            created_at,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    #[must_use]
    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
