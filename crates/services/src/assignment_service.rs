use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use edu_core::Clock;
use edu_core::model::{Assignment, CourseId};
use storage::repository::{AssignmentId, AssignmentRepository, AssignmentRow};

use crate::error::AssignmentServiceError;

/// Payload for creating a course-scoped assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}

/// Creates and lists assignments.
#[derive(Clone)]
pub struct AssignmentService {
    clock: Clock,
    assignments: Arc<dyn AssignmentRepository>,
}

impl AssignmentService {
    #[must_use]
    pub fn new(clock: Clock, assignments: Arc<dyn AssignmentRepository>) -> Self {
        Self { clock, assignments }
    }

    /// Validate and persist a new assignment. New assignments start active.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::InvalidCourseId` for a malformed
    /// course reference, `Assignment` for blank title/description, and
    /// `Storage` if the write fails.
    pub async fn create(
        &self,
        request: NewAssignment,
    ) -> Result<AssignmentId, AssignmentServiceError> {
        let course_id: CourseId = request
            .course_id
            .parse()
            .map_err(|_| AssignmentServiceError::InvalidCourseId)?;
        let assignment = Assignment::new(
            course_id,
            request.title,
            request.description,
            request.due_date,
            self.clock.now(),
        )?;
        let id = self.assignments.insert_assignment(&assignment).await?;
        Ok(id)
    }

    /// List assignments newest-first, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` if repository access fails.
    pub async fn list(&self, limit: u32) -> Result<Vec<AssignmentRow>, AssignmentServiceError> {
        let rows = self.assignments.list_assignments(limit).await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use edu_core::model::{AssignmentError, AssignmentStatus};
    use edu_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    fn request(title: &str) -> NewAssignment {
        NewAssignment {
            course_id: format!("{:024x}", 1),
            title: title.into(),
            description: "read chapter 3".into(),
            due_date: fixed_now() + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn create_stamps_now_and_starts_active() {
        let service = AssignmentService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let id = service.create(request("Homework 1")).await.unwrap();
        assert_eq!(id, 1);

        let rows = service.list(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].assignment.title(), "Homework 1");
        assert_eq!(rows[0].assignment.status(), AssignmentStatus::Active);
        assert_eq!(rows[0].assignment.created_at(), fixed_now());
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let service = AssignmentService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let err = service.create(request("  ")).await.unwrap_err();
        assert!(matches!(
            err,
            AssignmentServiceError::Assignment(AssignmentError::EmptyTitle)
        ));
    }

    #[tokio::test]
    async fn malformed_course_id_is_rejected() {
        let service = AssignmentService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let mut bad = request("Homework 1");
        bad.course_id = "nope".into();
        let err = service.create(bad).await.unwrap_err();
        assert!(matches!(err, AssignmentServiceError::InvalidCourseId));
    }
}
