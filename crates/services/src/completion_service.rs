use std::sync::Arc;

use serde::{Deserialize, Serialize};

use edu_core::Clock;
use edu_core::model::{CourseId, LearnerId, Score};
use storage::repository::ProfileRepository;

use crate::error::CompletionError;

/// A finished-course notification as posted by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub learner_id: String,
    pub course_id: String,
    pub score: u16,
}

/// Outcome of a completion write, mirroring the storage upsert flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReceipt {
    pub updated: bool,
    pub upserted: bool,
}

/// Records course completions against learner profiles.
#[derive(Clone)]
pub struct CompletionService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
}

impl CompletionService {
    #[must_use]
    pub fn new(clock: Clock, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { clock, profiles }
    }

    /// Validate and record a completion, stamped with the clock's now.
    ///
    /// The write is an upsert: a first-ever completion creates the profile.
    /// Repeated completions of the same course each append a history record
    /// while the enrollment set stays unique.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::MissingLearner` for a blank learner id,
    /// `InvalidCourseId` for a malformed course reference, `InvalidScore`
    /// for values above 100, and `Storage` if the write fails (in which case
    /// nothing was persisted).
    pub async fn record(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionReceipt, CompletionError> {
        let learner =
            LearnerId::new(request.learner_id).map_err(|_| CompletionError::MissingLearner)?;
        let course: CourseId = request
            .course_id
            .parse()
            .map_err(|_| CompletionError::InvalidCourseId)?;
        let score = u8::try_from(request.score)
            .ok()
            .and_then(|value| Score::new(value).ok())
            .ok_or(CompletionError::InvalidScore(request.score))?;

        let write = self
            .profiles
            .record_completion(&learner, &course, score, self.clock.now())
            .await?;

        Ok(CompletionReceipt {
            updated: write.updated,
            upserted: write.upserted,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    use edu_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, ProfileRepository as _};

    fn request(learner: &str, course: &str, score: u16) -> CompletionRequest {
        CompletionRequest {
            learner_id: learner.into(),
            course_id: course.into(),
            score,
        }
    }

    fn course_id(label: u8) -> String {
        format!("{label:024x}")
    }

    #[tokio::test]
    async fn first_completion_upserts_profile() {
        let repo = InMemoryRepository::new();
        let service = CompletionService::new(fixed_clock(), Arc::new(repo.clone()));

        let receipt = service
            .record(request("u1", &course_id(1), 90))
            .await
            .unwrap();
        assert_eq!(
            receipt,
            CompletionReceipt {
                updated: false,
                upserted: true
            }
        );

        let learner = LearnerId::new("u1").unwrap();
        let profile = repo.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.completed_courses()[0].completed_at, fixed_now());
        assert_eq!(profile.completed_courses()[0].score.value(), 90);
    }

    #[tokio::test]
    async fn repeat_completion_updates_existing_profile() {
        let repo = InMemoryRepository::new();
        let service = CompletionService::new(fixed_clock(), Arc::new(repo.clone()));

        service
            .record(request("u1", &course_id(1), 60))
            .await
            .unwrap();
        let receipt = service
            .record(request("u1", &course_id(1), 80))
            .await
            .unwrap();
        assert_eq!(
            receipt,
            CompletionReceipt {
                updated: true,
                upserted: false
            }
        );

        let learner = LearnerId::new("u1").unwrap();
        let profile = repo.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.enrolled_courses().len(), 1);
        assert_eq!(profile.completed_courses().len(), 2);
    }

    #[tokio::test]
    async fn blank_learner_is_rejected() {
        let service = CompletionService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let err = service
            .record(request("   ", &course_id(1), 50))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::MissingLearner));
    }

    #[tokio::test]
    async fn malformed_course_id_is_rejected() {
        let service = CompletionService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let err = service
            .record(request("u1", "abc", 50))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::InvalidCourseId));
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let service = CompletionService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let err = service
            .record(request("u1", &course_id(1), 101))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::InvalidScore(101)));
    }
}
