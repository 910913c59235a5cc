use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edu_core::model::{Assignment, Course, CourseId, LearnerId, Score, UserProfile};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Outcome flags for a completion upsert, kept for caller telemetry only.
///
/// `upserted` means a profile document was created by this write; `updated`
/// means an existing document was modified. Exactly one of the two is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionWrite {
    pub updated: bool,
    pub upserted: bool,
}

/// Identity fields pushed into a profile on sign-in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub learner_id: LearnerId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

/// Storage identifier for a persisted assignment.
///
/// NOTE: This is currently `i64` to match `SQLite` row IDs.
pub type AssignmentId = i64;

/// An assignment together with its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRow {
    pub id: AssignmentId,
    pub assignment: Assignment,
}

/// Repository contract for the course catalog and its module content.
///
/// Course writes cover two related units (the catalog row and the module/quiz
/// content); adapters must make each write atomic so a course is never left
/// referencing absent content.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist a new course together with its content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists, or other
    /// storage errors. Nothing is persisted on failure.
    async fn insert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Replace a course's metadata and content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course does not exist. Nothing
    /// is persisted on failure.
    async fn update_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Fetch a course with its full content.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failure.
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError>;

    /// List courses in creation order, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failure.
    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError>;

    /// Delete a course and all of its content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the course does not exist.
    async fn delete_course(&self, id: &CourseId) -> Result<(), StorageError>;
}

/// Repository contract for learner profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create or update the identity fields of a profile, keyed by learner id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failure.
    async fn upsert_identity(&self, identity: &IdentityRecord) -> Result<(), StorageError>;

    /// Fetch a full profile document.
    ///
    /// Returns `Ok(None)` when no profile exists for the learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failure.
    async fn get_profile(&self, id: &LearnerId) -> Result<Option<UserProfile>, StorageError>;

    /// Record a course completion as an upsert keyed by learner id.
    ///
    /// Creates a bare profile when absent, adds the course to the enrollment
    /// set if missing, and appends a completion record stamped `completed_at`.
    /// The write never fails with NotFound.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failure; nothing partial is kept for
    /// a failed write.
    async fn record_completion(
        &self,
        learner: &LearnerId,
        course: &CourseId,
        score: Score,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionWrite, StorageError>;
}

/// Repository contract for assignments.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Persist a new assignment and return its storage id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failure.
    async fn insert_assignment(&self, assignment: &Assignment)
        -> Result<AssignmentId, StorageError>;

    /// List assignments newest-first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failure.
    async fn list_assignments(&self, limit: u32) -> Result<Vec<AssignmentRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<Vec<Course>>>,
    profiles: Arc<Mutex<HashMap<LearnerId, UserProfile>>>,
    assignments: Arc<Mutex<Vec<AssignmentRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn insert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self.courses.lock().map_err(lock_err)?;
        if guard.iter().any(|c| c.id() == course.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(course.clone());
        Ok(())
    }

    async fn update_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self.courses.lock().map_err(lock_err)?;
        let slot = guard
            .iter_mut()
            .find(|c| c.id() == course.id())
            .ok_or(StorageError::NotFound)?;
        *slot = course.clone();
        Ok(())
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self.courses.lock().map_err(lock_err)?;
        Ok(guard.iter().find(|c| c.id() == id).cloned())
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let guard = self.courses.lock().map_err(lock_err)?;
        Ok(guard.iter().take(limit as usize).cloned().collect())
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), StorageError> {
        let mut guard = self.courses.lock().map_err(lock_err)?;
        let before = guard.len();
        guard.retain(|c| c.id() != id);
        if guard.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn upsert_identity(&self, identity: &IdentityRecord) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(lock_err)?;
        let profile = guard
            .entry(identity.learner_id.clone())
            .or_insert_with(|| UserProfile::new(identity.learner_id.clone()));
        profile.set_identity(
            identity.full_name.clone(),
            identity.email.clone(),
            identity.image_url.clone(),
        );
        Ok(())
    }

    async fn get_profile(&self, id: &LearnerId) -> Result<Option<UserProfile>, StorageError> {
        let guard = self.profiles.lock().map_err(lock_err)?;
        Ok(guard.get(id).cloned())
    }

    async fn record_completion(
        &self,
        learner: &LearnerId,
        course: &CourseId,
        score: Score,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionWrite, StorageError> {
        let mut guard = self.profiles.lock().map_err(lock_err)?;
        let existed = guard.contains_key(learner);
        let profile = guard
            .entry(learner.clone())
            .or_insert_with(|| UserProfile::new(learner.clone()));
        profile.record_completion(course.clone(), score, completed_at);
        Ok(CompletionWrite {
            updated: existed,
            upserted: !existed,
        })
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRepository {
    async fn insert_assignment(
        &self,
        assignment: &Assignment,
    ) -> Result<AssignmentId, StorageError> {
        let mut guard = self.assignments.lock().map_err(lock_err)?;
        let id = guard.len() as AssignmentId + 1;
        guard.push(AssignmentRow {
            id,
            assignment: assignment.clone(),
        });
        Ok(id)
    }

    async fn list_assignments(&self, limit: u32) -> Result<Vec<AssignmentRow>, StorageError> {
        let guard = self.assignments.lock().map_err(lock_err)?;
        let mut rows: Vec<AssignmentRow> = guard.clone();
        rows.sort_by(|a, b| {
            b.assignment
                .created_at()
                .cmp(&a.assignment.created_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let assignments: Arc<dyn AssignmentRepository> = Arc::new(repo);
        Self {
            courses,
            profiles,
            assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edu_core::model::{Module, Question, Quiz};
    use edu_core::time::fixed_now;

    fn course_id(label: u8) -> CourseId {
        format!("{label:024x}").parse().unwrap()
    }

    fn build_course(label: u8) -> Course {
        let question = Question::new("Q?", vec!["A".into(), "B".into()], 0).unwrap();
        let module = Module::new(
            "Module 1",
            "content",
            None,
            Some(Quiz::new(vec![question], None)),
        )
        .unwrap();
        Course::new(
            course_id(label),
            format!("Course {label}"),
            "desc",
            "Math",
            "Prof",
            vec![module],
            fixed_now(),
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_content() {
        let repo = InMemoryRepository::new();
        let course = build_course(1);
        repo.insert_course(&course).await.unwrap();

        let fetched = repo.get_course(course.id()).await.unwrap().unwrap();
        assert_eq!(fetched, course);
        assert!(fetched.module(0).unwrap().quiz().is_some());
    }

    #[tokio::test]
    async fn insert_duplicate_id_conflicts() {
        let repo = InMemoryRepository::new();
        let course = build_course(1);
        repo.insert_course(&course).await.unwrap();
        let err = repo.insert_course(&course).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn update_missing_course_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.update_course(&build_course(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn completion_upsert_creates_then_updates() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("u1").unwrap();
        let now = fixed_now();

        let first = repo
            .record_completion(&learner, &course_id(1), Score::new(90).unwrap(), now)
            .await
            .unwrap();
        assert_eq!(
            first,
            CompletionWrite {
                updated: false,
                upserted: true
            }
        );

        let second = repo
            .record_completion(&learner, &course_id(1), Score::new(95).unwrap(), now)
            .await
            .unwrap();
        assert_eq!(
            second,
            CompletionWrite {
                updated: true,
                upserted: false
            }
        );

        let profile = repo.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.enrolled_courses().len(), 1);
        assert_eq!(profile.completed_courses().len(), 2);
    }

    #[tokio::test]
    async fn tied_completions_read_latest_write_first() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("u1").unwrap();
        let now = fixed_now();

        repo.record_completion(&learner, &course_id(1), Score::new(60).unwrap(), now)
            .await
            .unwrap();
        repo.record_completion(&learner, &course_id(2), Score::new(90).unwrap(), now)
            .await
            .unwrap();

        // Same order a persisted read yields for equal timestamps.
        let profile = repo.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.completed_courses()[0].course_id, course_id(2));
        assert_eq!(profile.completed_courses()[1].course_id, course_id(1));
    }

    #[tokio::test]
    async fn identity_upsert_preserves_history() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("u1").unwrap();
        repo.record_completion(&learner, &course_id(1), Score::new(80).unwrap(), fixed_now())
            .await
            .unwrap();

        repo.upsert_identity(&IdentityRecord {
            learner_id: learner.clone(),
            full_name: Some("Rabin Bhandari".into()),
            email: Some("rabin@example.com".into()),
            image_url: None,
        })
        .await
        .unwrap();

        let profile = repo.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.full_name(), Some("Rabin Bhandari"));
        assert_eq!(profile.completed_courses().len(), 1);
    }
}
