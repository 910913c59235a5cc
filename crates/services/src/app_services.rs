use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::assignment_service::AssignmentService;
use crate::completion_service::CompletionService;
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::progress::ProgressService;
use crate::quiz_service::QuizService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    course_service: Arc<CourseService>,
    quiz_service: Arc<QuizService>,
    completion_service: Arc<CompletionService>,
    profile_service: Arc<ProfileService>,
    progress_service: Arc<ProgressService>,
    assignment_service: Arc<AssignmentService>,
}

impl AppServices {
    /// Wire services over an already-built storage aggregate.
    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock) -> Self {
        let course_service = Arc::new(CourseService::new(clock, Arc::clone(&storage.courses)));
        let quiz_service = Arc::new(QuizService::new(Arc::clone(&storage.courses)));
        let completion_service = Arc::new(CompletionService::new(
            clock,
            Arc::clone(&storage.profiles),
        ));
        let profile_service = Arc::new(ProfileService::new(Arc::clone(&storage.profiles)));
        let progress_service = Arc::new(ProgressService::new(
            Arc::clone(&storage.courses),
            Arc::clone(&storage.profiles),
        ));
        let assignment_service = Arc::new(AssignmentService::new(
            clock,
            Arc::clone(&storage.assignments),
        ));

        Self {
            course_service,
            quiz_service,
            completion_service,
            profile_service,
            progress_service,
            assignment_service,
        }
    }

    /// Build services backed by `SQLite` storage, migrating on open.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, clock))
    }

    #[must_use]
    pub fn course_service(&self) -> Arc<CourseService> {
        Arc::clone(&self.course_service)
    }

    #[must_use]
    pub fn quiz_service(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz_service)
    }

    #[must_use]
    pub fn completion_service(&self) -> Arc<CompletionService> {
        Arc::clone(&self.completion_service)
    }

    #[must_use]
    pub fn profile_service(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile_service)
    }

    #[must_use]
    pub fn progress_service(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress_service)
    }

    #[must_use]
    pub fn assignment_service(&self) -> Arc<AssignmentService> {
        Arc::clone(&self.assignment_service)
    }
}
