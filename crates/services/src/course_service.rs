use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use edu_core::Clock;
use edu_core::model::{Course, CourseId, Module, Question, Quiz};
use storage::repository::CourseRepository;

use crate::error::CourseServiceError;

//
// ─── REQUEST CONTRACTS ─────────────────────────────────────────────────────────
//

/// One question as submitted by the authoring form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuiz {
    pub questions: Vec<NewQuestion>,
    pub video_url: Option<Url>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModule {
    pub title: String,
    pub content: String,
    pub video_url: Option<Url>,
    pub quiz: Option<NewQuiz>,
}

/// Payload for creating a course with its full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub professor: String,
    pub modules: Vec<NewModule>,
}

/// Payload for editing a course. `modules: None` keeps the stored content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub professor: String,
    pub modules: Option<Vec<NewModule>>,
}

fn build_modules(requested: Vec<NewModule>) -> Result<Vec<Module>, CourseServiceError> {
    let mut modules = Vec::with_capacity(requested.len());
    for module in requested {
        let quiz = match module.quiz {
            Some(quiz) => {
                let mut questions = Vec::with_capacity(quiz.questions.len());
                for question in quiz.questions {
                    questions.push(Question::new(
                        question.prompt,
                        question.options,
                        question.correct_answer,
                    )?);
                }
                Some(Quiz::new(questions, quiz.video_url))
            }
            None => None,
        };
        modules.push(Module::new(
            module.title,
            module.content,
            module.video_url,
            quiz,
        )?);
    }
    Ok(modules)
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Orchestrates course authoring and catalog reads.
#[derive(Clone)]
pub struct CourseService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(clock: Clock, courses: Arc<dyn CourseRepository>) -> Self {
        Self { clock, courses }
    }

    /// Validate a new course and persist it with its content in one write.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Course` for validation failures.
    /// Returns `CourseServiceError::Storage` if persistence fails; nothing is
    /// kept in that case.
    pub async fn create_course(&self, request: NewCourse) -> Result<CourseId, CourseServiceError> {
        let now = self.clock.now();
        let course = Course::new(
            CourseId::generate(),
            request.title,
            request.description,
            request.subject,
            request.professor,
            build_modules(request.modules)?,
            now,
            now,
        )?;
        self.courses.insert_course(&course).await?;
        Ok(course.id().clone())
    }

    /// Replace a course's metadata and, when supplied, its content.
    ///
    /// `created_at` is preserved; `updated_at` is stamped with the clock's
    /// now. Metadata and content go through a single storage write.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` with `StorageError::NotFound`
    /// when the course does not exist, and `CourseServiceError::Course` if
    /// validation fails.
    pub async fn update_course(
        &self,
        id: &CourseId,
        update: CourseUpdate,
    ) -> Result<(), CourseServiceError> {
        let existing = self
            .courses
            .get_course(id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        let modules = match update.modules {
            Some(requested) => build_modules(requested)?,
            None => existing.modules().to_vec(),
        };

        let course = Course::new(
            id.clone(),
            update.title,
            update.description,
            update.subject,
            update.professor,
            modules,
            existing.created_at(),
            self.clock.now(),
        )?;
        self.courses.update_course(&course).await?;
        Ok(())
    }

    /// Delete a course and all of its content.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` with `StorageError::NotFound`
    /// when the course does not exist.
    pub async fn delete_course(&self, id: &CourseId) -> Result<(), CourseServiceError> {
        self.courses.delete_course(id).await?;
        Ok(())
    }

    /// Fetch a course by id.
    ///
    /// Returns `Ok(None)` when the course does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, CourseServiceError> {
        let course = self.courses.get_course(id).await?;
        Ok(course)
    }

    /// List courses in creation order, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, CourseServiceError> {
        let courses = self.courses.list_courses(limit).await?;
        Ok(courses)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
