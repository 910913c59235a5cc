use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use edu_core::model::{CourseId, Score};
use edu_core::scoring::{AnswerSheet, course_score, module_score};
use storage::repository::CourseRepository;

use crate::error::QuizServiceError;

/// One graded quiz attempt as posted by the reader.
///
/// Answers are a flat mapping from question index to chosen option index;
/// the same mapping is used for both the module and the course-wide score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub course_id: String,
    pub module_index: usize,
    pub answers: HashMap<usize, usize>,
}

/// Scores returned for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub module_score: Score,
    pub course_score: Score,
}

/// Grades quiz submissions against the stored course content.
#[derive(Clone)]
pub struct QuizService {
    courses: Arc<dyn CourseRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// Grade a submission.
    ///
    /// A module without a quiz grades to 0 rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::InvalidCourseId` for a malformed course
    /// reference, `CourseNotFound` when the course does not exist,
    /// `ModuleOutOfRange` for a bad module index, and `Storage` if repository
    /// access fails.
    pub async fn submit(&self, submission: QuizSubmission) -> Result<QuizResult, QuizServiceError> {
        let course_id: CourseId = submission
            .course_id
            .parse()
            .map_err(|_| QuizServiceError::InvalidCourseId)?;

        let course = self
            .courses
            .get_course(&course_id)
            .await?
            .ok_or(QuizServiceError::CourseNotFound)?;

        let module = course
            .module(submission.module_index)
            .ok_or(QuizServiceError::ModuleOutOfRange {
                index: submission.module_index,
                modules: course.modules().len(),
            })?;

        let answers: AnswerSheet = submission.answers.into_iter().collect();
        let questions = module.quiz().map_or(&[][..], |quiz| quiz.questions());

        Ok(QuizResult {
            module_score: module_score(questions, &answers),
            course_score: course_score(course.modules(), &answers),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    use edu_core::model::{Course, Module, Question, Quiz};
    use edu_core::time::fixed_now;
    use storage::repository::{CourseRepository as _, InMemoryRepository};

    fn quizzed_module(correct_answers: &[usize]) -> Module {
        let questions = correct_answers
            .iter()
            .map(|&c| {
                Question::new("Which?", vec!["A".into(), "B".into(), "C".into()], c).unwrap()
            })
            .collect();
        Module::new("M", "text", None, Some(Quiz::new(questions, None))).unwrap()
    }

    async fn seeded_service(modules: Vec<Module>) -> (QuizService, CourseId) {
        let repo = InMemoryRepository::new();
        let course = Course::new(
            CourseId::generate(),
            "Course",
            "desc",
            "Math",
            "Prof",
            modules,
            fixed_now(),
            fixed_now(),
        )
        .unwrap();
        repo.insert_course(&course).await.unwrap();
        let id = course.id().clone();
        (QuizService::new(Arc::new(repo)), id)
    }

    #[tokio::test]
    async fn submit_scores_module_and_course() {
        // Quiz A key [0, 0], quiz B key [0, 1]; sheet {0: 0, 1: 1}.
        let (service, id) =
            seeded_service(vec![quizzed_module(&[0, 0]), quizzed_module(&[0, 1])]).await;

        let result = service
            .submit(QuizSubmission {
                course_id: id.as_str().into(),
                module_index: 0,
                answers: [(0, 0), (1, 1)].into_iter().collect(),
            })
            .await
            .unwrap();

        assert_eq!(result.module_score.value(), 50);
        assert_eq!(result.course_score.value(), 75);
    }

    #[tokio::test]
    async fn module_without_quiz_scores_zero() {
        let plain = Module::new("Reading", "text", None, None).unwrap();
        let (service, id) = seeded_service(vec![plain, quizzed_module(&[1])]).await;

        let result = service
            .submit(QuizSubmission {
                course_id: id.as_str().into(),
                module_index: 0,
                answers: [(0, 1)].into_iter().collect(),
            })
            .await
            .unwrap();

        assert_eq!(result.module_score, Score::ZERO);
        assert_eq!(result.course_score.value(), 100);
    }

    #[tokio::test]
    async fn out_of_range_module_is_rejected() {
        let (service, id) = seeded_service(vec![quizzed_module(&[0])]).await;

        let err = service
            .submit(QuizSubmission {
                course_id: id.as_str().into(),
                module_index: 3,
                answers: HashMap::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            QuizServiceError::ModuleOutOfRange { index: 3, modules: 1 }
        ));
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let (service, _) = seeded_service(vec![quizzed_module(&[0])]).await;

        let err = service
            .submit(QuizSubmission {
                course_id: CourseId::generate().as_str().into(),
                module_index: 0,
                answers: HashMap::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, QuizServiceError::CourseNotFound));
    }

    #[tokio::test]
    async fn malformed_course_id_is_rejected_before_storage() {
        let (service, _) = seeded_service(vec![]).await;

        let err = service
            .submit(QuizSubmission {
                course_id: "not-hex".into(),
                module_index: 0,
                answers: HashMap::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, QuizServiceError::InvalidCourseId));
    }

    #[test]
    fn result_contract_uses_camel_case() {
        let result = QuizResult {
            module_score: Score::FULL,
            course_score: Score::ZERO,
        };
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["moduleScore"], 100);
        assert_eq!(json["courseScore"], 0);
    }
}
