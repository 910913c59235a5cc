use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::CourseId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("module title cannot be empty")]
    EmptyModuleTitle,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least {min} options, got {got}")]
    TooFewOptions { min: usize, got: usize },

    #[error("correct answer index {index} is out of bounds for {options} options")]
    CorrectAnswerOutOfBounds { index: usize, options: usize },
}

/// Minimum number of options a quiz question must offer.
pub const MIN_QUESTION_OPTIONS: usize = 2;

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// One multiple-choice question inside a module quiz.
///
/// The correct answer is identified by index into the option list; comparison
/// against a learner's choice is exact index equality, no partial credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_answer: usize,
}

impl Question {
    /// Creates a new question.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyPrompt` for a blank prompt,
    /// `CourseError::TooFewOptions` when fewer than two options are supplied,
    /// and `CourseError::CorrectAnswerOutOfBounds` when the answer index does
    /// not point into the option list.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
    ) -> Result<Self, CourseError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(CourseError::EmptyPrompt);
        }
        if options.len() < MIN_QUESTION_OPTIONS {
            return Err(CourseError::TooFewOptions {
                min: MIN_QUESTION_OPTIONS,
                got: options.len(),
            });
        }
        if correct_answer >= options.len() {
            return Err(CourseError::CorrectAnswerOutOfBounds {
                index: correct_answer,
                options: options.len(),
            });
        }

        Ok(Self {
            prompt: prompt.trim().to_owned(),
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    /// True when the chosen option index matches the answer key exactly.
    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_answer
    }
}

/// An ordered set of questions attached to a module.
///
/// A quiz with zero questions is legal; scoring defines it as 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Quiz {
    questions: Vec<Question>,
    video_url: Option<Url>,
}

impl Quiz {
    #[must_use]
    pub fn new(questions: Vec<Question>, video_url: Option<Url>) -> Self {
        Self {
            questions,
            video_url,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// One unit of course content: text plus optional video and quiz.
///
/// Modules belong to exactly one course; their position in the course's
/// module list defines the learning sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    title: String,
    content: String,
    video_url: Option<Url>,
    quiz: Option<Quiz>,
}

impl Module {
    /// Creates a new module.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyModuleTitle` if the title is blank.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        video_url: Option<Url>,
        quiz: Option<Quiz>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyModuleTitle);
        }

        Ok(Self {
            title: title.trim().to_owned(),
            content: content.into(),
            video_url,
            quiz,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content split on newlines, the unit the reader renders.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A published course: catalog metadata plus its ordered modules.
///
/// Immutable once built; edits construct a new value preserving `created_at`
/// and stamping a fresh `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    subject: String,
    professor: String,
    modules: Vec<Module>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Course {
    /// Creates a new course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: impl Into<String>,
        subject: impl Into<String>,
        professor: impl Into<String>,
        modules: Vec<Module>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: description.into(),
            subject: subject.into(),
            professor: professor.into(),
            modules,
            created_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
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
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn professor(&self) -> &str {
        &self.professor
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Module at the given sequence position, if any.
    #[must_use]
    pub fn module(&self, index: usize) -> Option<&Module> {
        self.modules.get(index)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn question(correct: usize) -> Question {
        Question::new(
            "Which?",
            vec!["A".into(), "B".into(), "C".into()],
            correct,
        )
        .unwrap()
    }

    #[test]
    fn question_rejects_single_option() {
        let err = Question::new("Which?", vec!["A".into()], 0).unwrap_err();
        assert_eq!(err, CourseError::TooFewOptions { min: 2, got: 1 });
    }

    #[test]
    fn question_rejects_out_of_bounds_answer() {
        let err = Question::new("Which?", vec!["A".into(), "B".into()], 2).unwrap_err();
        assert_eq!(
            err,
            CourseError::CorrectAnswerOutOfBounds {
                index: 2,
                options: 2
            }
        );
    }

    #[test]
    fn question_rejects_blank_prompt() {
        let err = Question::new("  ", vec!["A".into(), "B".into()], 0).unwrap_err();
        assert_eq!(err, CourseError::EmptyPrompt);
    }

    #[test]
    fn question_correctness_is_exact_index_equality() {
        let q = question(1);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert!(!q.is_correct(2));
    }

    #[test]
    fn module_rejects_blank_title() {
        let err = Module::new("   ", "text", None, None).unwrap_err();
        assert_eq!(err, CourseError::EmptyModuleTitle);
    }

    #[test]
    fn module_paragraphs_split_on_newlines() {
        let module = Module::new("Intro", "first\nsecond\nthird", None, None).unwrap();
        let paragraphs: Vec<&str> = module.paragraphs().collect();
        assert_eq!(paragraphs, vec!["first", "second", "third"]);
    }

    #[test]
    fn course_rejects_blank_title() {
        let err = Course::new(
            CourseId::generate(),
            "  ",
            "",
            "",
            "",
            vec![],
            fixed_now(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, CourseError::EmptyTitle);
    }

    #[test]
    fn course_happy_path_trims_title() {
        let module = Module::new(
            "Basics",
            "p1\np2",
            None,
            Some(Quiz::new(vec![question(0)], None)),
        )
        .unwrap();
        let course = Course::new(
            CourseId::generate(),
            "  Rust 101  ",
            "intro course",
            "Programming",
            "A. Teacher",
            vec![module],
            fixed_now(),
            fixed_now(),
        )
        .unwrap();

        assert_eq!(course.title(), "Rust 101");
        assert_eq!(course.modules().len(), 1);
        assert!(course.module(0).unwrap().quiz().is_some());
        assert!(course.module(1).is_none());
    }
}
