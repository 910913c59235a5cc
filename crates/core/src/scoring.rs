//! Pure quiz scoring over submitted answers.
//!
//! Scoring is a transformation of provided state only: no clock, no storage.
//! An answer sheet is a sparse mapping from question index to the learner's
//! chosen option index; unanswered questions are simply absent and count as
//! incorrect.

use std::collections::HashMap;

use crate::model::{Module, Question, Score};

/// Sparse answers for one quiz attempt, keyed by question index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: HashMap<usize, usize>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or overwrites) the chosen option for a question.
    pub fn choose(&mut self, question_index: usize, option_index: usize) {
        self.answers.insert(question_index, option_index);
    }

    /// The chosen option for a question, if answered.
    #[must_use]
    pub fn answer(&self, question_index: usize) -> Option<usize> {
        self.answers.get(&question_index).copied()
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl FromIterator<(usize, usize)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

fn correct_count(questions: &[Question], answers: &AnswerSheet) -> usize {
    questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .answer(*index)
                .is_some_and(|choice| question.is_correct(choice))
        })
        .count()
}

/// Score for a single module's question set.
///
/// `round(100 x correct / total)`, half-up; a module with zero questions
/// scores 0 rather than failing on division.
#[must_use]
pub fn module_score(questions: &[Question], answers: &AnswerSheet) -> Score {
    Score::percent(correct_count(questions, answers), questions.len())
}

/// Aggregate score across every quizzed module of a course.
///
/// The same flat answer sheet is checked against each module's question set
/// in turn; the result is `round(100 x totalCorrect / totalQuestions)` over
/// all modules that carry a quiz. Modules without a quiz contribute nothing.
#[must_use]
pub fn course_score(modules: &[Module], answers: &AnswerSheet) -> Score {
    let mut total_correct = 0;
    let mut total_questions = 0;

    for module in modules {
        if let Some(quiz) = module.quiz() {
            total_correct += correct_count(quiz.questions(), answers);
            total_questions += quiz.questions().len();
        }
    }

    Score::percent(total_correct, total_questions)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
