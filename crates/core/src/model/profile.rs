use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::{CourseId, LearnerId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(u16),
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// An integer percentage score, 0 through 100.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Score(u8);

impl Score {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// Creates a score from a raw percentage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::ScoreOutOfRange` for values above 100.
    pub fn new(value: u8) -> Result<Self, ProfileError> {
        if value > 100 {
            return Err(ProfileError::ScoreOutOfRange(u16::from(value)));
        }
        Ok(Self(value))
    }

    /// Percentage of `correct` out of `total`, rounded half-up.
    ///
    /// Zero `total` is defined as a score of 0 rather than a division error.
    #[must_use]
    pub fn percent(correct: usize, total: usize) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let pct = (100 * correct + total / 2) / total;
        debug_assert!(pct <= 100);
        Self(u8::try_from(pct).unwrap_or(100))
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── COMPLETION RECORD ─────────────────────────────────────────────────────────
//

/// A persisted fact that a learner finished a course with a given score.
///
/// The course reference is not checked against the catalog here; a record may
/// outlive its course, and presentation substitutes a placeholder label when
/// the lookup misses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub course_id: CourseId,
    pub completed_at: DateTime<Utc>,
    pub score: Score,
}

//
// ─── USER PROFILE ──────────────────────────────────────────────────────────────
//

/// A learner's stored document: identity fields, enrollment set, and
/// completion history.
///
/// Identity fields are optional because a profile can come into existence
/// through a completion upsert before the learner's first explicit sign-in
/// sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    learner_id: LearnerId,
    full_name: Option<String>,
    email: Option<String>,
    image_url: Option<String>,
    enrolled_courses: Vec<CourseId>,
    completed_courses: Vec<CompletionRecord>,
}

impl UserProfile {
    /// Creates a bare profile with no identity fields or history.
    #[must_use]
    pub fn new(learner_id: LearnerId) -> Self {
        Self {
            learner_id,
            full_name: None,
            email: None,
            image_url: None,
            enrolled_courses: Vec::new(),
            completed_courses: Vec::new(),
        }
    }

    /// Reassembles a profile from persisted parts.
    ///
    /// The completion history is re-sorted most-recent-first so the invariant
    /// holds regardless of storage ordering.
    #[must_use]
    pub fn from_persisted(
        learner_id: LearnerId,
        full_name: Option<String>,
        email: Option<String>,
        image_url: Option<String>,
        enrolled_courses: Vec<CourseId>,
        mut completed_courses: Vec<CompletionRecord>,
    ) -> Self {
        completed_courses.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Self {
            learner_id,
            full_name,
            email,
            image_url,
            enrolled_courses,
            completed_courses,
        }
    }

    /// Overwrites the identity fields with what the identity provider sent.
    pub fn set_identity(
        &mut self,
        full_name: Option<String>,
        email: Option<String>,
        image_url: Option<String>,
    ) {
        self.full_name = full_name;
        self.email = email;
        self.image_url = image_url;
    }

    /// Records a course completion.
    ///
    /// The enrollment set gains the course id if absent (idempotent); the
    /// completion history stays descending by completion time, with the new
    /// record placed ahead of any record sharing its timestamp so the latest
    /// write always reads first. Repeated completions of the same course are
    /// kept.
    pub fn record_completion(&mut self, course_id: CourseId, score: Score, now: DateTime<Utc>) {
        if !self.enrolled_courses.contains(&course_id) {
            self.enrolled_courses.push(course_id.clone());
        }
        let position = self
            .completed_courses
            .iter()
            .position(|existing| existing.completed_at <= now)
            .unwrap_or(self.completed_courses.len());
        self.completed_courses.insert(
            position,
            CompletionRecord {
                course_id,
                completed_at: now,
                score,
            },
        );
    }

    #[must_use]
    pub fn learner_id(&self) -> &LearnerId {
        &self.learner_id
    }

    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Enrollment set in insertion order. Unique; never shrinks.
    #[must_use]
    pub fn enrolled_courses(&self) -> &[CourseId] {
        &self.enrolled_courses
    }

    /// Completion history, most recent first. May contain repeats.
    #[must_use]
    pub fn completed_courses(&self) -> &[CompletionRecord] {
        &self.completed_courses
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
