//! Read-only presentation of a learner's completion history.
//!
//! Everything here joins stored completion records against the course
//! catalog. A record may reference a course that has since been deleted; the
//! join substitutes placeholder labels so partial data still renders.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use edu_core::model::{CourseId, LearnerId, Score, UserProfile};
use storage::repository::{CourseRepository, ProfileRepository};

use crate::error::ProgressError;

/// Label used when a completion's course no longer resolves.
pub const UNNAMED_COURSE: &str = "Unnamed Course";

/// Subject used when a completion's course no longer resolves.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// One completion row joined with catalog metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourse {
    pub course_id: CourseId,
    pub title: String,
    pub subject: String,
    pub score: Score,
    pub completed_at: DateTime<Utc>,
}

/// Mean score per course label, in the order labels first appear in the
/// learner's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAverage {
    pub label: String,
    pub average: f64,
}

/// One point of the score-over-time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub completed_at: DateTime<Utc>,
    pub score: Score,
}

/// Presents completion history, per-course averages, and the score trend.
#[derive(Clone)]
pub struct ProgressService {
    courses: Arc<dyn CourseRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { courses, profiles }
    }

    async fn load_profile(&self, learner: &LearnerId) -> Result<UserProfile, ProgressError> {
        self.profiles
            .get_profile(learner)
            .await?
            .ok_or(ProgressError::UnknownLearner)
    }

    async fn resolve_label(&self, course_id: &CourseId) -> Result<(String, String), ProgressError> {
        Ok(match self.courses.get_course(course_id).await? {
            Some(course) => (course.title().to_owned(), course.subject().to_owned()),
            None => (UNNAMED_COURSE.to_owned(), UNKNOWN_SUBJECT.to_owned()),
        })
    }

    /// Completion history joined with catalog metadata, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownLearner` when no profile exists, and
    /// `Storage` if repository access fails.
    pub async fn completed_courses(
        &self,
        learner: &LearnerId,
    ) -> Result<Vec<CompletedCourse>, ProgressError> {
        let profile = self.load_profile(learner).await?;

        let mut rows = Vec::with_capacity(profile.completed_courses().len());
        for record in profile.completed_courses() {
            let (title, subject) = self.resolve_label(&record.course_id).await?;
            rows.push(CompletedCourse {
                course_id: record.course_id.clone(),
                title,
                subject,
                score: record.score,
                completed_at: record.completed_at,
            });
        }
        Ok(rows)
    }

    /// Mean score per course label.
    ///
    /// Grouping is by resolved label, so every completion of a deleted
    /// course lands in one shared "Unnamed Course" bucket. Labels appear in
    /// the order the history discovers them.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownLearner` when no profile exists, and
    /// `Storage` if repository access fails.
    pub async fn course_averages(
        &self,
        learner: &LearnerId,
    ) -> Result<Vec<CourseAverage>, ProgressError> {
        let profile = self.load_profile(learner).await?;

        let mut labels: Vec<String> = Vec::new();
        let mut sums: Vec<(u64, u64)> = Vec::new();
        for record in profile.completed_courses() {
            let (label, _) = self.resolve_label(&record.course_id).await?;
            let slot = match labels.iter().position(|known| *known == label) {
                Some(index) => index,
                None => {
                    labels.push(label);
                    sums.push((0, 0));
                    sums.len() - 1
                }
            };
            sums[slot].0 += u64::from(record.score.value());
            sums[slot].1 += 1;
        }

        Ok(labels
            .into_iter()
            .zip(sums)
            .map(|(label, (sum, count))| CourseAverage {
                label,
                // count is nonzero for every discovered label
                average: sum as f64 / count as f64,
            })
            .collect())
    }

    /// Score over time, one point per completion record, ascending.
    ///
    /// Repeated completions of the same course each contribute a point.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownLearner` when no profile exists, and
    /// `Storage` if repository access fails.
    pub async fn score_trend(&self, learner: &LearnerId) -> Result<Vec<TrendPoint>, ProgressError> {
        let profile = self.load_profile(learner).await?;

        // History is stored most-recent-first; the chart reads left to right.
        let mut points: Vec<TrendPoint> = profile
            .completed_courses()
            .iter()
            .map(|record| TrendPoint {
                completed_at: record.completed_at,
                score: record.score,
            })
            .collect();
        points.reverse();
        Ok(points)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
