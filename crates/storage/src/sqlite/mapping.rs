//! Row-to-domain conversion helpers shared by the `SQLite` repositories.

use edu_core::model::{CourseId, LearnerId, Score};
use url::Url;

use crate::repository::StorageError;

pub(super) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(super) fn course_id_from_str(raw: &str) -> Result<CourseId, StorageError> {
    raw.parse().map_err(ser)
}

pub(super) fn learner_id_from_str(raw: &str) -> Result<LearnerId, StorageError> {
    raw.parse().map_err(ser)
}

pub(super) fn score_from_i64(raw: i64) -> Result<Score, StorageError> {
    let value = u8::try_from(raw).map_err(|_| ser("score out of range"))?;
    Score::new(value).map_err(ser)
}

pub(super) fn url_from_opt(raw: Option<String>) -> Result<Option<Url>, StorageError> {
    raw.map(|s| Url::parse(&s).map_err(ser)).transpose()
}

pub(super) fn options_from_json(raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(super) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(super) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| ser("position overflow"))
}

pub(super) fn position_from_i64(raw: i64) -> Result<usize, StorageError> {
    usize::try_from(raw).map_err(|_| ser("position sign overflow"))
}
