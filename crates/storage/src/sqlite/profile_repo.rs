use chrono::{DateTime, Utc};
use edu_core::model::{CompletionRecord, CourseId, LearnerId, Score, UserProfile};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{course_id_from_str, learner_id_from_str, score_from_i64, ser};
use crate::repository::{CompletionWrite, IdentityRecord, ProfileRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn upsert_identity(&self, identity: &IdentityRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profiles (learner_id, full_name, email, image_url)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(learner_id) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                image_url = excluded.image_url
            ",
        )
        .bind(identity.learner_id.as_str())
        .bind(identity.full_name.as_deref())
        .bind(identity.email.as_deref())
        .bind(identity.image_url.as_deref())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_profile(&self, id: &LearnerId) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT learner_id, full_name, email, image_url
            FROM profiles WHERE learner_id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let enrollment_rows = sqlx::query(
            r"
            SELECT course_id FROM enrollments
            WHERE learner_id = ?1
            ORDER BY enrolled_at ASC, course_id ASC
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut enrolled = Vec::with_capacity(enrollment_rows.len());
        for enrollment in enrollment_rows {
            enrolled.push(course_id_from_str(
                &enrollment.try_get::<String, _>("course_id").map_err(ser)?,
            )?);
        }

        let completion_rows = sqlx::query(
            r"
            SELECT course_id, completed_at, score FROM completions
            WHERE learner_id = ?1
            ORDER BY completed_at DESC, id DESC
            ",
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut completions = Vec::with_capacity(completion_rows.len());
        for completion in completion_rows {
            completions.push(CompletionRecord {
                course_id: course_id_from_str(
                    &completion.try_get::<String, _>("course_id").map_err(ser)?,
                )?,
                completed_at: completion.try_get("completed_at").map_err(ser)?,
                score: score_from_i64(completion.try_get("score").map_err(ser)?)?,
            });
        }

        Ok(Some(UserProfile::from_persisted(
            learner_id_from_str(&row.try_get::<String, _>("learner_id").map_err(ser)?)?,
            row.try_get("full_name").map_err(ser)?,
            row.try_get("email").map_err(ser)?,
            row.try_get("image_url").map_err(ser)?,
            enrolled,
            completions,
        )))
    }

    async fn record_completion(
        &self,
        learner: &LearnerId,
        course: &CourseId,
        score: Score,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionWrite, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // Upsert keyed by learner id: a missing profile is created bare and
        // filled in by a later identity sync.
        let res = sqlx::query(
            r"
            INSERT INTO profiles (learner_id) VALUES (?1)
            ON CONFLICT(learner_id) DO NOTHING
            ",
        )
        .bind(learner.as_str())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        let upserted = res.rows_affected() > 0;

        // Set semantics on enrollment; repeats are silently absorbed.
        sqlx::query(
            r"
            INSERT INTO enrollments (learner_id, course_id, enrolled_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(learner_id, course_id) DO NOTHING
            ",
        )
        .bind(learner.as_str())
        .bind(course.as_str())
        .bind(completed_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        // History is append-only; reads order it most-recent-first.
        sqlx::query(
            r"
            INSERT INTO completions (learner_id, course_id, completed_at, score)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(learner.as_str())
        .bind(course.as_str())
        .bind(completed_at)
        .bind(i64::from(score.value()))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;

        Ok(CompletionWrite {
            updated: !upserted,
            upserted,
        })
    }
}
