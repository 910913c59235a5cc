use edu_core::model::{Assignment, AssignmentStatus};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{course_id_from_str, ser};
use crate::repository::{AssignmentId, AssignmentRepository, AssignmentRow, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl AssignmentRepository for SqliteRepository {
    async fn insert_assignment(
        &self,
        assignment: &Assignment,
    ) -> Result<AssignmentId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO assignments (course_id, title, description, due_date, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(assignment.course_id().as_str())
        .bind(assignment.title())
        .bind(assignment.description())
        .bind(assignment.due_date())
        .bind(assignment.status().as_str())
        .bind(assignment.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn list_assignments(&self, limit: u32) -> Result<Vec<AssignmentRow>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, title, description, due_date, status, created_at
            FROM assignments
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut assignments = Vec::with_capacity(rows.len());
        for row in rows {
            let status_raw: String = row.try_get("status").map_err(ser)?;
            let status = AssignmentStatus::parse(&status_raw)
                .ok_or_else(|| StorageError::Serialization(format!("bad status: {status_raw}")))?;

            let assignment = Assignment::from_persisted(
                course_id_from_str(&row.try_get::<String, _>("course_id").map_err(ser)?)?,
                row.try_get("title").map_err(ser)?,
                row.try_get("description").map_err(ser)?,
                row.try_get("due_date").map_err(ser)?,
                status,
                row.try_get("created_at").map_err(ser)?,
            );
            assignments.push(AssignmentRow {
                id: row.try_get("id").map_err(ser)?,
                assignment,
            });
        }
        Ok(assignments)
    }
}
