use edu_core::model::{Course, CourseId, Module, Question, Quiz};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use sqlx::{Sqlite, Transaction};
use url::Url;

use super::SqliteRepository;
use super::mapping::{
    options_from_json, options_to_json, position_from_i64, position_to_i64, ser, url_from_opt,
};
use crate::repository::{CourseRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn insert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
            INSERT INTO courses (id, title, description, subject, professor, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(course.id().as_str())
        .bind(course.title())
        .bind(course.description())
        .bind(course.subject())
        .bind(course.professor())
        .bind(course.created_at())
        .bind(course.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        insert_content(&mut tx, course).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn update_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
            UPDATE courses
            SET title = ?2, description = ?3, subject = ?4, professor = ?5, updated_at = ?6
            WHERE id = ?1
            ",
        )
        .bind(course.id().as_str())
        .bind(course.title())
        .bind(course.description())
        .bind(course.subject())
        .bind(course.professor())
        .bind(course.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        // Replace the content wholesale; question rows go with their modules.
        sqlx::query("DELETE FROM modules WHERE course_id = ?1")
            .bind(course.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        insert_content(&mut tx, course).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, subject, professor, created_at, updated_at
            FROM courses WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match row {
            Some(row) => self.assemble_course(&row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, subject, professor, created_at, updated_at
            FROM courses
            ORDER BY created_at ASC, id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            courses.push(self.assemble_course(&row).await?);
        }
        Ok(courses)
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        // Content rows cascade from the course delete; this mirrors the
        // explicit deleteMany the write path pairs with.
        sqlx::query("DELETE FROM modules WHERE course_id = ?1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}

impl SqliteRepository {
    async fn assemble_course(&self, row: &SqliteRow) -> Result<Course, StorageError> {
        let id: String = row.try_get("id").map_err(ser)?;
        let modules = self.load_modules(&id).await?;

        Course::new(
            super::mapping::course_id_from_str(&id)?,
            row.try_get::<String, _>("title").map_err(ser)?,
            row.try_get::<String, _>("description").map_err(ser)?,
            row.try_get::<String, _>("subject").map_err(ser)?,
            row.try_get::<String, _>("professor").map_err(ser)?,
            modules,
            row.try_get("created_at").map_err(ser)?,
            row.try_get("updated_at").map_err(ser)?,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn load_modules(&self, course_id: &str) -> Result<Vec<Module>, StorageError> {
        let module_rows = sqlx::query(
            r"
            SELECT position, title, content, video_url, has_quiz, quiz_video_url
            FROM modules
            WHERE course_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut modules = Vec::with_capacity(module_rows.len());
        for module_row in module_rows {
            let position: i64 = module_row.try_get("position").map_err(ser)?;
            let has_quiz: i64 = module_row.try_get("has_quiz").map_err(ser)?;

            let quiz = if has_quiz != 0 {
                let questions = self.load_questions(course_id, position).await?;
                let quiz_video =
                    url_from_opt(module_row.try_get("quiz_video_url").map_err(ser)?)?;
                Some(Quiz::new(questions, quiz_video))
            } else {
                None
            };

            let module = Module::new(
                module_row.try_get::<String, _>("title").map_err(ser)?,
                module_row.try_get::<String, _>("content").map_err(ser)?,
                url_from_opt(module_row.try_get("video_url").map_err(ser)?)?,
                quiz,
            )
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
            modules.push(module);
        }
        Ok(modules)
    }

    async fn load_questions(
        &self,
        course_id: &str,
        module_position: i64,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT prompt, options, correct_answer
            FROM questions
            WHERE course_id = ?1 AND module_position = ?2
            ORDER BY position ASC
            ",
        )
        .bind(course_id)
        .bind(module_position)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            let options = options_from_json(&row.try_get::<String, _>("options").map_err(ser)?)?;
            let correct = position_from_i64(row.try_get("correct_answer").map_err(ser)?)?;
            let question = Question::new(
                row.try_get::<String, _>("prompt").map_err(ser)?,
                options,
                correct,
            )
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
            questions.push(question);
        }
        Ok(questions)
    }
}

async fn insert_content(
    tx: &mut Transaction<'_, Sqlite>,
    course: &Course,
) -> Result<(), StorageError> {
    for (position, module) in course.modules().iter().enumerate() {
        let position = position_to_i64(position)?;

        sqlx::query(
            r"
            INSERT INTO modules (course_id, position, title, content, video_url, has_quiz, quiz_video_url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(course.id().as_str())
        .bind(position)
        .bind(module.title())
        .bind(module.content())
        .bind(module.video_url().map(Url::as_str))
        .bind(i64::from(module.quiz().is_some()))
        .bind(module.quiz().and_then(|q| q.video_url()).map(Url::as_str))
        .execute(&mut **tx)
        .await
        .map_err(conn)?;

        if let Some(quiz) = module.quiz() {
            for (q_position, question) in quiz.questions().iter().enumerate() {
                sqlx::query(
                    r"
                    INSERT INTO questions (course_id, module_position, position, prompt, options, correct_answer)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ",
                )
                .bind(course.id().as_str())
                .bind(position)
                .bind(position_to_i64(q_position)?)
                .bind(question.prompt())
                .bind(options_to_json(question.options())?)
                .bind(position_to_i64(question.correct_answer())?)
                .execute(&mut **tx)
                .await
                .map_err(conn)?;
            }
        }
    }
    Ok(())
}
