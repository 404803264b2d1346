use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub teacher_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Junction row assigning a subject to a course.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CourseSubject {
    pub id: i64,
    pub course_id: i64,
    pub subject_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSubject {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateSubject {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub teacher_id: Option<i64>,
}

impl Subject {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"SELECT * FROM subjects
               WHERE deleted_at IS NULL
               ORDER BY name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"SELECT * FROM subjects
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Subjects assigned to a course through the junction table.
    pub async fn find_by_course_id(
        pool: &SqlitePool,
        course_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"SELECT s.* FROM subjects s
               JOIN course_subjects cs ON cs.subject_id = s.id
               WHERE cs.course_id = $1 AND s.deleted_at IS NULL
               ORDER BY s.name ASC"#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateSubject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"INSERT INTO subjects (name, code, description, teacher_id)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(&data.name)
        .bind(&data.code)
        .bind(&data.description)
        .bind(data.teacher_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateSubject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"UPDATE subjects
               SET name = COALESCE($2, name),
                   code = COALESCE($3, code),
                   description = COALESCE($4, description),
                   teacher_id = COALESCE($5, teacher_id),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.code)
        .bind(&data.description)
        .bind(data.teacher_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE subjects
               SET deleted_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

impl CourseSubject {
    pub async fn assign(
        pool: &SqlitePool,
        course_id: i64,
        subject_id: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CourseSubject>(
            r#"INSERT INTO course_subjects (course_id, subject_id)
               VALUES ($1, $2)
               ON CONFLICT (course_id, subject_id) DO UPDATE SET course_id = course_id
               RETURNING *"#,
        )
        .bind(course_id)
        .bind(subject_id)
        .fetch_one(pool)
        .await
    }

    pub async fn remove(
        pool: &SqlitePool,
        course_id: i64,
        subject_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"DELETE FROM course_subjects WHERE course_id = $1 AND subject_id = $2"#,
        )
        .bind(course_id)
        .bind(subject_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
