use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub level: String,
    pub teacher_id: Option<i64>,
    pub school_id: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Course row joined with its teacher and school names for listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CourseDetail {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub level: String,
    pub teacher_id: Option<i64>,
    pub school_id: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub teacher_name: Option<String>,
    pub school_name: Option<String>,
}

impl CourseDetail {
    /// Drops the joined display columns.
    pub fn into_course(self) -> Course {
        Course {
            id: self.id,
            name: self.name,
            year: self.year,
            level: self.level,
            teacher_id: self.teacher_id,
            school_id: self.school_id,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCourse {
    pub name: String,
    pub year: i32,
    pub level: String,
    pub teacher_id: Option<i64>,
    pub school_id: i64,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub level: Option<String>,
    pub teacher_id: Option<i64>,
    pub active: Option<bool>,
}

impl Course {
    /// Display label used by exports and listings, e.g. `1° A (2024)`.
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.name, self.level, self.year)
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<CourseDetail>, sqlx::Error> {
        sqlx::query_as::<_, CourseDetail>(
            r#"SELECT c.*,
                      t.first_name || ' ' || t.last_name AS teacher_name,
                      s.name AS school_name
               FROM courses c
               LEFT JOIN teachers t ON t.id = c.teacher_id
               LEFT JOIN schools s ON s.id = c.school_id
               WHERE c.deleted_at IS NULL
               ORDER BY c.year DESC, c.name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Courses scoped to one establishment, the second level of the
    /// drill-down.
    pub async fn find_by_school_id(
        pool: &SqlitePool,
        school_id: i64,
    ) -> Result<Vec<CourseDetail>, sqlx::Error> {
        sqlx::query_as::<_, CourseDetail>(
            r#"SELECT c.*,
                      t.first_name || ' ' || t.last_name AS teacher_name,
                      s.name AS school_name
               FROM courses c
               LEFT JOIN teachers t ON t.id = c.teacher_id
               LEFT JOIN schools s ON s.id = c.school_id
               WHERE c.school_id = $1 AND c.deleted_at IS NULL
               ORDER BY c.year DESC, c.name ASC"#,
        )
        .bind(school_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"SELECT * FROM courses
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateCourse) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"INSERT INTO courses (name, year, level, teacher_id, school_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(&data.name)
        .bind(data.year)
        .bind(&data.level)
        .bind(data.teacher_id)
        .bind(data.school_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateCourse,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Course>(
            r#"UPDATE courses
               SET name = COALESCE($2, name),
                   year = COALESCE($3, year),
                   level = COALESCE($4, level),
                   teacher_id = COALESCE($5, teacher_id),
                   active = COALESCE($6, active),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.year)
        .bind(&data.level)
        .bind(data.teacher_id)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE courses
               SET deleted_at = CURRENT_TIMESTAMP, active = 0, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
