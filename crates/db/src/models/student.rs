use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Enrollment status. A withdrawn student keeps their record but loses the
/// course assignment.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "student_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Graduated,
    Withdrawn,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Student {
    pub id: i64,
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: StudentStatus,
    pub course_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateStudent {
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: Option<StudentStatus>,
    pub course_id: Option<i64>,
}

/// Full replacement of a student record; the identifier is only ever changed
/// through this path.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateStudent {
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: StudentStatus,
    pub course_id: Option<i64>,
}

impl Student {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            r#"SELECT * FROM students
               ORDER BY last_name ASC, first_name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>(r#"SELECT * FROM students WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Roster of one course, the third level of the drill-down.
    pub async fn find_by_course_id(
        pool: &SqlitePool,
        course_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            r#"SELECT * FROM students
               WHERE course_id = $1
               ORDER BY last_name ASC, first_name ASC"#,
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Search across first name, last name and identifier, capped at 50 rows.
    pub async fn search(pool: &SqlitePool, term: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", term.to_lowercase());
        sqlx::query_as::<_, Student>(
            r#"SELECT * FROM students
               WHERE lower(first_name) LIKE $1
                  OR lower(last_name) LIKE $1
                  OR lower(rut) LIKE $1
               ORDER BY last_name ASC
               LIMIT 50"#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await
    }

    /// Duplicate pre-check on the canonical formatted identifier.
    pub async fn rut_exists(pool: &SqlitePool, rut: &str) -> Result<bool, sqlx::Error> {
        let id: Option<i64> = sqlx::query_scalar(r#"SELECT id FROM students WHERE rut = $1"#)
            .bind(rut)
            .fetch_optional(pool)
            .await?;
        Ok(id.is_some())
    }

    /// Inserts a student. A withdrawn status forces a null course assignment
    /// and stamps `deleted_at`.
    pub async fn create(pool: &SqlitePool, data: &CreateStudent) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or_default();
        let course_id = match status {
            StudentStatus::Withdrawn => None,
            _ => data.course_id,
        };
        sqlx::query_as::<_, Student>(
            r#"INSERT INTO students
                   (rut, first_name, last_name, birth_date, gender, address, phone, email,
                    status, course_id, deleted_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                       CASE WHEN $9 = 'withdrawn' THEN CURRENT_TIMESTAMP END)
               RETURNING *"#,
        )
        .bind(&data.rut)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.birth_date)
        .bind(&data.gender)
        .bind(&data.address)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(status)
        .bind(course_id)
        .fetch_one(pool)
        .await
    }

    /// Full-record replacement. Moving to withdrawn clears the course and
    /// stamps `deleted_at`; moving out of withdrawn clears the stamp.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateStudent,
    ) -> Result<Option<Self>, sqlx::Error> {
        let course_id = match data.status {
            StudentStatus::Withdrawn => None,
            _ => data.course_id,
        };
        sqlx::query_as::<_, Student>(
            r#"UPDATE students
               SET rut = $2,
                   first_name = $3,
                   last_name = $4,
                   birth_date = $5,
                   gender = $6,
                   address = $7,
                   phone = $8,
                   email = $9,
                   status = $10,
                   course_id = $11,
                   deleted_at = CASE
                       WHEN $10 = 'withdrawn' THEN COALESCE(deleted_at, CURRENT_TIMESTAMP)
                   END,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.rut)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.birth_date)
        .bind(&data.gender)
        .bind(&data.address)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(data.status)
        .bind(course_id)
        .fetch_optional(pool)
        .await
    }

    /// Soft delete: the record becomes withdrawn and unassigned.
    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE students
               SET status = 'withdrawn',
                   course_id = NULL,
                   deleted_at = CURRENT_TIMESTAMP,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
