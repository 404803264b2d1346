use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Teacher {
    pub id: i64,
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTeacher {
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateTeacher {
    pub rut: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

impl Teacher {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(
            r#"SELECT * FROM teachers
               WHERE deleted_at IS NULL
               ORDER BY last_name ASC, first_name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(
            r#"SELECT * FROM teachers
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Duplicate pre-check on the canonical formatted identifier.
    pub async fn rut_exists(pool: &SqlitePool, rut: &str) -> Result<bool, sqlx::Error> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"SELECT id FROM teachers WHERE rut = $1 AND deleted_at IS NULL"#,
        )
        .bind(rut)
        .fetch_optional(pool)
        .await?;
        Ok(id.is_some())
    }

    pub async fn create(pool: &SqlitePool, data: &CreateTeacher) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(
            r#"INSERT INTO teachers (rut, first_name, last_name, email)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(&data.rut)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateTeacher,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(
            r#"UPDATE teachers
               SET rut = COALESCE($2, rut),
                   first_name = COALESCE($3, first_name),
                   last_name = COALESCE($4, last_name),
                   email = COALESCE($5, email),
                   active = COALESCE($6, active),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.rut)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE teachers
               SET deleted_at = CURRENT_TIMESTAMP, active = 0, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
