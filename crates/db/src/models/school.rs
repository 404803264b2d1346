use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

/// An establishment, root of the enrollment hierarchy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub director_name: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSchool {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub director_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateSchool {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub director_name: Option<String>,
    pub active: Option<bool>,
}

impl School {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, School>(
            r#"SELECT * FROM schools
               WHERE deleted_at IS NULL
               ORDER BY name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, School>(
            r#"SELECT * FROM schools
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateSchool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, School>(
            r#"INSERT INTO schools (name, address, city, phone, email, website, director_name)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.website)
        .bind(&data.director_name)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateSchool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, School>(
            r#"UPDATE schools
               SET name = COALESCE($2, name),
                   address = COALESCE($3, address),
                   city = COALESCE($4, city),
                   phone = COALESCE($5, phone),
                   email = COALESCE($6, email),
                   website = COALESCE($7, website),
                   director_name = COALESCE($8, director_name),
                   active = COALESCE($9, active),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.website)
        .bind(&data.director_name)
        .bind(data.active)
        .fetch_optional(pool)
        .await
    }

    /// Soft delete: stamps `deleted_at` and clears the active flag.
    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE schools
               SET deleted_at = CURRENT_TIMESTAMP, active = 0, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
