use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub score: f64,
    pub date: NaiveDate,
    pub semester: i32,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Grade joined with student and subject names for listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct GradeDetail {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub score: f64,
    pub date: NaiveDate,
    pub semester: i32,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub student_name: String,
    pub subject_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateGrade {
    pub student_id: i64,
    pub subject_id: i64,
    pub score: f64,
    pub date: NaiveDate,
    pub semester: i32,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateGrade {
    pub score: Option<f64>,
    pub date: Option<NaiveDate>,
    pub semester: Option<i32>,
    pub comments: Option<String>,
}

impl Grade {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<GradeDetail>, sqlx::Error> {
        sqlx::query_as::<_, GradeDetail>(
            r#"SELECT g.*,
                      st.first_name || ' ' || st.last_name AS student_name,
                      su.name AS subject_name
               FROM grades g
               JOIN students st ON st.id = g.student_id
               JOIN subjects su ON su.id = g.subject_id
               ORDER BY g.date DESC, g.id DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Grade>(r#"SELECT * FROM grades WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_student_id(
        pool: &SqlitePool,
        student_id: i64,
    ) -> Result<Vec<GradeDetail>, sqlx::Error> {
        sqlx::query_as::<_, GradeDetail>(
            r#"SELECT g.*,
                      st.first_name || ' ' || st.last_name AS student_name,
                      su.name AS subject_name
               FROM grades g
               JOIN students st ON st.id = g.student_id
               JOIN subjects su ON su.id = g.subject_id
               WHERE g.student_id = $1
               ORDER BY g.date DESC, g.id DESC"#,
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateGrade) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Grade>(
            r#"INSERT INTO grades (student_id, subject_id, score, date, semester, comments)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(data.student_id)
        .bind(data.subject_id)
        .bind(data.score)
        .bind(data.date)
        .bind(data.semester)
        .bind(&data.comments)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateGrade,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Grade>(
            r#"UPDATE grades
               SET score = COALESCE($2, score),
                   date = COALESCE($3, date),
                   semester = COALESCE($4, semester),
                   comments = COALESCE($5, comments),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.score)
        .bind(data.date)
        .bind(data.semester)
        .bind(&data.comments)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM grades WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
