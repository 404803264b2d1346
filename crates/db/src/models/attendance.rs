use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Attendance {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub justification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance row joined with student and subject names for listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AttendanceDetail {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub justification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub student_name: String,
    pub subject_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateAttendance {
    pub student_id: i64,
    pub subject_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub justification: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateAttendance {
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub justification: Option<String>,
}

impl Attendance {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<AttendanceDetail>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceDetail>(
            r#"SELECT a.*,
                      st.first_name || ' ' || st.last_name AS student_name,
                      su.name AS subject_name
               FROM attendance a
               JOIN students st ON st.id = a.student_id
               JOIN subjects su ON su.id = a.subject_id
               ORDER BY a.date DESC, a.id DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(r#"SELECT * FROM attendance WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_student_id(
        pool: &SqlitePool,
        student_id: i64,
    ) -> Result<Vec<AttendanceDetail>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceDetail>(
            r#"SELECT a.*,
                      st.first_name || ' ' || st.last_name AS student_name,
                      su.name AS subject_name
               FROM attendance a
               JOIN students st ON st.id = a.student_id
               JOIN subjects su ON su.id = a.subject_id
               WHERE a.student_id = $1
               ORDER BY a.date DESC, a.id DESC"#,
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateAttendance) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            r#"INSERT INTO attendance (student_id, subject_id, date, status, justification)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(data.student_id)
        .bind(data.subject_id)
        .bind(data.date)
        .bind(data.status)
        .bind(&data.justification)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateAttendance,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            r#"UPDATE attendance
               SET date = COALESCE($2, date),
                   status = COALESCE($3, status),
                   justification = COALESCE($4, justification),
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.date)
        .bind(data.status)
        .bind(&data.justification)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM attendance WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
