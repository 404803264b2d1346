//! Aggregate statistics rows consumed by the dashboard. Rows are stored per
//! (school, level) scope; a NULL school or level marks the whole-network
//! aggregate row for that period, and a scoped query matches exactly the
//! requested scope.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct EnrollmentStat {
    pub id: i64,
    pub school_id: Option<i64>,
    pub level: Option<String>,
    pub month: String,
    pub total_students: i64,
    pub new_enrollments: i64,
    pub withdrawals: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AttendanceStat {
    pub id: i64,
    pub school_id: Option<i64>,
    pub level: Option<String>,
    pub date: NaiveDate,
    pub present_count: i64,
    pub absent_count: i64,
    pub late_count: i64,
    pub attendance_rate: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AcademicStat {
    pub id: i64,
    pub school_id: Option<i64>,
    pub level: Option<String>,
    pub year: i32,
    pub simce_language: f64,
    pub simce_math: f64,
    pub simce_science: f64,
    pub paes_average: f64,
    pub pisa_reading: f64,
    pub pisa_math: f64,
    pub pisa_science: f64,
    pub created_at: DateTime<Utc>,
}

impl EnrollmentStat {
    /// Monthly rows for one year and scope, ordered by month ascending.
    pub async fn find_for_year(
        pool: &SqlitePool,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentStat>(
            r#"SELECT * FROM enrollment_stats
               WHERE month LIKE $1
                 AND (($2 IS NULL AND school_id IS NULL) OR school_id = $2)
                 AND (($3 IS NULL AND level IS NULL) OR level = $3)
               ORDER BY month ASC"#,
        )
        .bind(format!("{year}-%"))
        .bind(school_id)
        .bind(level)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        school_id: Option<i64>,
        level: Option<&str>,
        month: &str,
        total_students: i64,
        new_enrollments: i64,
        withdrawals: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentStat>(
            r#"INSERT INTO enrollment_stats
                   (school_id, level, month, total_students, new_enrollments, withdrawals)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(school_id)
        .bind(level)
        .bind(month)
        .bind(total_students)
        .bind(new_enrollments)
        .bind(withdrawals)
        .fetch_one(pool)
        .await
    }

    /// Distinct years with any recorded statistics, most recent first.
    pub async fn available_years(pool: &SqlitePool) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar(
            r#"SELECT DISTINCT CAST(substr(month, 1, 4) AS INTEGER) AS y FROM enrollment_stats
               UNION
               SELECT DISTINCT year FROM academic_stats
               ORDER BY 1 DESC"#,
        )
        .fetch_all(pool)
        .await
    }
}

impl AttendanceStat {
    /// Daily rows for one year and scope, ordered by date ascending.
    pub async fn find_for_year(
        pool: &SqlitePool,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceStat>(
            r#"SELECT * FROM attendance_stats
               WHERE date LIKE $1
                 AND (($2 IS NULL AND school_id IS NULL) OR school_id = $2)
                 AND (($3 IS NULL AND level IS NULL) OR level = $3)
               ORDER BY date ASC"#,
        )
        .bind(format!("{year}-%"))
        .bind(school_id)
        .bind(level)
        .fetch_all(pool)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &SqlitePool,
        school_id: Option<i64>,
        level: Option<&str>,
        date: NaiveDate,
        present_count: i64,
        absent_count: i64,
        late_count: i64,
        attendance_rate: f64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AttendanceStat>(
            r#"INSERT INTO attendance_stats
                   (school_id, level, date, present_count, absent_count, late_count,
                    attendance_rate)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(school_id)
        .bind(level)
        .bind(date)
        .bind(present_count)
        .bind(absent_count)
        .bind(late_count)
        .bind(attendance_rate)
        .fetch_one(pool)
        .await
    }
}

impl AcademicStat {
    /// The row for one year and scope, if recorded.
    pub async fn find_for_year(
        pool: &SqlitePool,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AcademicStat>(
            r#"SELECT * FROM academic_stats
               WHERE year = $1
                 AND (($2 IS NULL AND school_id IS NULL) OR school_id = $2)
                 AND (($3 IS NULL AND level IS NULL) OR level = $3)
               LIMIT 1"#,
        )
        .bind(year)
        .bind(school_id)
        .bind(level)
        .fetch_optional(pool)
        .await
    }

    /// Every recorded year for a scope, ordered ascending, for trend charts.
    pub async fn find_trend(
        pool: &SqlitePool,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AcademicStat>(
            r#"SELECT * FROM academic_stats
               WHERE (($1 IS NULL AND school_id IS NULL) OR school_id = $1)
                 AND (($2 IS NULL AND level IS NULL) OR level = $2)
               ORDER BY year ASC"#,
        )
        .bind(school_id)
        .bind(level)
        .fetch_all(pool)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &SqlitePool,
        school_id: Option<i64>,
        level: Option<&str>,
        year: i32,
        scores: [f64; 7],
    ) -> Result<Self, sqlx::Error> {
        let [simce_language, simce_math, simce_science, paes_average, pisa_reading, pisa_math, pisa_science] =
            scores;
        sqlx::query_as::<_, AcademicStat>(
            r#"INSERT INTO academic_stats
                   (school_id, level, year, simce_language, simce_math, simce_science,
                    paes_average, pisa_reading, pisa_math, pisa_science)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING *"#,
        )
        .bind(school_id)
        .bind(level)
        .bind(year)
        .bind(simce_language)
        .bind(simce_math)
        .bind(simce_science)
        .bind(paes_average)
        .bind(pisa_reading)
        .bind(pisa_math)
        .bind(pisa_science)
        .fetch_one(pool)
        .await
    }
}
