use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display)]
#[sqlx(type_name = "activity_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    View,
}

/// Module the action happened in.
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display)]
#[sqlx(type_name = "activity_module", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityModule {
    Schools,
    Teachers,
    Courses,
    Students,
    Subjects,
    Grades,
    Attendance,
    System,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "activity_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivitySeverity {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ActivityLog {
    pub id: i64,
    pub user_name: Option<String>,
    pub action: ActivityAction,
    pub module: ActivityModule,
    pub description: String,
    pub severity: ActivitySeverity,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub async fn create(
        pool: &SqlitePool,
        user_name: Option<&str>,
        action: ActivityAction,
        module: ActivityModule,
        description: &str,
        severity: ActivitySeverity,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"INSERT INTO activity_logs (user_name, action, module, description, severity)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(user_name)
        .bind(action)
        .bind(module)
        .bind(description)
        .bind(severity)
        .fetch_one(pool)
        .await
    }

    pub async fn find_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"SELECT * FROM activity_logs
               ORDER BY created_at DESC, id DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_module(
        pool: &SqlitePool,
        module: ActivityModule,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"SELECT * FROM activity_logs
               WHERE module = $1
               ORDER BY created_at DESC, id DESC
               LIMIT $2"#,
        )
        .bind(module)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
