//! Scoped data access behind explicit traits so business logic can be tested
//! against in-memory implementations and a different persistence layer can be
//! substituted without touching callers.

use async_trait::async_trait;
use db::{
    DBService,
    models::{
        course::{Course, CourseDetail},
        school::School,
        stats::{AcademicStat, AttendanceStat, EnrollmentStat},
        student::Student,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fetch-by-scope access to the enrollment hierarchy
/// (establishment -> course -> roster).
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn establishments(&self) -> Result<Vec<School>, RepositoryError>;

    async fn courses_for_establishment(
        &self,
        school_id: i64,
    ) -> Result<Vec<CourseDetail>, RepositoryError>;

    async fn roster_for_course(&self, course_id: i64) -> Result<Vec<Student>, RepositoryError>;
}

/// Scoped access to the statistics tables backing the dashboard.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn enrollment_for_year(
        &self,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<EnrollmentStat>, RepositoryError>;

    async fn attendance_for_year(
        &self,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<AttendanceStat>, RepositoryError>;

    async fn academic_for_year(
        &self,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Option<AcademicStat>, RepositoryError>;

    async fn academic_trend(
        &self,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<AcademicStat>, RepositoryError>;

    async fn available_years(&self) -> Result<Vec<i32>, RepositoryError>;
}

/// SQLite-backed repository over the model layer.
#[derive(Clone)]
pub struct SqliteRepository {
    db: DBService,
}

impl SqliteRepository {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DirectoryRepository for SqliteRepository {
    async fn establishments(&self) -> Result<Vec<School>, RepositoryError> {
        Ok(School::find_all(&self.db.pool).await?)
    }

    async fn courses_for_establishment(
        &self,
        school_id: i64,
    ) -> Result<Vec<CourseDetail>, RepositoryError> {
        Ok(Course::find_by_school_id(&self.db.pool, school_id).await?)
    }

    async fn roster_for_course(&self, course_id: i64) -> Result<Vec<Student>, RepositoryError> {
        Ok(Student::find_by_course_id(&self.db.pool, course_id).await?)
    }
}

#[async_trait]
impl StatsSource for SqliteRepository {
    async fn enrollment_for_year(
        &self,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<EnrollmentStat>, RepositoryError> {
        Ok(EnrollmentStat::find_for_year(&self.db.pool, year, school_id, level).await?)
    }

    async fn attendance_for_year(
        &self,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<AttendanceStat>, RepositoryError> {
        Ok(AttendanceStat::find_for_year(&self.db.pool, year, school_id, level).await?)
    }

    async fn academic_for_year(
        &self,
        year: i32,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Option<AcademicStat>, RepositoryError> {
        Ok(AcademicStat::find_for_year(&self.db.pool, year, school_id, level).await?)
    }

    async fn academic_trend(
        &self,
        school_id: Option<i64>,
        level: Option<&str>,
    ) -> Result<Vec<AcademicStat>, RepositoryError> {
        Ok(AcademicStat::find_trend(&self.db.pool, school_id, level).await?)
    }

    async fn available_years(&self) -> Result<Vec<i32>, RepositoryError> {
        Ok(EnrollmentStat::available_years(&self.db.pool).await?)
    }
}
