//! Routes for courses, their rosters and the single-course CSV export.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::{
    activity_log::{ActivityAction, ActivityModule},
    course::{Course, CourseDetail, CreateCourse, UpdateCourse},
    school::School,
    student::Student,
    subject::Subject,
};
use services::services::export::export_course;
use utils::response::ApiResponse;

use super::require_field;
use crate::{AppState, error::ApiError};

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<CourseDetail>>>, ApiError> {
    let courses = Course::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(courses)))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Course>>, ApiError> {
    let course = Course::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(course)))
}

pub async fn create_course(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<CreateCourse>,
) -> Result<ResponseJson<ApiResponse<Course>>, ApiError> {
    require_field(&payload.name, "el nombre del curso es obligatorio")?;
    require_field(&payload.level, "el nivel del curso es obligatorio")?;
    School::find_by_id(&state.db.pool, payload.school_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let course = Course::create(&state.db.pool, &payload).await?;
    state
        .activity
        .record(
            ActivityAction::Create,
            ActivityModule::Courses,
            format!("Curso '{}' creado", course.label()),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(course)))
}

pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ResponseJson(payload): ResponseJson<UpdateCourse>,
) -> Result<ResponseJson<ApiResponse<Course>>, ApiError> {
    if let Some(name) = &payload.name {
        require_field(name, "el nombre del curso es obligatorio")?;
    }

    let course = Course::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    state
        .activity
        .record(
            ActivityAction::Update,
            ActivityModule::Courses,
            format!("Curso '{}' actualizado", course.label()),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(course)))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Course::soft_delete(&state.db.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    state
        .activity
        .record(
            ActivityAction::Delete,
            ActivityModule::Courses,
            format!("Curso {id} eliminado"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Roster scoped to one course, the third level of the drill-down.
pub async fn list_course_students(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Student>>>, ApiError> {
    Course::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let roster = Student::find_by_course_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(roster)))
}

pub async fn list_course_subjects(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<Subject>>>, ApiError> {
    Course::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let subjects = Subject::find_by_course_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(subjects)))
}

/// CSV download of one course roster.
pub async fn export_course_csv(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let course = Course::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let school = School::find_by_id(&state.db.pool, course.school_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let roster = Student::find_by_course_id(&state.db.pool, id).await?;

    let export = export_course(&school.name, &course, &roster)?;
    state
        .activity
        .record(
            ActivityAction::View,
            ActivityModule::Courses,
            format!("Exportación del curso '{}'", course.label()),
        )
        .await;

    let headers = [
        (header::CONTENT_TYPE, export.mime_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.content))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/courses",
        Router::new()
            .route("/", get(list_courses).post(create_course))
            .route(
                "/{id}",
                get(get_course).put(update_course).delete(delete_course),
            )
            .route("/{id}/students", get(list_course_students))
            .route("/{id}/subjects", get(list_course_subjects))
            .route("/{id}/export", get(export_course_csv)),
    )
}
