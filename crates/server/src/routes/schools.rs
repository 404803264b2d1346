//! Routes for establishments, including the all-courses CSV export.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::{
    activity_log::{ActivityAction, ActivityModule},
    course::Course,
    school::{CreateSchool, School, UpdateSchool},
    student::Student,
};
use services::services::export::export_all_courses;
use utils::response::ApiResponse;

use super::require_field;
use crate::{AppState, error::ApiError};

pub async fn list_schools(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<School>>>, ApiError> {
    let schools = School::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(schools)))
}

pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<School>>, ApiError> {
    let school = School::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(school)))
}

pub async fn create_school(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<CreateSchool>,
) -> Result<ResponseJson<ApiResponse<School>>, ApiError> {
    require_field(&payload.name, "el nombre del establecimiento es obligatorio")?;

    let school = School::create(&state.db.pool, &payload).await?;
    state
        .activity
        .record(
            ActivityAction::Create,
            ActivityModule::Schools,
            format!("Establecimiento '{}' creado", school.name),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(school)))
}

pub async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ResponseJson(payload): ResponseJson<UpdateSchool>,
) -> Result<ResponseJson<ApiResponse<School>>, ApiError> {
    if let Some(name) = &payload.name {
        require_field(name, "el nombre del establecimiento es obligatorio")?;
    }

    let school = School::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    state
        .activity
        .record(
            ActivityAction::Update,
            ActivityModule::Schools,
            format!("Establecimiento '{}' actualizado", school.name),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(school)))
}

pub async fn delete_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = School::soft_delete(&state.db.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    state
        .activity
        .record(
            ActivityAction::Delete,
            ActivityModule::Schools,
            format!("Establecimiento {id} eliminado"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// Courses scoped to one establishment, the second level of the drill-down.
pub async fn list_school_courses(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Vec<db::models::course::CourseDetail>>>, ApiError> {
    School::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let courses = Course::find_by_school_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(courses)))
}

/// Single CSV covering every course of the establishment, grouped by a
/// course-identifying column.
pub async fn export_school_csv(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let school = School::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let courses = Course::find_by_school_id(&state.db.pool, id).await?;
    let mut groups = Vec::with_capacity(courses.len());
    for course in courses {
        let roster = Student::find_by_course_id(&state.db.pool, course.id).await?;
        groups.push((course.into_course(), roster));
    }

    let export = export_all_courses(&school.name, &groups)?;
    state
        .activity
        .record(
            ActivityAction::View,
            ActivityModule::Courses,
            format!("Exportación de todos los cursos de '{}'", school.name),
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
        "/schools",
        Router::new()
            .route("/", get(list_schools).post(create_school))
            .route(
                "/{id}",
                get(get_school).put(update_school).delete(delete_school),
            )
            .route("/{id}/courses", get(list_school_courses))
            .route("/{id}/export", get(export_school_csv)),
    )
}
