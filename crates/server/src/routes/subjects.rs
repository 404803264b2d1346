//! Routes for subjects and their course assignments.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    activity_log::{ActivityAction, ActivityModule},
    course::Course,
    subject::{CourseSubject, CreateSubject, Subject, UpdateSubject},
};
use utils::response::ApiResponse;

use super::require_field;
use crate::{AppState, error::ApiError};

pub async fn list_subjects(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Subject>>>, ApiError> {
    let subjects = Subject::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(subjects)))
}

pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Subject>>, ApiError> {
    let subject = Subject::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(subject)))
}

pub async fn create_subject(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<CreateSubject>,
) -> Result<ResponseJson<ApiResponse<Subject>>, ApiError> {
    require_field(&payload.name, "el nombre de la asignatura es obligatorio")?;
    require_field(&payload.code, "el código de la asignatura es obligatorio")?;

    let subject = Subject::create(&state.db.pool, &payload).await?;
    state
        .activity
        .record(
            ActivityAction::Create,
            ActivityModule::Subjects,
            format!("Asignatura '{}' creada", subject.name),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(subject)))
}

pub async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ResponseJson(payload): ResponseJson<UpdateSubject>,
) -> Result<ResponseJson<ApiResponse<Subject>>, ApiError> {
    if let Some(name) = &payload.name {
        require_field(name, "el nombre de la asignatura es obligatorio")?;
    }

    let subject = Subject::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    state
        .activity
        .record(
            ActivityAction::Update,
            ActivityModule::Subjects,
            format!("Asignatura '{}' actualizada", subject.name),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(subject)))
}

pub async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Subject::soft_delete(&state.db.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    state
        .activity
        .record(
            ActivityAction::Delete,
            ActivityModule::Subjects,
            format!("Asignatura {id} eliminada"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn assign_subject_to_course(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(i64, i64)>,
) -> Result<ResponseJson<ApiResponse<CourseSubject>>, ApiError> {
    Subject::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Course::find_by_id(&state.db.pool, course_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let assignment = CourseSubject::assign(&state.db.pool, course_id, id).await?;
    Ok(ResponseJson(ApiResponse::success(assignment)))
}

pub async fn remove_subject_from_course(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(i64, i64)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = CourseSubject::remove(&state.db.pool, course_id, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/subjects",
        Router::new()
            .route("/", get(list_subjects).post(create_subject))
            .route(
                "/{id}",
                get(get_subject).put(update_subject).delete(delete_subject),
            )
            .route(
                "/{id}/courses/{course_id}",
                post(assign_subject_to_course).delete(remove_subject_from_course),
            ),
    )
}
