//! Routes for grade records.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    activity_log::{ActivityAction, ActivityModule},
    grade::{CreateGrade, Grade, GradeDetail, UpdateGrade},
    student::Student,
    subject::Subject,
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn list_grades(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<GradeDetail>>>, ApiError> {
    let grades = Grade::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(grades)))
}

pub async fn create_grade(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<CreateGrade>,
) -> Result<ResponseJson<ApiResponse<Grade>>, ApiError> {
    Student::find_by_id(&state.db.pool, payload.student_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Subject::find_by_id(&state.db.pool, payload.subject_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let grade = Grade::create(&state.db.pool, &payload).await?;
    state
        .activity
        .record(
            ActivityAction::Create,
            ActivityModule::Grades,
            format!(
                "Nota {} registrada para el estudiante {}",
                grade.score, grade.student_id
            ),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(grade)))
}

pub async fn update_grade(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ResponseJson(payload): ResponseJson<UpdateGrade>,
) -> Result<ResponseJson<ApiResponse<Grade>>, ApiError> {
    let grade = Grade::update(&state.db.pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    state
        .activity
        .record(
            ActivityAction::Update,
            ActivityModule::Grades,
            format!("Nota {id} actualizada"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(grade)))
}

pub async fn delete_grade(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let affected = Grade::delete(&state.db.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    state
        .activity
        .record(
            ActivityAction::Delete,
            ActivityModule::Grades,
            format!("Nota {id} eliminada"),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/grades",
        Router::new()
            .route("/", get(list_grades).post(create_grade))
            .route("/{id}", axum::routing::put(update_grade).delete(delete_grade)),
    )
}
