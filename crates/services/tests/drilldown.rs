//! Drill-down coordinator wired to the real SQLite repository.

use std::sync::Arc;

use chrono::NaiveDate;
use db::{
    DBService,
    models::{
        course::{Course, CreateCourse},
        school::{CreateSchool, School},
        student::{CreateStudent, Student},
    },
};
use services::services::{repository::SqliteRepository, selection::SelectionCoordinator};

async fn seed(db: &DBService) -> (School, Course) {
    let school = School::create(
        &db.pool,
        &CreateSchool {
            name: "Colegio Norte".to_string(),
            address: None,
            city: Some("Santiago".to_string()),
            phone: None,
            email: None,
            website: None,
            director_name: None,
        },
    )
    .await
    .unwrap();

    let course = Course::create(
        &db.pool,
        &CreateCourse {
            name: "1°".to_string(),
            year: 2024,
            level: "A".to_string(),
            teacher_id: None,
            school_id: school.id,
        },
    )
    .await
    .unwrap();

    for (rut, last_name) in [("12.345.678-5", "Pérez"), ("12.345.679-3", "Soto")] {
        Student::create(
            &db.pool,
            &CreateStudent {
                rut: rut.to_string(),
                first_name: "Ana".to_string(),
                last_name: last_name.to_string(),
                birth_date: NaiveDate::from_ymd_opt(2012, 3, 1).unwrap(),
                gender: "F".to_string(),
                address: None,
                phone: None,
                email: None,
                status: None,
                course_id: Some(course.id),
            },
        )
        .await
        .unwrap();
    }

    (school, course)
}

#[tokio::test]
async fn full_drilldown_over_sqlite() {
    let db = DBService::new_in_memory().await.unwrap();
    let (school, course) = seed(&db).await;

    let coordinator = SelectionCoordinator::new(Arc::new(SqliteRepository::new(db)));

    // One establishment: loading the top level auto-selects it and fetches
    // its courses.
    let state = coordinator.load_establishments().await;
    assert_eq!(state.selected_school.as_ref().map(|s| s.id), Some(school.id));
    assert_eq!(state.courses.len(), 1);
    assert!(state.roster.is_empty());

    let selected = state.courses[0].clone();
    assert_eq!(selected.school_name.as_deref(), Some("Colegio Norte"));

    let state = coordinator.select_course(Some(selected)).await;
    assert_eq!(state.roster.len(), 2);
    assert_eq!(state.roster[0].last_name, "Pérez");
    assert_eq!(state.selected_course.as_ref().map(|c| c.id), Some(course.id));

    // Deselecting the course clears the roster but keeps the school.
    let state = coordinator.select_course(None).await;
    assert!(state.roster.is_empty());
    assert_eq!(state.selected_school.as_ref().map(|s| s.id), Some(school.id));
}
