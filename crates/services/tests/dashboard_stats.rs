//! Dashboard aggregation wired to the real statistics tables.

use std::sync::Arc;

use chrono::NaiveDate;
use db::{
    DBService,
    models::{
        school::{CreateSchool, School},
        stats::{AcademicStat, AttendanceStat, EnrollmentStat},
    },
};
use services::services::{
    dashboard::{DashboardFilter, DashboardService},
    repository::SqliteRepository,
};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

async fn seed(db: &DBService) {
    // Establishment 1, referenced by the scoped stat rows below.
    School::create(
        &db.pool,
        &CreateSchool {
            name: "Colegio Norte".to_string(),
            address: None,
            city: None,
            phone: None,
            email: None,
            website: None,
            director_name: None,
        },
    )
    .await
    .unwrap();

    // Whole-network rows plus rows scoped to establishment 1.
    EnrollmentStat::create(&db.pool, None, None, "2023-03", 1200, 40, 30)
        .await
        .unwrap();
    EnrollmentStat::create(&db.pool, None, None, "2023-06", 1190, 12, 24)
        .await
        .unwrap();
    EnrollmentStat::create(&db.pool, Some(1), None, "2023-06", 400, 5, 4)
        .await
        .unwrap();
    EnrollmentStat::create(&db.pool, None, None, "2022-11", 1150, 8, 20)
        .await
        .unwrap();

    AttendanceStat::create(&db.pool, None, None, day(2023, 3, 6), 1100, 80, 20, 91.67)
        .await
        .unwrap();
    AttendanceStat::create(&db.pool, None, None, day(2023, 3, 7), 1120, 60, 20, 93.33)
        .await
        .unwrap();
    AttendanceStat::create(&db.pool, Some(1), None, day(2023, 3, 6), 380, 15, 5, 95.0)
        .await
        .unwrap();

    AcademicStat::create(
        &db.pool,
        None,
        None,
        2022,
        [260.0, 250.0, 265.0, 610.0, 449.0, 419.0, 436.0],
    )
    .await
    .unwrap();
    AcademicStat::create(
        &db.pool,
        None,
        None,
        2023,
        [265.0, 258.0, 270.0, 625.0, 452.0, 423.0, 444.0],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn aggregates_recompute_per_scope_from_stored_rows() {
    let db = DBService::new_in_memory().await.unwrap();
    seed(&db).await;

    let service = DashboardService::new(Arc::new(SqliteRepository::new(db)));

    let default = service.default_filter().await.unwrap();
    assert_eq!(default.year, 2023);

    let network = service.load(&default).await.unwrap();
    // Latest month of the year wins.
    assert_eq!(network.enrollment.total_students, 1190);
    // (91.67 + 93.33) / 2 = 92.50
    assert_eq!(network.attendance.average_attendance_rate, 92.5);
    // 24 / 1190 * 100 = 2.0168... -> 2.02
    assert_eq!(network.attendance.dropout_rate, 2.02);
    assert_eq!(network.academic.simce_language, 265.0);
    assert_eq!(network.years, vec![2023, 2022]);

    let trend_years: Vec<i32> = network.academic.simce_trend.iter().map(|p| p.year).collect();
    assert_eq!(trend_years, vec![2022, 2023]);

    // Restricting the establishment replaces every aggregate with the scoped
    // rows; nothing from the network snapshot bleeds through.
    let scoped = service
        .load(&DashboardFilter {
            year: 2023,
            school_id: Some(1),
            level: None,
        })
        .await
        .unwrap();
    assert_eq!(scoped.enrollment.total_students, 400);
    assert_eq!(scoped.attendance.average_attendance_rate, 95.0);
    // No academic rows recorded for this establishment: zero-valued defaults.
    assert_eq!(scoped.academic.simce_language, 0.0);
    assert!(scoped.academic.simce_trend.is_empty());
}
