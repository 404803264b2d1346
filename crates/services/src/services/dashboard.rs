//! Dashboard filter and KPI aggregation.
//!
//! Every filter change recomputes the full KPI set from the statistics
//! source; nothing is merged with previous results. Missing rows for a
//! requested scope degrade to zero-valued defaults, and every value handed
//! to the presentation layer carries exactly two decimal places.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use ts_rs::TS;

use super::repository::{RepositoryError, StatsSource};

/// Educational stages recognized by the level filter.
pub const LEVELS: [&str; 3] = ["Prebásica", "Básica", "Media"];

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Filter tuple; `None` on a field means no restriction on that dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DashboardFilter {
    pub year: i32,
    pub school_id: Option<i64>,
    pub level: Option<String>,
}

/// One point of a trend series, ordered by period ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct TrendPoint {
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct EnrollmentKpi {
    pub total_students: i64,
    pub new_enrollments: i64,
    pub withdrawals: i64,
    pub pre_basic_rate: f64,
    pub basic_rate: f64,
    pub high_school_rate: f64,
    pub enrollment_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct AttendanceKpi {
    pub average_attendance_rate: f64,
    pub dropout_rate: f64,
    pub retention_rate: f64,
    pub attendance_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct SimcePoint {
    pub year: i32,
    pub language: f64,
    pub math: f64,
    pub science: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct PisaPoint {
    pub year: i32,
    pub reading: f64,
    pub math: f64,
    pub science: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct AcademicKpi {
    pub simce_language: f64,
    pub simce_math: f64,
    pub simce_science: f64,
    pub paes_average: f64,
    pub pisa_reading: f64,
    pub pisa_math: f64,
    pub pisa_science: f64,
    pub simce_trend: Vec<SimcePoint>,
    pub pisa_trend: Vec<PisaPoint>,
}

/// Full KPI snapshot for one filter. Rendering state is replaced wholesale
/// whenever the filter changes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DashboardData {
    pub filter: DashboardFilter,
    pub enrollment: EnrollmentKpi,
    pub attendance: AttendanceKpi,
    pub academic: AcademicKpi,
    pub years: Vec<i32>,
    pub levels: Vec<String>,
}

pub struct DashboardService {
    source: Arc<dyn StatsSource>,
}

impl DashboardService {
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self { source }
    }

    /// Filter applied on first load: the most recent year with recorded
    /// statistics (falling back to the current year) and no establishment or
    /// level restriction.
    pub async fn default_filter(&self) -> Result<DashboardFilter, DashboardError> {
        let years = self.source.available_years().await?;
        let year = years
            .iter()
            .copied()
            .max()
            .unwrap_or_else(|| Utc::now().year());
        Ok(DashboardFilter {
            year,
            school_id: None,
            level: None,
        })
    }

    /// Recomputes the full KPI set for a filter.
    pub async fn load(&self, filter: &DashboardFilter) -> Result<DashboardData, DashboardError> {
        debug!(
            year = filter.year,
            school_id = ?filter.school_id,
            level = ?filter.level,
            "recomputing dashboard"
        );

        let enrollment = self.enrollment_kpi(filter).await?;
        let attendance = self.attendance_kpi(filter).await?;
        let academic = self.academic_kpi(filter).await?;
        let years = self.source.available_years().await?;

        Ok(DashboardData {
            filter: filter.clone(),
            enrollment,
            attendance,
            academic,
            years,
            levels: LEVELS.iter().map(|l| l.to_string()).collect(),
        })
    }

    async fn enrollment_kpi(&self, filter: &DashboardFilter) -> Result<EnrollmentKpi, DashboardError> {
        let mut rows = self
            .source
            .enrollment_for_year(filter.year, filter.school_id, filter.level.as_deref())
            .await?;
        rows.sort_by(|a, b| a.month.cmp(&b.month));

        let latest = rows.last();
        let total_students = latest.map(|r| r.total_students).unwrap_or(0);
        let new_enrollments = latest.map(|r| r.new_enrollments).unwrap_or(0);
        let withdrawals = latest.map(|r| r.withdrawals).unwrap_or(0);

        // Stage breakdown is always computed across levels within the school
        // scope; a restricted level filter does not change its denominator.
        let mut stage_rates = [0.0f64; 3];
        if total_students > 0 {
            let scope_total = match filter.level {
                None => total_students,
                // The filtered total covers one level only; re-read the
                // unrestricted scope for the denominator.
                Some(_) => {
                    let mut all = self
                        .source
                        .enrollment_for_year(filter.year, filter.school_id, None)
                        .await?;
                    all.sort_by(|a, b| a.month.cmp(&b.month));
                    all.last().map(|r| r.total_students).unwrap_or(0)
                }
            };
            if scope_total > 0 {
                for (slot, level) in stage_rates.iter_mut().zip(LEVELS) {
                    let mut level_rows = self
                        .source
                        .enrollment_for_year(filter.year, filter.school_id, Some(level))
                        .await?;
                    level_rows.sort_by(|a, b| a.month.cmp(&b.month));
                    let level_total = level_rows.last().map(|r| r.total_students).unwrap_or(0);
                    *slot = round2(level_total as f64 / scope_total as f64 * 100.0);
                }
            }
        }

        let enrollment_trend = rows
            .iter()
            .map(|r| TrendPoint {
                period: r.month.clone(),
                value: round2(r.total_students as f64),
            })
            .collect();

        Ok(EnrollmentKpi {
            total_students,
            new_enrollments,
            withdrawals,
            pre_basic_rate: stage_rates[0],
            basic_rate: stage_rates[1],
            high_school_rate: stage_rates[2],
            enrollment_trend,
        })
    }

    async fn attendance_kpi(&self, filter: &DashboardFilter) -> Result<AttendanceKpi, DashboardError> {
        let mut rows = self
            .source
            .attendance_for_year(filter.year, filter.school_id, filter.level.as_deref())
            .await?;
        rows.sort_by_key(|r| r.date);

        let average_attendance_rate = if rows.is_empty() {
            0.0
        } else {
            round2(rows.iter().map(|r| r.attendance_rate).sum::<f64>() / rows.len() as f64)
        };

        let mut enrollment = self
            .source
            .enrollment_for_year(filter.year, filter.school_id, filter.level.as_deref())
            .await?;
        enrollment.sort_by(|a, b| a.month.cmp(&b.month));
        let (dropout_rate, retention_rate) = match enrollment.last() {
            Some(row) if row.total_students > 0 => {
                let dropout =
                    round2(row.withdrawals as f64 / row.total_students as f64 * 100.0);
                (dropout, round2(100.0 - dropout))
            }
            _ => (0.0, 0.0),
        };

        let attendance_trend = rows
            .iter()
            .map(|r| TrendPoint {
                period: r.date.to_string(),
                value: round2(r.attendance_rate),
            })
            .collect();

        Ok(AttendanceKpi {
            average_attendance_rate,
            dropout_rate,
            retention_rate,
            attendance_trend,
        })
    }

    async fn academic_kpi(&self, filter: &DashboardFilter) -> Result<AcademicKpi, DashboardError> {
        let current = self
            .source
            .academic_for_year(filter.year, filter.school_id, filter.level.as_deref())
            .await?;

        let mut trend_rows = self
            .source
            .academic_trend(filter.school_id, filter.level.as_deref())
            .await?;
        trend_rows.sort_by_key(|r| r.year);

        let mut kpi = AcademicKpi::default();
        if let Some(row) = current {
            kpi.simce_language = round2(row.simce_language);
            kpi.simce_math = round2(row.simce_math);
            kpi.simce_science = round2(row.simce_science);
            kpi.paes_average = round2(row.paes_average);
            kpi.pisa_reading = round2(row.pisa_reading);
            kpi.pisa_math = round2(row.pisa_math);
            kpi.pisa_science = round2(row.pisa_science);
        }

        kpi.simce_trend = trend_rows
            .iter()
            .map(|r| SimcePoint {
                year: r.year,
                language: round2(r.simce_language),
                math: round2(r.simce_math),
                science: round2(r.simce_science),
            })
            .collect();
        kpi.pisa_trend = trend_rows
            .iter()
            .filter(|r| r.pisa_reading > 0.0 || r.pisa_math > 0.0 || r.pisa_science > 0.0)
            .map(|r| PisaPoint {
                year: r.year,
                reading: round2(r.pisa_reading),
                math: round2(r.pisa_math),
                science: round2(r.pisa_science),
            })
            .collect();

        Ok(kpi)
    }
}

/// Normalizes a value to exactly two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use db::models::stats::{AcademicStat, AttendanceStat, EnrollmentStat};

    use super::*;

    #[derive(Default)]
    struct FakeStats {
        enrollment: Vec<EnrollmentStat>,
        attendance: Vec<AttendanceStat>,
        academic: Vec<AcademicStat>,
    }

    fn scope_matches(
        row_school: Option<i64>,
        row_level: Option<&str>,
        school: Option<i64>,
        level: Option<&str>,
    ) -> bool {
        row_school == school && row_level == level
    }

    #[async_trait]
    impl StatsSource for FakeStats {
        async fn enrollment_for_year(
            &self,
            year: i32,
            school_id: Option<i64>,
            level: Option<&str>,
        ) -> Result<Vec<EnrollmentStat>, RepositoryError> {
            Ok(self
                .enrollment
                .iter()
                .filter(|r| {
                    r.month.starts_with(&year.to_string())
                        && scope_matches(r.school_id, r.level.as_deref(), school_id, level)
                })
                .cloned()
                .collect())
        }

        async fn attendance_for_year(
            &self,
            year: i32,
            school_id: Option<i64>,
            level: Option<&str>,
        ) -> Result<Vec<AttendanceStat>, RepositoryError> {
            Ok(self
                .attendance
                .iter()
                .filter(|r| {
                    r.date.year() == year
                        && scope_matches(r.school_id, r.level.as_deref(), school_id, level)
                })
                .cloned()
                .collect())
        }

        async fn academic_for_year(
            &self,
            year: i32,
            school_id: Option<i64>,
            level: Option<&str>,
        ) -> Result<Option<AcademicStat>, RepositoryError> {
            Ok(self
                .academic
                .iter()
                .find(|r| {
                    r.year == year
                        && scope_matches(r.school_id, r.level.as_deref(), school_id, level)
                })
                .cloned())
        }

        async fn academic_trend(
            &self,
            school_id: Option<i64>,
            level: Option<&str>,
        ) -> Result<Vec<AcademicStat>, RepositoryError> {
            Ok(self
                .academic
                .iter()
                .filter(|r| scope_matches(r.school_id, r.level.as_deref(), school_id, level))
                .cloned()
                .collect())
        }

        async fn available_years(&self) -> Result<Vec<i32>, RepositoryError> {
            let mut years: Vec<i32> = self
                .enrollment
                .iter()
                .filter_map(|r| r.month[..4].parse().ok())
                .collect();
            years.sort_unstable();
            years.dedup();
            years.reverse();
            Ok(years)
        }
    }

    fn enrollment_row(
        school_id: Option<i64>,
        level: Option<&str>,
        month: &str,
        total: i64,
        withdrawals: i64,
    ) -> EnrollmentStat {
        EnrollmentStat {
            id: 0,
            school_id,
            level: level.map(str::to_string),
            month: month.to_string(),
            total_students: total,
            new_enrollments: 10,
            withdrawals,
            created_at: Utc::now(),
        }
    }

    fn attendance_row(
        school_id: Option<i64>,
        date: NaiveDate,
        rate: f64,
    ) -> AttendanceStat {
        AttendanceStat {
            id: 0,
            school_id,
            level: None,
            date,
            present_count: 0,
            absent_count: 0,
            late_count: 0,
            attendance_rate: rate,
            created_at: Utc::now(),
        }
    }

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn missing_data_degrades_to_zero_defaults() {
        let service = DashboardService::new(Arc::new(FakeStats::default()));
        let filter = DashboardFilter {
            year: 2023,
            school_id: None,
            level: None,
        };

        let data = service.load(&filter).await.unwrap();
        assert_eq!(data.enrollment.total_students, 0);
        assert_eq!(data.attendance.average_attendance_rate, 0.0);
        assert_eq!(data.attendance.dropout_rate, 0.0);
        assert_eq!(data.academic.paes_average, 0.0);
        assert!(data.enrollment.enrollment_trend.is_empty());
    }

    #[tokio::test]
    async fn values_are_normalized_to_two_decimals() {
        let stats = FakeStats {
            enrollment: vec![enrollment_row(None, None, "2023-03", 1200, 34)],
            attendance: vec![
                attendance_row(None, day(2023, 3, 1), 91.2345),
                attendance_row(None, day(2023, 3, 2), 92.8671),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(stats));
        let filter = DashboardFilter {
            year: 2023,
            school_id: None,
            level: None,
        };

        let data = service.load(&filter).await.unwrap();
        // (91.2345 + 92.8671) / 2 = 92.0508 -> 92.05
        assert_eq!(data.attendance.average_attendance_rate, 92.05);
        // 34 / 1200 * 100 = 2.8333... -> 2.83
        assert_eq!(data.attendance.dropout_rate, 2.83);
        assert_eq!(data.attendance.retention_rate, 97.17);
        for point in &data.attendance.attendance_trend {
            assert_eq!(point.value, round2(point.value));
        }
    }

    #[tokio::test]
    async fn filter_change_fully_replaces_aggregates() {
        let stats = FakeStats {
            enrollment: vec![
                enrollment_row(None, None, "2023-03", 1200, 30),
                enrollment_row(Some(7), None, "2023-03", 300, 3),
            ],
            attendance: vec![
                attendance_row(None, day(2023, 3, 1), 90.0),
                attendance_row(Some(7), day(2023, 3, 1), 95.0),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(stats));

        let unrestricted = service
            .load(&DashboardFilter {
                year: 2023,
                school_id: None,
                level: None,
            })
            .await
            .unwrap();
        assert_eq!(unrestricted.enrollment.total_students, 1200);
        assert_eq!(unrestricted.attendance.average_attendance_rate, 90.0);

        let scoped = service
            .load(&DashboardFilter {
                year: 2023,
                school_id: Some(7),
                level: None,
            })
            .await
            .unwrap();
        // No value of the previous snapshot survives the new filter.
        assert_eq!(scoped.enrollment.total_students, 300);
        assert_eq!(scoped.attendance.average_attendance_rate, 95.0);
        assert_eq!(scoped.filter.school_id, Some(7));
    }

    #[tokio::test]
    async fn trends_are_ordered_by_period_ascending() {
        let stats = FakeStats {
            enrollment: vec![
                enrollment_row(None, None, "2023-09", 1210, 4),
                enrollment_row(None, None, "2023-03", 1200, 4),
                enrollment_row(None, None, "2023-06", 1190, 4),
            ],
            attendance: vec![
                attendance_row(None, day(2023, 6, 1), 91.0),
                attendance_row(None, day(2023, 3, 1), 90.0),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(stats));
        let data = service
            .load(&DashboardFilter {
                year: 2023,
                school_id: None,
                level: None,
            })
            .await
            .unwrap();

        let months: Vec<&str> = data
            .enrollment
            .enrollment_trend
            .iter()
            .map(|p| p.period.as_str())
            .collect();
        assert_eq!(months, vec!["2023-03", "2023-06", "2023-09"]);
        assert!(
            data.attendance
                .attendance_trend
                .windows(2)
                .all(|w| w[0].period <= w[1].period)
        );
    }

    #[tokio::test]
    async fn stage_rates_derive_from_level_rows() {
        let stats = FakeStats {
            enrollment: vec![
                enrollment_row(None, None, "2023-03", 1000, 5),
                enrollment_row(None, Some("Prebásica"), "2023-03", 200, 1),
                enrollment_row(None, Some("Básica"), "2023-03", 500, 2),
                enrollment_row(None, Some("Media"), "2023-03", 300, 2),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(stats));
        let data = service
            .load(&DashboardFilter {
                year: 2023,
                school_id: None,
                level: None,
            })
            .await
            .unwrap();

        assert_eq!(data.enrollment.pre_basic_rate, 20.0);
        assert_eq!(data.enrollment.basic_rate, 50.0);
        assert_eq!(data.enrollment.high_school_rate, 30.0);
    }

    #[tokio::test]
    async fn default_filter_uses_most_recent_year_unrestricted() {
        let stats = FakeStats {
            enrollment: vec![
                enrollment_row(None, None, "2022-03", 900, 2),
                enrollment_row(None, None, "2023-03", 1000, 2),
            ],
            ..Default::default()
        };
        let service = DashboardService::new(Arc::new(stats));

        let filter = service.default_filter().await.unwrap();
        assert_eq!(filter.year, 2023);
        assert_eq!(filter.school_id, None);
        assert_eq!(filter.level, None);
    }
}
