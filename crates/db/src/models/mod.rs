pub mod activity_log;
pub mod attendance;
pub mod course;
pub mod grade;
pub mod school;
pub mod stats;
pub mod student;
pub mod subject;
pub mod teacher;
