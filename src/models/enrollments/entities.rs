use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::grade_sheets::entities::{LetterGrade, datetime_from_epoch};

// 选课状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
        }
    }
}

impl<'de> Deserialize<'de> for EnrollmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的选课状态: '{s}'. 支持: enrolled, completed, dropped"
            ))
        })
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enrolled" => Ok(EnrollmentStatus::Enrolled),
            "completed" => Ok(EnrollmentStatus::Completed),
            "dropped" => Ok(EnrollmentStatus::Dropped),
            _ => Err(format!("Invalid enrollment status: {s}")),
        }
    }
}

// 选课记录
//
// 课程目录由外部系统维护，这里只保存本工作流需要的注册关系
// 和聚合完成后回写的最终成绩。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub semester: String,
    pub year: i32,
    pub status: EnrollmentStatus,
    pub final_grade: Option<LetterGrade>,
    pub grade_points: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl crate::entity::enrollments::Model {
    pub fn into_enrollment(self) -> Enrollment {
        Enrollment {
            id: self.id,
            student_id: self.student_id,
            course_id: self.course_id,
            semester: self.semester,
            year: self.year,
            status: self.status.parse().unwrap_or(EnrollmentStatus::Enrolled),
            final_grade: self.final_grade.and_then(|g| g.parse().ok()),
            grade_points: self.grade_points,
            created_at: datetime_from_epoch(self.created_at),
        }
    }
}
