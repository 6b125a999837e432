use serde::Serialize;
use ts_rs::TS;

use super::entities::{AssessmentType, CourseGradeAggregate, GradeSheet, LetterGrade};

/// 成绩单列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeSheetListResponse {
    pub items: Vec<GradeSheet>,
    pub total: i64,
}

/// CSV 导入被跳过的行
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct SkippedRow {
    /// 数据行号，表头为第 1 行
    pub line: usize,
    pub reason: String,
}

/// CSV 导入结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeImportResponse {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// 学生视角的单项考核成绩
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct AssessmentGradeView {
    pub course_id: i64,
    pub assessment_type: AssessmentType,
    pub assessment_name: String,
    pub weightage: f64,
    pub grade: LetterGrade,
    pub comments: Option<String>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 学生成绩响应：已发布的考核明细 + 已完成的课程总评
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct StudentGradesResponse {
    pub assessments: Vec<AssessmentGradeView>,
    pub aggregates: Vec<CourseGradeAggregate>,
}
