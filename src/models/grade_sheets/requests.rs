use serde::Deserialize;
use ts_rs::TS;

use super::entities::AssessmentType;

// 创建成绩单请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct CreateGradeSheetRequest {
    pub course_id: i64,
    pub assessment_type: AssessmentType,
    pub assessment_name: String,
    pub total_marks: f64,
    pub weightage: f64,
    /// 可选的初始条目，等价于创建后立即 replace_entries
    #[serde(default)]
    pub entries: Vec<GradeEntryInput>,
}

// 单条成绩输入
//
// grade 保留原始字符串，校验统一在 storage 的整体替换里做，
// 以便把所有非法行一次性报给调用方。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeEntryInput {
    pub student_id: i64,
    pub grade: String,
    pub comments: Option<String>,
}

// 整体替换成绩条目请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct ReplaceEntriesRequest {
    pub entries: Vec<GradeEntryInput>,
}

// 审批通过请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct ApproveSheetRequest {
    pub comments: Option<String>,
}

// 驳回请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct RejectSheetRequest {
    pub reason: String,
}
