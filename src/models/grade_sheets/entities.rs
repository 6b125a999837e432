use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 考核类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum AssessmentType {
    Midterm,
    Final,
    Assignment,
    Project,
    Quiz,
    Lab,
    Other,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Midterm => "midterm",
            AssessmentType::Final => "final",
            AssessmentType::Assignment => "assignment",
            AssessmentType::Project => "project",
            AssessmentType::Quiz => "quiz",
            AssessmentType::Lab => "lab",
            AssessmentType::Other => "other",
        }
    }
}

impl<'de> Deserialize<'de> for AssessmentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的考核类型: '{s}'. 支持: midterm, final, assignment, project, quiz, lab, other"
            ))
        })
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "midterm" => Ok(AssessmentType::Midterm),
            "final" => Ok(AssessmentType::Final),
            "assignment" => Ok(AssessmentType::Assignment),
            "project" => Ok(AssessmentType::Project),
            "quiz" => Ok(AssessmentType::Quiz),
            "lab" => Ok(AssessmentType::Lab),
            "other" => Ok(AssessmentType::Other),
            _ => Err(format!("Invalid assessment type: {s}")),
        }
    }
}

// 等级制成绩
//
// 固定的字母等级集合，绩点按 0.3 步进。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum LetterGrade {
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
}

impl LetterGrade {
    /// 全部等级，按绩点从高到低排列
    pub const ALL: [LetterGrade; 12] = [
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::DPlus,
        LetterGrade::D,
        LetterGrade::DMinus,
        LetterGrade::F,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }

    /// 等级对应的绩点
    pub fn points(&self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::AMinus => 3.7,
            LetterGrade::BPlus => 3.3,
            LetterGrade::B => 3.0,
            LetterGrade::BMinus => 2.7,
            LetterGrade::CPlus => 2.3,
            LetterGrade::C => 2.0,
            LetterGrade::CMinus => 1.7,
            LetterGrade::DPlus => 1.3,
            LetterGrade::D => 1.0,
            LetterGrade::DMinus => 0.7,
            LetterGrade::F => 0.0,
        }
    }

    /// 解析等级字符串，大小写不敏感
    pub fn parse_normalized(s: &str) -> Option<LetterGrade> {
        s.trim().to_uppercase().parse().ok()
    }

    /// 取绩点最接近的等级，平分时取较高的等级
    pub fn nearest(points: f64) -> LetterGrade {
        let mut best = LetterGrade::F;
        let mut best_diff = f64::MAX;
        // ALL 按绩点降序，同差值时保留先遇到的较高等级
        for grade in LetterGrade::ALL {
            let diff = (grade.points() - points).abs();
            if diff < best_diff {
                best = grade;
                best_diff = diff;
            }
        }
        best
    }
}

impl<'de> Deserialize<'de> for LetterGrade {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LetterGrade::parse_normalized(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "无效的成绩等级: '{s}'. 支持: A, A-, B+, B, B-, C+, C, C-, D+, D, D-, F"
            ))
        })
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(LetterGrade::A),
            "A-" => Ok(LetterGrade::AMinus),
            "B+" => Ok(LetterGrade::BPlus),
            "B" => Ok(LetterGrade::B),
            "B-" => Ok(LetterGrade::BMinus),
            "C+" => Ok(LetterGrade::CPlus),
            "C" => Ok(LetterGrade::C),
            "C-" => Ok(LetterGrade::CMinus),
            "D+" => Ok(LetterGrade::DPlus),
            "D" => Ok(LetterGrade::D),
            "D-" => Ok(LetterGrade::DMinus),
            "F" => Ok(LetterGrade::F),
            _ => Err(format!("Invalid letter grade: {s}")),
        }
    }
}

// 成绩单状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum SheetStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Published,
}

// 审批动作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetAction {
    Submit,
    Approve,
    Reject,
    Publish,
}

impl SheetAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetAction::Submit => "submit",
            SheetAction::Approve => "approve",
            SheetAction::Reject => "reject",
            SheetAction::Publish => "publish",
        }
    }
}

impl SheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetStatus::Draft => "draft",
            SheetStatus::Submitted => "submitted",
            SheetStatus::Approved => "approved",
            SheetStatus::Rejected => "rejected",
            SheetStatus::Published => "published",
        }
    }

    /// 状态机转移表
    ///
    /// Draft → Submitted → Approved → Published，Submitted 可被驳回到
    /// Rejected。Rejected 和 Published 是终态，没有出边。
    pub fn apply(self, action: SheetAction) -> Option<SheetStatus> {
        match (self, action) {
            (SheetStatus::Draft, SheetAction::Submit) => Some(SheetStatus::Submitted),
            (SheetStatus::Submitted, SheetAction::Approve) => Some(SheetStatus::Approved),
            (SheetStatus::Submitted, SheetAction::Reject) => Some(SheetStatus::Rejected),
            (SheetStatus::Approved, SheetAction::Publish) => Some(SheetStatus::Published),
            _ => None,
        }
    }

    /// 动作要求的来源状态
    pub fn required_for(action: SheetAction) -> SheetStatus {
        match action {
            SheetAction::Submit => SheetStatus::Draft,
            SheetAction::Approve | SheetAction::Reject => SheetStatus::Submitted,
            SheetAction::Publish => SheetStatus::Approved,
        }
    }
}

impl<'de> Deserialize<'de> for SheetStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的成绩单状态: '{s}'. 支持: draft, submitted, approved, rejected, published"
            ))
        })
    }
}

impl std::fmt::Display for SheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SheetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SheetStatus::Draft),
            "submitted" => Ok(SheetStatus::Submitted),
            "approved" => Ok(SheetStatus::Approved),
            "rejected" => Ok(SheetStatus::Rejected),
            "published" => Ok(SheetStatus::Published),
            _ => Err(format!("Invalid sheet status: {s}")),
        }
    }
}

// 成绩条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeEntry {
    pub id: i64,
    pub sheet_id: i64,
    pub student_id: i64,
    pub enrollment_id: i64,
    pub grade: LetterGrade,
    pub comments: Option<String>,
}

// 成绩单
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeSheet {
    pub id: i64,
    pub course_id: i64,
    pub instructor_id: i64,
    pub assessment_type: AssessmentType,
    pub assessment_name: String,
    pub total_marks: f64,
    pub weightage: f64,
    pub status: SheetStatus,
    pub grades: Vec<GradeEntry>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub approval_comments: Option<String>,
    pub rejected_at: Option<chrono::DateTime<chrono::Utc>>,
    pub rejection_reason: Option<String>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 课程总评（派生数据）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct CourseGradeAggregate {
    pub student_id: i64,
    pub course_id: i64,
    pub final_grade: LetterGrade,
    pub grade_points: f64,
    pub computed_at: chrono::DateTime<chrono::Utc>,
}

pub(crate) fn datetime_from_epoch(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl crate::entity::grade_entries::Model {
    pub fn into_grade_entry(self) -> Option<GradeEntry> {
        // 库中出现非法等级字符串视为数据损坏，条目被丢弃并由调用方记录
        let grade = self.grade.parse::<LetterGrade>().ok()?;
        Some(GradeEntry {
            id: self.id,
            sheet_id: self.sheet_id,
            student_id: self.student_id,
            enrollment_id: self.enrollment_id,
            grade,
            comments: self.comments,
        })
    }
}

impl crate::entity::grade_sheets::Model {
    pub fn into_grade_sheet(self, entries: Vec<crate::entity::grade_entries::Model>) -> GradeSheet {
        GradeSheet {
            id: self.id,
            course_id: self.course_id,
            instructor_id: self.instructor_id,
            assessment_type: self
                .assessment_type
                .parse()
                .unwrap_or(AssessmentType::Other),
            assessment_name: self.assessment_name,
            total_marks: self.total_marks,
            weightage: self.weightage,
            status: self.status.parse().unwrap_or(SheetStatus::Draft),
            grades: entries
                .into_iter()
                .filter_map(|e| e.into_grade_entry())
                .collect(),
            submitted_at: self.submitted_at.map(datetime_from_epoch),
            approved_at: self.approved_at.map(datetime_from_epoch),
            approval_comments: self.approval_comments,
            rejected_at: self.rejected_at.map(datetime_from_epoch),
            rejection_reason: self.rejection_reason,
            published_at: self.published_at.map(datetime_from_epoch),
            created_at: datetime_from_epoch(self.created_at),
            updated_at: datetime_from_epoch(self.updated_at),
        }
    }
}

impl crate::entity::course_grades::Model {
    pub fn into_aggregate(self) -> Option<CourseGradeAggregate> {
        let final_grade = self.final_grade.parse::<LetterGrade>().ok()?;
        Some(CourseGradeAggregate {
            student_id: self.student_id,
            course_id: self.course_id,
            final_grade,
            grade_points: self.grade_points,
            computed_at: datetime_from_epoch(self.computed_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_grade_points() {
        assert_eq!(LetterGrade::A.points(), 4.0);
        assert_eq!(LetterGrade::AMinus.points(), 3.7);
        assert_eq!(LetterGrade::B.points(), 3.0);
        assert_eq!(LetterGrade::F.points(), 0.0);
    }

    #[test]
    fn test_letter_grade_parse_normalized() {
        assert_eq!(LetterGrade::parse_normalized("a"), Some(LetterGrade::A));
        assert_eq!(
            LetterGrade::parse_normalized(" b+ "),
            Some(LetterGrade::BPlus)
        );
        assert_eq!(LetterGrade::parse_normalized("Z"), None);
        assert_eq!(LetterGrade::parse_normalized(""), None);
    }

    #[test]
    fn test_letter_grade_nearest_prefers_higher() {
        assert_eq!(LetterGrade::nearest(4.0), LetterGrade::A);
        assert_eq!(LetterGrade::nearest(3.7), LetterGrade::AMinus);
        // 3.85 与 A(4.0) 和 A-(3.7) 等距，取较高者
        assert_eq!(LetterGrade::nearest(3.85), LetterGrade::A);
        assert_eq!(LetterGrade::nearest(0.2), LetterGrade::F);
    }

    #[test]
    fn test_transition_table_happy_path() {
        assert_eq!(
            SheetStatus::Draft.apply(SheetAction::Submit),
            Some(SheetStatus::Submitted)
        );
        assert_eq!(
            SheetStatus::Submitted.apply(SheetAction::Approve),
            Some(SheetStatus::Approved)
        );
        assert_eq!(
            SheetStatus::Submitted.apply(SheetAction::Reject),
            Some(SheetStatus::Rejected)
        );
        assert_eq!(
            SheetStatus::Approved.apply(SheetAction::Publish),
            Some(SheetStatus::Published)
        );
    }

    #[test]
    fn test_transition_table_rejects_everything_else() {
        // 重复提交、越级发布、终态出边都不存在
        assert_eq!(SheetStatus::Submitted.apply(SheetAction::Submit), None);
        assert_eq!(SheetStatus::Draft.apply(SheetAction::Publish), None);
        assert_eq!(SheetStatus::Draft.apply(SheetAction::Approve), None);
        assert_eq!(SheetStatus::Published.apply(SheetAction::Publish), None);
        assert_eq!(SheetStatus::Rejected.apply(SheetAction::Submit), None);
        assert_eq!(SheetStatus::Rejected.apply(SheetAction::Approve), None);
    }

    #[test]
    fn test_required_source_status() {
        assert_eq!(
            SheetStatus::required_for(SheetAction::Publish),
            SheetStatus::Approved
        );
        assert_eq!(
            SheetStatus::required_for(SheetAction::Reject),
            SheetStatus::Submitted
        );
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            SheetStatus::Draft,
            SheetStatus::Submitted,
            SheetStatus::Approved,
            SheetStatus::Rejected,
            SheetStatus::Published,
        ] {
            assert_eq!(status.as_str().parse::<SheetStatus>(), Ok(status));
        }
    }
}
