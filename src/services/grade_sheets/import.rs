//! 成绩 CSV 批量导入
//!
//! 表头按大小写不敏感的子串匹配定位列：学号列匹配 `student` 或 `id`，
//! 成绩列匹配 `grade`，备注列匹配 `comment`（可选）。
//! 必需列缺失在处理任何数据行之前直接报错；
//! 数据行按宽松策略处理，不合格的行被跳过并逐行记录原因。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::io::Cursor;

use super::GradeSheetService;
use crate::errors::{GradeflowError, Result};
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::entities::LetterGrade;
use crate::models::grade_sheets::requests::GradeEntryInput;
use crate::models::grade_sheets::responses::{GradeImportResponse, SkippedRow};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 解析出的数据行（尚未对照选课名单）
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CsvGradeRow {
    pub line: usize,
    pub student_id: i64,
    pub grade: String,
    pub comments: Option<String>,
}

/// 解析 CSV 文本，返回可用行和带原因的跳过行
pub(crate) fn parse_grade_csv(data: &str) -> Result<(Vec<CsvGradeRow>, Vec<SkippedRow>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(data.as_bytes()));

    let headers = rdr
        .headers()
        .map_err(|e| GradeflowError::validation(format!("读取表头失败: {e}")))?;

    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let student_idx = lowered
        .iter()
        .position(|h| h.contains("student") || h.contains("id"))
        .ok_or_else(|| GradeflowError::validation("缺少学号列（需包含 student 或 id）"))?;
    let grade_idx = lowered
        .iter()
        .position(|h| h.contains("grade"))
        .ok_or_else(|| GradeflowError::validation("缺少成绩列（需包含 grade）"))?;
    let comment_idx = lowered.iter().position(|h| h.contains("comment"));

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let line = i + 2; // 表头为第 1 行
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                skipped.push(SkippedRow {
                    line,
                    reason: format!("行解析失败: {e}"),
                });
                continue;
            }
        };

        // 空行整体忽略
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let student_raw = record.get(student_idx).unwrap_or("").trim();
        let grade_raw = record.get(grade_idx).unwrap_or("").trim();
        let comments = comment_idx
            .and_then(|idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let Ok(student_id) = student_raw.parse::<i64>() else {
            skipped.push(SkippedRow {
                line,
                reason: format!("学号无法解析: '{student_raw}'"),
            });
            continue;
        };

        if grade_raw.is_empty() {
            skipped.push(SkippedRow {
                line,
                reason: "成绩为空".to_string(),
            });
            continue;
        }

        if LetterGrade::parse_normalized(grade_raw).is_none() {
            skipped.push(SkippedRow {
                line,
                reason: format!("成绩等级非法: '{grade_raw}'"),
            });
            continue;
        }

        rows.push(CsvGradeRow {
            line,
            student_id,
            grade: grade_raw.to_uppercase(),
            comments,
        });
    }

    Ok((rows, skipped))
}

/// 导入成绩到草稿成绩单
pub async fn import_grades(
    service: &GradeSheetService,
    sheet_id: i64,
    body: String,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    let sheet = match storage.get_grade_sheet(sheet_id).await {
        Ok(Some(sheet)) => sheet,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SheetNotFound,
                "成绩单不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询成绩单失败: {e}"),
                )),
            );
        }
    };

    if principal.role == UserRole::Instructor && sheet.instructor_id != principal.user_id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只能导入自己创建的成绩单",
        )));
    }

    let (rows, mut skipped) = match parse_grade_csv(&body) {
        Ok(parsed) => parsed,
        Err(GradeflowError::Validation(msg)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ImportMissingColumn,
                msg,
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("解析 CSV 失败: {e}"),
                )),
            );
        }
    };

    // 对照选课名单过滤，名单外和重复学生按行跳过
    let roster = match storage.list_enrollments_by_course(sheet.course_id).await {
        Ok(roster) => roster,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询选课名单失败: {e}"),
                )),
            );
        }
    };
    let enrolled: HashSet<i64> = roster.iter().map(|e| e.student_id).collect();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for row in rows {
        if !enrolled.contains(&row.student_id) {
            skipped.push(SkippedRow {
                line: row.line,
                reason: format!("学生 {} 不在选课名单中", row.student_id),
            });
            continue;
        }
        if !seen.insert(row.student_id) {
            skipped.push(SkippedRow {
                line: row.line,
                reason: format!("学生 {} 重复出现，保留首行", row.student_id),
            });
            continue;
        }
        entries.push(GradeEntryInput {
            student_id: row.student_id,
            grade: row.grade,
            comments: row.comments,
        });
    }

    let imported = entries.len();
    match storage.replace_grade_entries(sheet_id, entries).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            GradeImportResponse { imported, skipped },
            "导入完成",
        ))),
        Err(GradeflowError::Validation(msg)) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::ValidationFailed, msg),
        )),
        Err(GradeflowError::Conflict(msg)) => Ok(
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::Conflict, msg)),
        ),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("写入导入条目失败: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_valid_rows_and_skips_empty_grade() {
        let csv = "student_id,grade,comments\n1001,A,Great\n1002,,";
        let (rows, skipped) = parse_grade_csv(csv).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_id, 1001);
        assert_eq!(rows[0].grade, "A");
        assert_eq!(rows[0].comments.as_deref(), Some("Great"));

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 3);
        assert_eq!(skipped[0].reason, "成绩为空");
    }

    #[test]
    fn test_parse_matches_headers_by_substring() {
        let csv = "Student Number,Final Grade\n1001,b+";
        let (rows, skipped) = parse_grade_csv(csv).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(rows.len(), 1);
        // 成绩统一转大写
        assert_eq!(rows[0].grade, "B+");
        assert!(rows[0].comments.is_none());
    }

    #[test]
    fn test_parse_missing_grade_column() {
        let csv = "student_id,comments\n1001,ok";
        let err = parse_grade_csv(csv).unwrap_err();
        assert!(matches!(err, GradeflowError::Validation(_)));
    }

    #[test]
    fn test_parse_missing_student_column() {
        let csv = "name,grade\nAlice,A";
        // name 既不含 student 也不含 id
        let err = parse_grade_csv(csv).unwrap_err();
        assert!(matches!(err, GradeflowError::Validation(_)));
    }

    #[test]
    fn test_parse_skips_unparseable_student_id() {
        let csv = "student_id,grade\nS1,A\n1002,B";
        let (rows, skipped) = parse_grade_csv(csv).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_id, 1002);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 2);
        assert!(skipped[0].reason.contains("S1"));
    }

    #[test]
    fn test_parse_skips_invalid_letter_grade() {
        let csv = "student_id,grade\n1001,Z\n1002,a-";
        let (rows, skipped) = parse_grade_csv(csv).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].grade, "A-");
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].reason.contains("'Z'"));
    }

    #[test]
    fn test_parse_ignores_blank_lines() {
        let csv = "student_id,grade\n1001,A\n,\n";
        let (rows, skipped) = parse_grade_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(skipped.is_empty());
    }
}
