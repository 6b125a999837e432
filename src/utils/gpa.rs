//! 加权绩点计算
//!
//! 纯函数，不碰存储。聚合器在某个学生的已发布权重配满后
//! 调用这里计算该学生的课程总评。

use crate::models::grade_sheets::entities::LetterGrade;

/// 课程权重配满的阈值（百分比）
pub const FULL_WEIGHTAGE: f64 = 100.0;

/// 单项考核的加权输入
#[derive(Debug, Clone, Copy)]
pub struct WeightedGrade {
    pub weightage: f64,
    pub grade: LetterGrade,
}

/// 已发布权重之和是否达到聚合阈值
pub fn is_fully_weighted(total_weightage: f64) -> bool {
    total_weightage >= FULL_WEIGHTAGE
}

/// 加权平均绩点，保留 1 位小数
///
/// 权重之和为 0 时无法计算，返回 None。
pub fn weighted_grade_points(grades: &[WeightedGrade]) -> Option<f64> {
    let total_weight: f64 = grades.iter().map(|g| g.weightage).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let weighted_sum: f64 = grades
        .iter()
        .map(|g| g.weightage * g.grade.points())
        .sum();

    Some(round_to_tenth(weighted_sum / total_weight))
}

/// 课程总评：加权绩点 + 最接近的字母等级
pub fn aggregate_course_grade(grades: &[WeightedGrade]) -> Option<(f64, LetterGrade)> {
    let points = weighted_grade_points(grades)?;
    Some((points, LetterGrade::nearest(points)))
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_average_rounds_to_one_decimal() {
        // 30% 的 B(3.0) + 70% 的 A(4.0) = 3.7
        let grades = [
            WeightedGrade {
                weightage: 30.0,
                grade: LetterGrade::B,
            },
            WeightedGrade {
                weightage: 70.0,
                grade: LetterGrade::A,
            },
        ];
        assert_eq!(weighted_grade_points(&grades), Some(3.7));
    }

    #[test]
    fn test_aggregate_maps_to_nearest_letter() {
        let grades = [
            WeightedGrade {
                weightage: 30.0,
                grade: LetterGrade::B,
            },
            WeightedGrade {
                weightage: 70.0,
                grade: LetterGrade::A,
            },
        ];
        let (points, letter) = aggregate_course_grade(&grades).unwrap();
        assert_eq!(points, 3.7);
        assert_eq!(letter, LetterGrade::AMinus);
    }

    #[test]
    fn test_zero_weight_has_no_average() {
        assert_eq!(weighted_grade_points(&[]), None);
        let grades = [WeightedGrade {
            weightage: 0.0,
            grade: LetterGrade::A,
        }];
        assert_eq!(weighted_grade_points(&grades), None);
    }

    #[test]
    fn test_full_weightage_threshold() {
        assert!(!is_fully_weighted(99.9));
        assert!(is_fully_weighted(100.0));
        assert!(is_fully_weighted(110.0));
    }

    #[test]
    fn test_uniform_grades_keep_their_points() {
        let grades = [
            WeightedGrade {
                weightage: 50.0,
                grade: LetterGrade::CPlus,
            },
            WeightedGrade {
                weightage: 50.0,
                grade: LetterGrade::CPlus,
            },
        ];
        let (points, letter) = aggregate_course_grade(&grades).unwrap();
        assert_eq!(points, 2.3);
        assert_eq!(letter, LetterGrade::CPlus);
    }
}
