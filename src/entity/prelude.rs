//! 预导入模块，方便使用

pub use super::course_grades::{
    ActiveModel as CourseGradeActiveModel, Entity as CourseGrades, Model as CourseGradeModel,
};
pub use super::enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as Enrollments, Model as EnrollmentModel,
};
pub use super::grade_entries::{
    ActiveModel as GradeEntryActiveModel, Entity as GradeEntries, Model as GradeEntryModel,
};
pub use super::grade_sheets::{
    ActiveModel as GradeSheetActiveModel, Entity as GradeSheets, Model as GradeSheetModel,
};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
