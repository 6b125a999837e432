use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建选课表
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enrollments::Semester).string().not_null())
                    .col(ColumnDef::new(Enrollments::Year).integer().not_null())
                    .col(ColumnDef::new(Enrollments::Status).string().not_null())
                    .col(ColumnDef::new(Enrollments::FinalGrade).string().null())
                    .col(ColumnDef::new(Enrollments::GradePoints).double().null())
                    .col(
                        ColumnDef::new(Enrollments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_course_student")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .col(Enrollments::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 创建成绩单表
        manager
            .create_table(
                Table::create()
                    .table(GradeSheets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeSheets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeSheets::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeSheets::InstructorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeSheets::AssessmentType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeSheets::AssessmentName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeSheets::TotalMarks).double().not_null())
                    .col(ColumnDef::new(GradeSheets::Weightage).double().not_null())
                    .col(ColumnDef::new(GradeSheets::Status).string().not_null())
                    .col(ColumnDef::new(GradeSheets::SubmittedAt).big_integer().null())
                    .col(ColumnDef::new(GradeSheets::ApprovedAt).big_integer().null())
                    .col(
                        ColumnDef::new(GradeSheets::ApprovalComments)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(GradeSheets::RejectedAt).big_integer().null())
                    .col(ColumnDef::new(GradeSheets::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(GradeSheets::PublishedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeSheets::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeSheets::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_grade_sheets_instructor_status")
                    .table(GradeSheets::Table)
                    .col(GradeSheets::InstructorId)
                    .col(GradeSheets::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_grade_sheets_status_submitted_at")
                    .table(GradeSheets::Table)
                    .col(GradeSheets::Status)
                    .col(GradeSheets::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        // 创建成绩条目表
        manager
            .create_table(
                Table::create()
                    .table(GradeEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeEntries::SheetId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeEntries::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeEntries::EnrollmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeEntries::Grade).string().not_null())
                    .col(ColumnDef::new(GradeEntries::Comments).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeEntries::Table, GradeEntries::SheetId)
                            .to(GradeSheets::Table, GradeSheets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeEntries::Table, GradeEntries::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_grade_entries_sheet")
                    .table(GradeEntries::Table)
                    .col(GradeEntries::SheetId)
                    .to_owned(),
            )
            .await?;

        // 创建课程总评表（派生数据）
        manager
            .create_table(
                Table::create()
                    .table(CourseGrades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseGrades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CourseGrades::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseGrades::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CourseGrades::FinalGrade).string().not_null())
                    .col(
                        ColumnDef::new(CourseGrades::GradePoints)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseGrades::ComputedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_grades_student_course")
                    .table(CourseGrades::Table)
                    .col(CourseGrades::StudentId)
                    .col(CourseGrades::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 创建通知表
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notifications::RecipientId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(ColumnDef::new(Notifications::Priority).string().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_recipient_read")
                    .table(Notifications::Table)
                    .col(Notifications::RecipientId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseGrades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeSheets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    Semester,
    Year,
    Status,
    FinalGrade,
    GradePoints,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GradeSheets {
    Table,
    Id,
    CourseId,
    InstructorId,
    AssessmentType,
    AssessmentName,
    TotalMarks,
    Weightage,
    Status,
    SubmittedAt,
    ApprovedAt,
    ApprovalComments,
    RejectedAt,
    RejectionReason,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradeEntries {
    Table,
    Id,
    SheetId,
    StudentId,
    EnrollmentId,
    Grade,
    Comments,
}

#[derive(DeriveIden)]
enum CourseGrades {
    Table,
    Id,
    StudentId,
    CourseId,
    FinalGrade,
    GradePoints,
    ComputedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    RecipientId,
    NotificationType,
    Title,
    Message,
    Priority,
    IsRead,
    CreatedAt,
}
