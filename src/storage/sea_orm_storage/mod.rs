//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod course_grades;
mod enrollments;
mod grade_sheets;
mod notifications;

use crate::config::AppConfig;
use crate::errors::{GradeflowError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradeflowError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| GradeflowError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| GradeflowError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GradeflowError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    enrollments::entities::Enrollment,
    grade_sheets::{
        entities::{CourseGradeAggregate, GradeSheet, LetterGrade, SheetAction},
        requests::{CreateGradeSheetRequest, GradeEntryInput},
        responses::AssessmentGradeView,
    },
    notifications::{
        requests::{CreateNotificationRequest, NotificationListParams},
        responses::NotificationListResponse,
    },
};
use crate::storage::{Storage, TransitionFields};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 成绩单模块
    async fn create_grade_sheet(
        &self,
        instructor_id: i64,
        sheet: CreateGradeSheetRequest,
    ) -> Result<GradeSheet> {
        self.create_grade_sheet_impl(instructor_id, sheet).await
    }

    async fn get_grade_sheet(&self, sheet_id: i64) -> Result<Option<GradeSheet>> {
        self.get_grade_sheet_impl(sheet_id).await
    }

    async fn list_grade_sheets_by_instructor(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<GradeSheet>> {
        self.list_grade_sheets_by_instructor_impl(instructor_id)
            .await
    }

    async fn list_grade_sheets_by_course(&self, course_id: i64) -> Result<Vec<GradeSheet>> {
        self.list_grade_sheets_by_course_impl(course_id).await
    }

    async fn replace_grade_entries(
        &self,
        sheet_id: i64,
        entries: Vec<GradeEntryInput>,
    ) -> Result<GradeSheet> {
        self.replace_grade_entries_impl(sheet_id, entries).await
    }

    async fn list_pending_grade_sheets(&self) -> Result<Vec<GradeSheet>> {
        self.list_pending_grade_sheets_impl().await
    }

    async fn transition_grade_sheet(
        &self,
        sheet_id: i64,
        action: SheetAction,
        fields: TransitionFields,
        notifications: Vec<CreateNotificationRequest>,
    ) -> Result<GradeSheet> {
        self.transition_grade_sheet_impl(sheet_id, action, fields, notifications)
            .await
    }

    // 选课模块
    async fn list_enrollments_by_course(&self, course_id: i64) -> Result<Vec<Enrollment>> {
        self.list_enrollments_by_course_impl(course_id).await
    }

    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        semester: &str,
        year: i32,
    ) -> Result<Enrollment> {
        self.create_enrollment_impl(student_id, course_id, semester, year)
            .await
    }

    // 总评聚合模块
    async fn list_published_assessments_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<AssessmentGradeView>> {
        self.list_published_assessments_for_student_impl(student_id)
            .await
    }

    async fn upsert_course_grade(
        &self,
        student_id: i64,
        course_id: i64,
        final_grade: LetterGrade,
        grade_points: f64,
    ) -> Result<()> {
        self.upsert_course_grade_impl(student_id, course_id, final_grade, grade_points)
            .await
    }

    async fn list_course_grades_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<CourseGradeAggregate>> {
        self.list_course_grades_by_student_impl(student_id).await
    }

    // 通知模块
    async fn list_notifications_with_pagination(
        &self,
        recipient_id: i64,
        params: NotificationListParams,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_with_pagination_impl(recipient_id, params)
            .await
    }

    async fn get_unread_notification_count(&self, recipient_id: i64) -> Result<i64> {
        self.get_unread_notification_count_impl(recipient_id).await
    }

    async fn mark_notification_as_read(
        &self,
        recipient_id: i64,
        notification_id: i64,
    ) -> Result<bool> {
        self.mark_notification_as_read_impl(recipient_id, notification_id)
            .await
    }

    async fn mark_all_notifications_as_read(&self, recipient_id: i64) -> Result<i64> {
        self.mark_all_notifications_as_read_impl(recipient_id).await
    }
}
