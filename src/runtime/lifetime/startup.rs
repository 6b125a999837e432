use crate::config::AppConfig;
use crate::storage::Storage;
use crate::utils::session::{SessionDirectory, create_session_directory};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub session_directory: Arc<dyn SessionDirectory>,
}

/// 初始化开发环境演示选课数据
///
/// 选课名单由教务系统同步，开发环境没有同步源，
/// 库为空时注入一批演示记录方便联调。
async fn seed_demo_enrollments(storage: &Arc<dyn Storage>) {
    let config = AppConfig::get();
    if !config.is_development() {
        return;
    }

    match storage.list_enrollments_by_course(101).await {
        Ok(roster) if !roster.is_empty() => {
            debug!(
                "Demo course already has {} enrollment(s), skipping seed",
                roster.len()
            );
            return;
        }
        Ok(_) => {
            info!("No enrollments found for demo course, seeding demo roster...");
        }
        Err(e) => {
            warn!("Failed to inspect enrollments: {}, skipping demo seed", e);
            return;
        }
    }

    for student_id in [1001, 1002, 1003] {
        if let Err(e) = storage
            .create_enrollment(student_id, 101, "2026-fall", 2026)
            .await
        {
            warn!("Failed to seed enrollment for student {student_id}: {e}");
        }
    }
    info!("Demo roster seeded for course 101");
}

/// 准备服务器启动的上下文
/// 包括存储和会话目录等
pub async fn prepare_server_startup() -> StartupContext {
    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    // 初始化开发环境演示数据（如果需要）
    seed_demo_enrollments(&storage).await;

    // 构建会话目录
    let config = AppConfig::get();
    let session_directory = create_session_directory(config);
    if config.auth.sessions.is_empty() {
        warn!("No session seeds configured, all requests will be rejected as unauthorized");
    }

    StartupContext {
        storage,
        session_directory,
    }
}
