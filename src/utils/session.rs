//! 会话目录
//!
//! 身份认证由校园统一门户完成，本服务只负责把门户签发的
//! Bearer 令牌解析成用户主体。生产环境对接门户的会话查询
//! 接口，开发环境使用配置注入的静态目录。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::AppConfig;
use crate::models::users::entities::Principal;

/// 令牌到用户主体的解析
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    async fn resolve(&self, token: &str) -> Option<Principal>;
}

/// 配置注入的静态会话目录
pub struct StaticSessionDirectory {
    sessions: HashMap<String, Principal>,
}

impl StaticSessionDirectory {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut sessions = HashMap::new();
        for seed in &config.auth.sessions {
            match seed.role.parse() {
                Ok(role) => {
                    sessions.insert(
                        seed.token.clone(),
                        Principal {
                            user_id: seed.user_id,
                            role,
                        },
                    );
                }
                Err(_) => {
                    warn!("会话种子角色非法，已跳过: user_id={}", seed.user_id);
                }
            }
        }
        Self { sessions }
    }
}

#[async_trait]
impl SessionDirectory for StaticSessionDirectory {
    async fn resolve(&self, token: &str) -> Option<Principal> {
        self.sessions.get(token).copied()
    }
}

/// 构建全局会话目录实例
pub fn create_session_directory(config: &AppConfig) -> Arc<dyn SessionDirectory> {
    Arc::new(StaticSessionDirectory::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, SessionSeed};
    use crate::models::users::entities::UserRole;

    fn directory_with(seeds: Vec<SessionSeed>) -> StaticSessionDirectory {
        let mut sessions = HashMap::new();
        let auth = AuthConfig { sessions: seeds };
        for seed in &auth.sessions {
            if let Ok(role) = seed.role.parse() {
                sessions.insert(
                    seed.token.clone(),
                    Principal {
                        user_id: seed.user_id,
                        role,
                    },
                );
            }
        }
        StaticSessionDirectory { sessions }
    }

    #[tokio::test]
    async fn test_resolve_known_token() {
        let dir = directory_with(vec![SessionSeed {
            token: "tok-1".into(),
            user_id: 42,
            role: "instructor".into(),
        }]);

        let principal = dir.resolve("tok-1").await.unwrap();
        assert_eq!(principal.user_id, 42);
        assert_eq!(principal.role, UserRole::Instructor);
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let dir = directory_with(vec![]);
        assert!(dir.resolve("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_role_seed_is_skipped() {
        let dir = directory_with(vec![SessionSeed {
            token: "tok-bad".into(),
            user_id: 7,
            role: "principal".into(),
        }]);
        assert!(dir.resolve("tok-bad").await.is_none());
    }
}
