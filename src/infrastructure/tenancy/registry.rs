//! Tenant Registry
//!
//! 租户代码到连接池的映射；启动时注册，请求时只读

use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::DatabaseConfig;
use crate::infrastructure::persistence::{create_pool, run_migrations, DbPool};

/// 租户错误
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Failed to connect tenant {code}: {source}")]
    ConnectFailed {
        code: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to migrate tenant {code}: {source}")]
    MigrationFailed {
        code: String,
        #[source]
        source: sqlx::Error,
    },
}

/// 单个租户的健康状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantHealth {
    pub code: String,
    pub healthy: bool,
}

/// 租户注册表
pub struct TenantRegistry {
    pools: RwLock<HashMap<String, DbPool>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// 为每个租户建立连接池并执行迁移
    pub async fn connect_all(
        config: &DatabaseConfig,
        codes: &[String],
    ) -> Result<Self, TenantError> {
        let registry = Self::new();

        for code in codes {
            let pool = create_pool(config, code)
                .await
                .map_err(|source| TenantError::ConnectFailed {
                    code: code.clone(),
                    source,
                })?;

            run_migrations(&pool)
                .await
                .map_err(|source| TenantError::MigrationFailed {
                    code: code.clone(),
                    source,
                })?;

            registry.register(code.clone(), pool).await;
        }

        Ok(registry)
    }

    /// 注册（或替换）一个租户连接池
    pub async fn register(&self, code: String, pool: DbPool) {
        let mut pools = self.pools.write().await;
        tracing::info!(tenant = %code, "Tenant registered");
        if let Some(previous) = pools.insert(code, pool) {
            previous.close().await;
        }
    }

    /// 获取租户连接池
    pub async fn get(&self, code: &str) -> Option<DbPool> {
        self.pools.read().await.get(code).cloned()
    }

    /// 已注册的租户代码（排序后）
    pub async fn tenant_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.pools.read().await.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// 对每个租户执行 `SELECT 1`
    pub async fn ping_all(&self) -> Vec<TenantHealth> {
        let pools: Vec<(String, DbPool)> = self
            .pools
            .read()
            .await
            .iter()
            .map(|(code, pool)| (code.clone(), pool.clone()))
            .collect();

        let mut results = Vec::with_capacity(pools.len());
        for (code, pool) in pools {
            let healthy = match sqlx::query("SELECT 1").execute(&pool).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::error!(tenant = %code, error = %e, "Tenant database ping failed");
                    false
                }
            };
            results.push(TenantHealth { code, healthy });
        }
        results.sort_by(|a, b| a.code.cmp(&b.code));
        results
    }

    /// 关闭所有连接池
    pub async fn close(&self) {
        let mut pools = self.pools.write().await;
        for (code, pool) in pools.drain() {
            pool.close().await;
            tracing::info!(tenant = %code, "Tenant pool closed");
        }
    }
}

impl Default for TenantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            in_memory: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_connect_all_registers_each_tenant() {
        let codes = vec!["beta".to_string(), "alana".to_string()];
        let registry = TenantRegistry::connect_all(&memory_config(), &codes)
            .await
            .unwrap();

        assert_eq!(registry.tenant_codes().await, vec!["alana", "beta"]);
        assert!(registry.get("alana").await.is_some());
        assert!(registry.get("gamma").await.is_none());
    }

    #[tokio::test]
    async fn test_ping_all_reports_closed_pool() {
        let codes = vec!["alana".to_string()];
        let registry = TenantRegistry::connect_all(&memory_config(), &codes)
            .await
            .unwrap();

        assert!(registry.ping_all().await.iter().all(|t| t.healthy));

        registry.get("alana").await.unwrap().close().await;
        let health = registry.ping_all().await;
        assert_eq!(
            health,
            vec![TenantHealth {
                code: "alana".to_string(),
                healthy: false
            }]
        );
    }

    #[tokio::test]
    async fn test_close_drains_registry() {
        let codes = vec!["alana".to_string()];
        let registry = TenantRegistry::connect_all(&memory_config(), &codes)
            .await
            .unwrap();

        registry.close().await;
        assert!(registry.tenant_codes().await.is_empty());
    }
}
