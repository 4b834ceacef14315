use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::Validity;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::MySqlPool;
use std::sync::Arc;

/// Owns the relationship engine and the storage it was built on.
pub struct Server {
    pub relationship_service: Arc<dyn RelationshipService>,
    pub friendship_check: Arc<dyn FriendshipCheck>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let policy = RelationshipPolicy {
            max_duration: Validity::from_secs(settings.relationship.max_duration_secs)?,
            sweep_on_read: settings.relationship.sweep_on_read,
        };

        let (request_ledger, friendship_ledger, pool) = match settings.store.backend.as_str() {
            "memory" => (
                Arc::new(MemoryRequestLedger::new()) as Arc<dyn RequestLedger>,
                Arc::new(MemoryFriendshipLedger::new()) as Arc<dyn FriendshipLedger>,
                None,
            ),
            "mysql" => {
                let dsn = settings
                    .store
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.mysql_dsn is required for mysql"))?;
                let pool = MySqlPool::connect(dsn).await?;
                ensure_schema(&pool).await?;
                (
                    Arc::new(MySqlRequestLedger::new(pool.clone())) as Arc<dyn RequestLedger>,
                    Arc::new(MySqlFriendshipLedger::new(pool.clone())) as Arc<dyn FriendshipLedger>,
                    Some(pool),
                )
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let service = Arc::new(RealRelationshipService::new(
            request_ledger,
            friendship_ledger,
            Arc::new(SystemClock),
            policy,
        ));

        info!(backend = %settings.store.backend, ?policy, "relationship engine ready");

        Ok(Self {
            relationship_service: service.clone(),
            friendship_check: service,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        info!("server shut down");
    }
}
