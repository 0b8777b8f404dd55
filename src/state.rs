use crate::analysis::{RandomAnalyzer, SkinAnalyzer};
use crate::config::AppConfig;
use crate::storage::{Storage, StorageClient};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub analyzer: Arc<dyn SkinAnalyzer>,
    pub started_at: Instant,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;
        let analyzer = Arc::new(RandomAnalyzer) as Arc<dyn SkinAnalyzer>;

        Ok(Self::from_parts(db, config, storage, analyzer))
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageClient>,
        analyzer: Arc<dyn SkinAnalyzer>,
    ) -> Self {
        Self {
            db,
            config,
            storage,
            analyzer,
            started_at: Instant::now(),
        }
    }

    /// State backed by a pool that never connects unless queried.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_storage(Arc::new(crate::storage::MemoryStorage::default()))
    }

    #[cfg(test)]
    pub fn fake_with_storage(storage: Arc<dyn StorageClient>) -> Self {
        use crate::analysis::analyzer::FixedAnalyzer;
        use crate::scans::repo_types::AiScores;

        let config = Arc::new(crate::config::test_config());
        let db = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");

        Self::from_parts(
            db,
            config,
            storage,
            Arc::new(FixedAnalyzer(AiScores::default())),
        )
    }

    /// Real database, in-memory storage and no-op scores.
    #[cfg(test)]
    pub fn fake_with_db(db: PgPool) -> Self {
        use crate::analysis::analyzer::FixedAnalyzer;
        use crate::scans::repo_types::AiScores;

        Self::from_parts(
            db,
            Arc::new(crate::config::test_config()),
            Arc::new(crate::storage::MemoryStorage::default()),
            Arc::new(FixedAnalyzer(AiScores::default())),
        )
    }
}
