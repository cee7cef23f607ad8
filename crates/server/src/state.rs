//! Shared handler state.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracker_money::{BasicMoneyLedger, MoneyLedger};
use tracker_progress::{BasicHabitTracker, HabitTracker};
use tracker_storage::{JsonStorage, Storage};

use super::auth::TokenVerifier;
use super::config::{Backend, Config};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<dyn HabitTracker>,
    pub ledger: Arc<dyn MoneyLedger>,
    pub storage: Arc<dyn Storage>,
    pub auth: Arc<TokenVerifier>,
}

impl AppState {
    /// Build the services on top of one storage backend.
    pub fn new(storage: Arc<dyn Storage>, jwt_secret: &str) -> Self {
        Self {
            tracker: Arc::new(BasicHabitTracker::new(Arc::clone(&storage))),
            ledger: Arc::new(BasicMoneyLedger::new(Arc::clone(&storage))),
            storage,
            auth: Arc::new(TokenVerifier::new(jwt_secret)),
        }
    }

    /// Open the configured backend.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let storage = open_storage(config).await?;
        Ok(Self::new(storage, &config.jwt_secret))
    }
}

async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    match config.storage {
        Backend::Json => {
            info!("Using JSON storage in {}", config.data_dir.display());
            let storage = JsonStorage::new(&config.data_dir)
                .await
                .with_context(|| format!("Failed to open {}", config.data_dir.display()))?;
            Ok(Arc::new(storage))
        }
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            tokio::fs::create_dir_all(&config.data_dir).await?;
            let path = config.data_dir.join("tracker.db");
            info!("Using SQLite storage at {}", path.display());
            let storage = tracker_storage::SqliteStorage::new_from_path(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "sqlite"))]
        Backend::Sqlite => anyhow::bail!("SQLite storage requires the `sqlite` feature"),
    }
}
