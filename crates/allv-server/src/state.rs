use allv_core::config::AppConfig;
use allv_core::store::Directory;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub directory: Arc<RwLock<Directory>>,
}

impl AppState {
    /// Open the configured snapshot and wrap it for sharing.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let directory = Directory::open_async(&config).await?;
        tracing::info!(
            users = directory.user_count(),
            posts = directory.post_count(),
            "Directory loaded"
        );
        Ok(Self::with_directory(config, directory))
    }

    pub fn with_directory(config: AppConfig, directory: Directory) -> Self {
        Self {
            config,
            directory: Arc::new(RwLock::new(directory)),
        }
    }
}
