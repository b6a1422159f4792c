//! Shared application state.

use crate::cache::MemoryCache;
use crate::config::ServerConfig;
use crate::upload::UploadStore;
use anyhow::Context;
use invoicely_activity_types::{ActivityJournal, InMemoryJournal};
use invoicely_common_i18n::{loader, I18n};
use invoicely_dashboard::{DashboardService, DashboardSource, InMemorySource};
use invoicely_notify::Notifier;
use std::sync::Arc;
use tracing::info;

/// State handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub cache: Arc<MemoryCache>,
    pub journal: Arc<dyn ActivityJournal>,
    pub dashboard: DashboardService,
    pub notifier: Notifier,
    pub i18n: Arc<I18n>,
    pub uploads: UploadStore,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// Must run inside a Tokio runtime; the cache sweeper is spawned here.
    pub async fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let cache = Arc::new(MemoryCache::with_capacity_bound(config.cache.max_entries));
        if config.cache.enabled {
            MemoryCache::spawn_sweeper(&cache, config.cache.sweep_interval());
        }

        let journal: Arc<dyn ActivityJournal> = Arc::new(InMemoryJournal::new());
        let source: Arc<dyn DashboardSource> = Arc::new(InMemorySource::with_sample_data());
        let dashboard = DashboardService::new(source, journal.clone());

        let notifier =
            Notifier::from_config(&config.email).context("Failed to set up email provider")?;

        let i18n = loader::build(&loader::LoaderConfig {
            locale_dir: config.i18n.locale_dir.clone(),
            default_locale: config.i18n.default_locale,
        })
        .context("Failed to load translation catalogs")?;

        let uploads = UploadStore::new(&config.upload);
        tokio::fs::create_dir_all(uploads.root())
            .await
            .with_context(|| format!("Failed to create upload dir {}", uploads.root().display()))?;

        info!(
            email_provider = notifier.provider_name(),
            locales = i18n.list_locales().len(),
            cache_enabled = config.cache.enabled,
            "Application state ready"
        );

        Ok(Self {
            config: Arc::new(config.clone()),
            cache,
            journal,
            dashboard,
            notifier,
            i18n: Arc::new(i18n),
            uploads,
        })
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the activity journal. The dashboard reads from the new one too.
    pub fn with_journal(mut self, journal: Arc<dyn ActivityJournal>) -> Self {
        self.journal = journal.clone();
        self.dashboard = self.dashboard.with_journal(journal);
        self
    }
}
