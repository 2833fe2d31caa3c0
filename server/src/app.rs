//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, ENV_LOG_FORMAT};
use crate::core::shutdown::ShutdownService;
use crate::data::StorageService;
use crate::domain::AnalyticsEngine;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: Arc<StorageService>,
    pub engine: Arc<AnalyticsEngine>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Metrics) => {
                banner::print_catalog();
                return Ok(());
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let storage = StorageService::init(&config.database)
            .await
            .with_context(|| format!("Failed to open {} database", config.database.backend))?;
        let storage = Arc::new(storage);
        tracing::debug!(backend = %storage.backend(), "Storage initialized");

        let engine = Arc::new(AnalyticsEngine::new(
            storage.aggregates(),
            storage.scopes(),
            config.analytics.clone(),
        ));
        let shutdown = ShutdownService::new(storage.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            engine,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        let json = std::env::var(ENV_LOG_FORMAT)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if json {
            tracing_subscriber::fmt()
                .json()
                .with_target(false)
                .with_env_filter(filter)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_thread_ids(false)
                .with_level(true)
                .with_ansi(true)
                .compact()
                .with_env_filter(filter)
                .init();
        }
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        banner::print_banner(&app.config);

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    async fn start_background_tasks(&self) {
        if let Some(handle) = self
            .storage
            .start_health_check_task(self.shutdown.subscribe())
        {
            self.shutdown.register(handle).await;
        }

        tracing::debug!("Background tasks started");
    }
}
