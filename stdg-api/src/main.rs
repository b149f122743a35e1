//! stdg-api - SaaS tools content service
//!
//! Serves the tool directory, the blog (with generated articles carrying
//! category affiliate links) and newsletter sign-ups, and publishes one
//! article per day in the background.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use stdg_common::config::{self, ConfigOverrides, ServiceConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stdg_api::content::{AffiliateCatalog, ContentPipeline};
use stdg_api::services::{AutoPublisher, MailchimpClient, MailingList, OpenAiClient, TextGenerator};
use stdg_api::AppState;

/// Command-line arguments for stdg-api
#[derive(Parser, Debug)]
#[command(name = "stdg-api")]
#[command(about = "SaaS tools content service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "STDG_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "STDG_HOST")]
    host: Option<String>,

    /// Directory holding the database
    #[arg(long, env = "STDG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Database file name
    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// Replacement affiliate catalog (TOML)
    #[arg(long, env = "STDG_AFFILIATE_CATALOG")]
    affiliate_catalog: Option<PathBuf>,

    /// Text generation credential; enables remote article drafting
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Mailing list credential
    #[arg(long, env = "MAILCHIMP_API_KEY", hide_env_values = true)]
    mailchimp_api_key: Option<String>,

    /// Mailing list id
    #[arg(long, env = "MAILCHIMP_LIST_ID")]
    mailchimp_list_id: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            host: self.host.clone(),
            data_dir: self.data_dir.clone(),
            db_name: self.db_name.clone(),
            affiliate_catalog: self.affiliate_catalog.clone(),
            openai_api_key: self.openai_api_key.clone(),
            mailchimp_api_key: self.mailchimp_api_key.clone(),
            mailchimp_list_id: self.mailchimp_list_id.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read the bootstrap file first: it carries the default log level
    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let config_found = config_path.exists();
    let toml_config = config::load_toml_config(&config_path)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "stdg-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if config_found {
        info!("Configuration file: {}", config_path.display());
    } else {
        warn!(
            "Configuration file {} not found, using defaults",
            config_path.display()
        );
    }

    let service_config = ServiceConfig::resolve(toml_config, args.overrides())
        .context("Invalid configuration")?;

    let db_path = service_config.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = stdg_api::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let catalog = match &service_config.affiliate_catalog {
        Some(path) => AffiliateCatalog::load(path)
            .with_context(|| format!("Failed to load affiliate catalog {}", path.display()))?,
        None => AffiliateCatalog::builtin().context("Built-in affiliate catalog is invalid")?,
    };
    info!(
        version = catalog.version(),
        categories = catalog.len(),
        "Affiliate catalog loaded"
    );

    let generator: Option<Arc<dyn TextGenerator>> = match &service_config.generation {
        Some(settings) => {
            let client = OpenAiClient::new(settings).context("Failed to build generation client")?;
            info!(model = %settings.model, "Remote generation enabled");
            Some(Arc::new(client) as Arc<dyn TextGenerator>)
        }
        None => {
            info!("No generation credential configured, using article templates");
            None
        }
    };
    let pipeline = Arc::new(ContentPipeline::new(generator, Arc::new(catalog)));

    let publisher = Arc::new(AutoPublisher::new(
        db_pool.clone(),
        pipeline.clone(),
        service_config.auto_publish.clone(),
    ));

    let mut state = AppState::new(db_pool, pipeline, publisher.clone(), service_config.bulk_delay);
    if let Some(settings) = &service_config.mailing_list {
        let client: Arc<dyn MailingList> =
            Arc::new(MailchimpClient::new(settings).context("Failed to build mailing list client")?);
        info!(list_id = %settings.list_id, "Mailing list forwarding enabled");
        state = state.with_mailing_list(client);
    }

    let publisher_task = if service_config.auto_publish.enabled {
        Some(tokio::spawn(publisher.run_forever()))
    } else {
        info!("Auto-publish disabled");
        None
    };

    let app = stdg_api::build_router(state);

    let listener = tokio::net::TcpListener::bind((service_config.host.as_str(), service_config.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind to {}:{}",
                service_config.host, service_config.port
            )
        })?;
    let addr: SocketAddr = listener.local_addr()?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(task) = publisher_task {
        task.abort();
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
