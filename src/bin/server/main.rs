use anyhow::{Context, Result};
use attachment_store::{
    adapters::inbound::http::create_router_with_limit,
    app::{AppBuilder, AppConfig, CatalogBackend, load_backends, parse_categories},
    config::EnvOptions,
};
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "attachment-store-server")]
#[command(about = "Attachment upload server with collision-safe object keys", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Comma-separated storage backends to serve (local, aws_s3, ali_oss, minio, in_memory)
    #[arg(long, env = "ATTACHMENT_BACKENDS", default_value = "in_memory")]
    backends: String,

    /// Prefix of the environment variables holding backend options
    #[arg(long, env = "ATTACHMENT_OPTION_PREFIX", default_value = "")]
    option_prefix: String,

    /// Database URL for the attachment catalog (PostgreSQL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "67108864")]
    max_body_bytes: usize,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let categories = parse_categories(&self.backends)?;
        if categories.is_empty() {
            anyhow::bail!("At least one backend must be listed");
        }

        let options = EnvOptions::with_prefix(self.option_prefix.clone());
        let backends = load_backends(&categories, &options)
            .context("Failed to read backend options")?;

        let catalog_backend = match &self.database_url {
            Some(connection_string) => CatalogBackend::Database {
                connection_string: connection_string.clone(),
            },
            None => CatalogBackend::InMemory,
        };

        Ok(AppConfig {
            backends,
            catalog_backend,
        })
    }

    fn init_logging(&self) -> Result<()> {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=debug", level)));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting Attachment Store Server");
    info!("Backends: {}", cli.backends);
    info!(
        "Catalog: {}",
        if cli.database_url.is_some() { "database" } else { "memory" }
    );

    let config = cli.to_app_config()?;

    let app_services = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    let router = create_router_with_limit(app_services.into_state(), cli.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use attachment_store::AttachmentCategory;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "attachment-store-server",
            "--port",
            "8080",
            "--backends",
            "aws_s3,ali_oss",
            "--option-prefix",
            "app_",
        ]);

        assert_eq!(cli.port, 8080);
        assert_eq!(cli.backends, "aws_s3,ali_oss");
        assert_eq!(cli.option_prefix, "app_");
    }

    #[test]
    fn test_memory_config() {
        std::env::set_var("SERVER_MAIN_TEST_IN_MEMORY_DOMAIN", "localhost:3000");
        let cli = Cli::parse_from([
            "attachment-store-server",
            "--backends",
            "in_memory",
            "--option-prefix",
            "SERVER_MAIN_TEST_",
        ]);

        let config = cli.to_app_config().unwrap();
        assert_eq!(config.backends.len(), 1);
        assert_eq!(config.backends[0].category, AttachmentCategory::InMemory);
        assert_eq!(config.backends[0].domain, "localhost:3000");
    }

    #[test]
    fn test_missing_backend_option_rejected() {
        let cli = Cli::parse_from([
            "attachment-store-server",
            "--backends",
            "minio",
            "--option-prefix",
            "SERVER_MAIN_TEST_UNSET_",
        ]);
        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let cli = Cli::parse_from(["attachment-store-server", "--backends", "ftp"]);
        assert!(cli.to_app_config().is_err());
    }
}
