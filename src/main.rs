use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::{io::AsyncWriteExt, net::TcpListener, sync::broadcast};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod content_loader;
mod error;
mod export;
mod hot_reload;
mod i18n;
mod markdown;
mod metadata;
mod models;
mod page;
mod routes;
mod state;
mod store;

use config::{AppConfig, SiteConfig};
use content_loader::load_templates;
use hot_reload::start_content_watcher;
use state::{AppState, RouterState};
use store::ContentStore;

#[derive(Parser, Debug)]
#[command(version, about = "Localized personal blog server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the blog over HTTP (default)
    Serve,
    /// Pre-render every post and index page into a directory
    Export {
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
    },
    /// Print the (locale, slug) pair of every post as JSON
    Routes,
    /// Print the page metadata of one post as JSON (`null` when missing)
    Metadata { locale: String, slug: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app_config = AppConfig::from_env();
    info!(
        content_dir = %app_config.content_dir.display(),
        development = app_config.is_development,
        "starting"
    );

    let site = SiteConfig::load(&app_config.content_dir)
        .await
        .context("failed to load site config")?;
    let templates = load_templates(&app_config.content_dir)
        .await
        .context("failed to load templates")?;
    let store = ContentStore::load(&app_config.content_dir, &site.locales)
        .await
        .context("failed to load posts")?;

    let state = Arc::new(AppState::new(
        site,
        app_config.content_dir.clone(),
        templates,
        store,
        app_config.is_development,
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state, &app_config).await,
        Command::Export { out } => {
            export::export_site(&state, &out)
                .await
                .context("static export failed")?;
            Ok(())
        }
        Command::Routes => {
            let params = state.store.read().await.generate_static_params();
            print_json(&params).await
        }
        Command::Metadata { locale, slug } => {
            let store = state.store.read().await;
            let metadata = metadata::generate_metadata(&store, &state.site, &locale, &slug);
            print_json(&metadata).await
        }
    }
}

async fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    tokio::io::stdout().write_all(json.as_bytes()).await?;
    Ok(())
}

async fn serve(state: Arc<AppState>, app_config: &AppConfig) -> anyhow::Result<()> {
    let (tx, _rx) = broadcast::channel(1);
    if app_config.is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let router_state = RouterState {
        app_state: state,
        broadcaster: tx,
    };
    let app = routes::router(router_state, &app_config.content_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
