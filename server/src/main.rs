use anyhow::Result;
use axum::Router;
use catalog::{BooksConfig, DEFAULT_API_BASE};
use clap::Parser;
use server::{build_app, AppConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Local book discovery feed backed by the Google Books catalog")]
struct Args {
    /// Directory for locally persisted history
    #[arg(long, default_value = "./data")]
    data_dir: String,
    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Catalog API root
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,
    /// Catalog request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// Pause before each catalog request, in milliseconds
    #[arg(long, default_value_t = 100)]
    request_delay_ms: u64,
    /// User-Agent sent to the catalog
    #[arg(long)]
    user_agent: Option<String>,
    /// Favorite category used for recommendations (repeatable)
    #[arg(long = "favorite", default_values = ["Fiction", "Non-Fiction", "Mystery"])]
    favorites: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut books = BooksConfig {
        api_base: args.api_base.clone(),
        api_key: std::env::var("GOOGLE_BOOKS_API_KEY").ok(),
        timeout: Duration::from_secs(args.timeout_secs),
        request_delay: Duration::from_millis(args.request_delay_ms),
        ..BooksConfig::default()
    };
    if let Some(ua) = args.user_agent.clone() { books.user_agent = ua; }

    let config = AppConfig {
        books,
        favorites: args.favorites.clone(),
        cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        ..AppConfig::new(&args.data_dir)
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, data_dir = %args.data_dir, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
