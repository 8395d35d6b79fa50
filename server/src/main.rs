use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod handlers;

use crate::handlers::{health_handler, root_handler};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding index.html and the built client package.
    #[arg(long)]
    public_dir: Option<PathBuf>,
    /// Port to listen on. Falls back to $PORT, then 3000.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pageboard_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    let index_file = public_dir.join("index.html");

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(&public_dir).append_index_html_on_directories(true))
        .layer(axum::Extension(index_file))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(TraceLayer::new_for_http());

    let port = args
        .port
        .or_else(|| {
            std::env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
        })
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(public_dir = %public_dir.display(), "Server started at http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|err| error!("failed to bind {addr}: {err}"))?;
    axum::serve(listener, app)
        .await
        .inspect_err(|err| error!("server stopped: {err}"))
}
