mod cli;

use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use shoal_gateway::{config::Config, router, GatewayContext};

#[tokio::main]
async fn main() {
    // Default to INFO level if RUST_LOG is not set
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let port = cli.port.unwrap_or(config.port);
    let upstream = cli.upstream.unwrap_or(config.upstream_url);
    let search_base = cli.search_base.unwrap_or(config.search_base);

    info!("Proxying {} on port {}", upstream, port);
    info!("Search index: {}", search_base);

    let ctx = GatewayContext::new(upstream, search_base);
    let app = router(ctx);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
