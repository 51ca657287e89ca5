use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "shoal-gateway")]
#[command(about = "CORS reverse proxy and search scraper for a torrent daemon dashboard")]
pub struct Cli {
    /// Listen port; falls back to SHOAL_GATEWAY_PORT
    #[arg(long)]
    pub port: Option<u16>,

    /// Upstream daemon root every proxied request is sent to
    #[arg(long)]
    pub upstream: Option<String>,

    /// Torrent index root scraped by /search
    #[arg(long)]
    pub search_base: Option<String>,
}
