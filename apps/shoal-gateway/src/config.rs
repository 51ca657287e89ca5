use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upstream_url: String,
    pub search_base: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("SHOAL_GATEWAY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8010),
            upstream_url: env::var("SHOAL_UPSTREAM_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:9091".to_string()),
            search_base: env::var("SHOAL_SEARCH_BASE")
                .unwrap_or_else(|_| "https://1337x.to".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8010,
            upstream_url: "http://127.0.0.1:9091".to_string(),
            search_base: "https://1337x.to".to_string(),
        }
    }
}
