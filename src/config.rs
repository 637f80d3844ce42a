use std::net::SocketAddr;
use std::path::PathBuf;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "json-atlas", version, about = "Browse a directory of JSON files in the browser")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding the JSON files to browse
    #[arg(long, env = "STORAGE_DIR", default_value = "./storage")]
    pub storage: PathBuf,

    /// Directory holding index.html and the static assets
    #[arg(long, env = "PUBLIC_DIR", default_value = "./public")]
    pub public: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Config {
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|e| format!("invalid bind address {raw}: {e}"))
    }
}
