//! Command-line flags and listen address resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Environment variable consulted for the port when `--listen-port` is not given.
const PORT_ENV: &str = "NOMAD_PORT_http";

#[derive(Parser, Debug)]
#[command(name = "whosout-server")]
#[command(about = "Serve who is out of office over the next workdays as JSON")]
pub struct Cli {
    /// The address on which to listen (all interfaces when empty)
    #[arg(long, default_value = "")]
    pub listen_address: String,

    /// The port on which to listen (0 falls back to $NOMAD_PORT_http, then any free port)
    #[arg(long, default_value_t = 0)]
    pub listen_port: u16,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Optional TOML file with calendar_url, refresh_interval and workdays
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// `host:port` to bind, applying the port fallback from the environment.
    pub fn bind_address(&self) -> Result<String> {
        let port = resolve_port(self.listen_port, std::env::var(PORT_ENV).ok())?;
        let host = if self.listen_address.is_empty() {
            "0.0.0.0"
        } else {
            self.listen_address.as_str()
        };
        Ok(format!("{host}:{port}"))
    }

    /// Default tracing filter when RUST_LOG is unset.
    pub fn log_filter(&self) -> String {
        if self.debug {
            "whosout_server=debug,whosout_core=debug,tower_http=debug".to_string()
        } else {
            "whosout_server=info,whosout_core=info".to_string()
        }
    }
}

fn resolve_port(flag: u16, from_env: Option<String>) -> Result<u16> {
    if flag != 0 {
        return Ok(flag);
    }
    match from_env {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Failed to convert port from {PORT_ENV} ('{value}') to integer")),
        None => Ok(0),
    }
}
