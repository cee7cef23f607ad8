//! Server configuration, read from flags or the environment.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Which storage backend holds the documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// One JSON file per document under the data directory
    Json,
    /// A single SQLite database file in the data directory
    Sqlite,
}

/// Ultimate Tracker API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "tracker")]
#[command(about = "Ultimate Tracker API server", long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "TRACKER_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Directory holding persisted documents
    #[arg(long, env = "TRACKER_DATA_DIR", default_value = ".tracker")]
    pub data_dir: PathBuf,

    /// Storage backend
    #[arg(long, env = "TRACKER_STORAGE", value_enum, default_value_t = Backend::Json)]
    pub storage: Backend,

    /// Secret the bearer tokens are signed with
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Origin allowed by CORS
    #[arg(long, env = "CLIENT_URL", default_value = "http://localhost:5173")]
    pub client_url: String,
}

impl Config {
    /// Socket address string for the listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "tracker",
            "--port",
            "8080",
            "--storage",
            "sqlite",
            "--data-dir",
            "/tmp/tracker",
            "--jwt-secret",
            "s3cret",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, Backend::Sqlite);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tracker"));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.address(), format!("{}:8080", config.bind));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let args = ["tracker", "--storage", "mongo", "--jwt-secret", "s3cret"];
        assert!(Config::try_parse_from(args).is_err());
    }
}
