// Configuration module entry point
// Loads layered settings and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use url::Url;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, Config, GenerationConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    ServerConfig, DEFAULT_MODEL,
};

/// Environment variable holding the generation credential
pub const API_KEY_ENV: &str = "API_KEY";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let sources = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("ROI").separator("__"));
        let settings = Self::with_defaults(sources)?
            .set_override_option("generation.api_key", std::env::var(API_KEY_ENV).ok())?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
        Self::load_from(&path)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8787)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 120)?
            .set_default("performance.shutdown_grace_period", 10)?
            .set_default("http.server_name", "roi-email-edge")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("assets.directory", "dist")?
            .set_default("assets.root_document", "index.html")?
            .set_default("generation.model", DEFAULT_MODEL)?
            .set_default(
                "generation.base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("generation.recipient", "hola@efficiency24.io")
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "server.workers must be at least 1 when set".to_string(),
            ));
        }
        if self.assets.root_document.trim_matches('/').is_empty() {
            return Err(config::ConfigError::Message(
                "assets.root_document must name a file".to_string(),
            ));
        }
        validate_url("generation.base_url", &self.generation.base_url)
    }

    /// Built-in defaults only, no file or environment sources
    #[cfg(test)]
    pub(crate) fn test_default() -> Self {
        Self::with_defaults(config::Config::builder())
            .and_then(|builder| builder.build())
            .and_then(config::Config::try_deserialize)
            .expect("defaults deserialize")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Require an absolute http(s) URL with a host
fn validate_url(field: &str, value: &str) -> Result<(), config::ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        config::ConfigError::Message(format!("{field} is not a valid URL '{value}': {e}"))
    })?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|host| !host.is_empty()) => Ok(()),
        "http" | "https" => Err(config::ConfigError::Message(format!(
            "{field} has no host: '{value}'"
        ))),
        scheme => Err(config::ConfigError::Message(format!(
            "{field} must use http or https, got '{scheme}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config::test_default()
    }

    #[test]
    fn test_defaults() {
        let cfg = defaults();
        assert_eq!(cfg.server.port, 8787);
        assert_eq!(cfg.assets.root_document, "index.html");
        assert_eq!(cfg.generation.model, DEFAULT_MODEL);
        assert_eq!(cfg.generation.recipient, "hola@efficiency24.io");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = defaults();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8787".parse().unwrap()
        );
    }

    #[test]
    fn test_blank_credential_is_absent() {
        let mut cfg = defaults();
        assert!(cfg.generation.credential().is_none());
        cfg.generation.api_key = Some("   ".to_string());
        assert!(cfg.generation.credential().is_none());
        cfg.generation.api_key = Some("secret".to_string());
        assert_eq!(cfg.generation.credential(), Some("secret"));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let mut cfg = defaults();
        cfg.generation.api_key = Some("secret".to_string());
        let debug = format!("{:?}", cfg.generation);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut cfg = defaults();
        for bad in [
            "ftp://example.com",
            "http://",
            "https://exa mple.com",
            "http://:::/",
            "generativelanguage.googleapis.com",
        ] {
            cfg.generation.base_url = bad.to_string();
            assert!(cfg.validate().is_err(), "{bad}");
        }
        cfg.generation.base_url = "http://127.0.0.1:8080/proxy/".to_string();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_workers() {
        let mut cfg = defaults();
        cfg.server.workers = Some(0);
        assert!(cfg.validate().is_err());
        cfg.server.workers = Some(2);
        assert!(cfg.validate().is_ok());
    }

    // The only test touching process environment; keep every env assertion here.
    #[test]
    fn test_layering_file_env_and_api_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[server]\nport = 8000\n\n[assets]\ndirectory = \"public\"\n\n[generation]\napi_key = \"file\"\n",
        )
        .unwrap();
        let path = dir.path().join("config");
        let path = path.to_str().unwrap();

        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var("ROI__SERVER__PORT");
        let from_file = Config::load_from(path).unwrap();
        assert_eq!(from_file.server.port, 8000);
        assert_eq!(from_file.generation.credential(), Some("file"));

        std::env::set_var(API_KEY_ENV, "env");
        std::env::set_var("ROI__SERVER__PORT", "9000");
        let layered = Config::load_from(path);
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var("ROI__SERVER__PORT");

        let layered = layered.unwrap();
        assert_eq!(layered.generation.credential(), Some("env"));
        assert_eq!(layered.server.port, 9000);
        assert_eq!(layered.assets.directory, "public");
        assert_eq!(layered.server.host, "127.0.0.1");
    }
}
