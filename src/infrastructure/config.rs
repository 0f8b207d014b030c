//! Environment-sourced gateway settings
//!
//! Read once at startup; nothing here is renegotiated while the server runs.

use log::warn;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemma3:4b";
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OLLAMA_BIN: &str = "ollama";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Model name sent to the inference backend.
    pub model: String,
    /// Base URL of the Ollama HTTP API.
    pub ollama_host: String,
    /// Use the `ollama run` subprocess instead of the HTTP API.
    pub use_cli: bool,
    pub ollama_bin: String,
    /// Shared secret expected in `X-API-Key`; `None` disables the check.
    pub api_token: Option<String>,
    pub port: u16,
    pub memory_file: PathBuf,
    pub index_html: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            model: DEFAULT_MODEL.to_owned(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_owned(),
            use_cli: false,
            ollama_bin: DEFAULT_OLLAMA_BIN.to_owned(),
            api_token: None,
            port: DEFAULT_PORT,
            memory_file: PathBuf::from("kouri_memory.json"),
            index_html: PathBuf::from("index.html"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl GatewayConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> GatewayConfig {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> GatewayConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GatewayConfig::default();

        let port = match lookup("KOURI_PORT").or_else(|| lookup("FLASK_PORT")) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("invalid port {raw:?}, falling back to {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        GatewayConfig {
            model: lookup("KOURI_MODEL").unwrap_or(defaults.model),
            ollama_host: lookup("OLLAMA_HOST").unwrap_or(defaults.ollama_host),
            use_cli: lookup("KOURI_USE_CLI").is_some_and(|v| v == "1"),
            ollama_bin: lookup("OLLAMA_BIN").unwrap_or(defaults.ollama_bin),
            api_token: lookup("KOURI_API_TOKEN").filter(|token| !token.is_empty()),
            port,
            memory_file: lookup("KOURI_MEMORY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.memory_file),
            index_html: lookup("KOURI_INDEX_HTML")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_html),
            static_dir: lookup("KOURI_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }

    /// `"cli"` or `"api"`, as reported by `/health`.
    pub fn mode(&self) -> &'static str {
        if self.use_cli { "cli" } else { "api" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = GatewayConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.mode(), "api");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("KOURI_MODEL", "llama3.2:3b"),
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("KOURI_USE_CLI", "1"),
            ("OLLAMA_BIN", "/opt/ollama/bin/ollama"),
            ("KOURI_API_TOKEN", "s3cret"),
            ("KOURI_PORT", "8080"),
            ("KOURI_MEMORY_FILE", "/var/lib/kouri/memory.json"),
        ]));

        assert_eq!(config.model, "llama3.2:3b");
        assert_eq!(config.ollama_host, "http://gpu-box:11434");
        assert!(config.use_cli);
        assert_eq!(config.mode(), "cli");
        assert_eq!(config.ollama_bin, "/opt/ollama/bin/ollama");
        assert_eq!(config.api_token.as_deref(), Some("s3cret"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.memory_file, PathBuf::from("/var/lib/kouri/memory.json"));
    }

    #[test]
    fn test_use_cli_only_on_exact_one() {
        for value in ["0", "true", "yes", ""] {
            let config = GatewayConfig::from_lookup(lookup_from(&[("KOURI_USE_CLI", value)]));
            assert!(!config.use_cli, "{value:?} should not enable the CLI");
        }
    }

    #[test]
    fn test_empty_token_disables_auth() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("KOURI_API_TOKEN", "")]));
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_port_fallbacks() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("FLASK_PORT", "5050")]));
        assert_eq!(config.port, 5050);

        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("KOURI_PORT", "6000"),
            ("FLASK_PORT", "5050"),
        ]));
        assert_eq!(config.port, 6000);

        let config = GatewayConfig::from_lookup(lookup_from(&[("KOURI_PORT", "not-a-port")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
