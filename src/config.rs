use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Engine configuration.
///
/// The only runtime switch is mock mode, which redirects requests to a local
/// proxy so fixtures can be served during development. Parsing behavior is
/// identical in both modes.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Route requests to the mock proxy instead of the live site
    #[serde(default)]
    pub use_mock: bool,

    /// Base URL of the mock proxy
    #[serde(default = "default_proxy_base")]
    pub proxy_base: String,
}

fn default_proxy_base() -> String {
    "http://127.0.0.1:8080".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_mock: false,
            proxy_base: default_proxy_base(),
        }
    }
}

impl Config {
    /// Load configuration from `config.toml` if present, falling back to
    /// defaults. A `PROXY` environment variable overrides the proxy base.
    pub fn load() -> Self {
        let mut cfg = Self::default();

        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(parsed) = toml::from_str::<Config>(&content) {
                    cfg = parsed;
                }
            }
        }

        if let Ok(proxy) = std::env::var("PROXY") {
            if !proxy.is_empty() {
                cfg.proxy_base = proxy;
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert!(!cfg.use_mock);
        assert_eq!(cfg.proxy_base, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: Config = toml::from_str("use_mock = true").unwrap();
        assert!(cfg.use_mock);
        assert_eq!(cfg.proxy_base, "http://127.0.0.1:8080");
    }
}
