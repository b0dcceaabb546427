//! `[bridge]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [bridge]
//! app_id = "todo"                      # Identifier in the preview URL
//! dev = true                           # Use dev_host instead of prod_host
//! dev_host = "http://localhost:3000"
//! prod_host = "https://baibian.app"
//! port = 35730                         # Bridge WebSocket port
//! extra_origins = ["http://192.168.1.20:3000"]
//! ```

use serde::{Deserialize, Serialize};

/// Iframe bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// App identifier embedded in the preview URL.
    pub app_id: String,

    /// Select the dev host (`true`) or the production host (`false`).
    pub dev: bool,

    /// App runner host used during development.
    pub dev_host: String,

    /// Production App Shell host.
    pub prod_host: String,

    /// Port of the bridge WebSocket endpoint.
    pub port: u16,

    /// Origins trusted in addition to the built-in allow-list.
    pub extra_origins: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_id: "app".into(),
            dev: true,
            dev_host: "http://localhost:3000".into(),
            prod_host: "https://baibian.app".into(),
            port: 35730,
            extra_origins: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Host the iframe is loaded from, chosen by the `dev` flag.
    pub fn base_host(&self) -> &str {
        if self.dev { &self.dev_host } else { &self.prod_host }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_bridge_config() {
        let config = test_parse_config(
            "[bridge]\napp_id = \"todo\"\ndev = false\nport = 9000\nextra_origins = [\"http://10.0.0.2:3000\"]",
        );

        assert_eq!(config.bridge.app_id, "todo");
        assert_eq!(config.bridge.base_host(), "https://baibian.app");
        assert_eq!(config.bridge.port, 9000);
        assert_eq!(config.bridge.extra_origins.len(), 1);
    }

    #[test]
    fn test_bridge_config_defaults() {
        let config = test_parse_config("");

        assert!(config.bridge.dev);
        assert_eq!(config.bridge.base_host(), "http://localhost:3000");
        assert_eq!(config.bridge.port, 35730);
    }
}
