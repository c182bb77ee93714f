//! # Client Configuration
//!
//! Where the storefront API lives, where the cart is stored and how early
//! a session counts as expiring.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_API_URL=https://shop.example.com/api                    │
//! │     STOREFRONT_TOKEN=eyJhbGciOi...                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.checkout/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api, 30s timeout, "guest" cart               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [api]
//! base_url = "https://shop.example.com/api"
//! timeout_secs = 15
//!
//! [cart]
//! database_path = "/var/lib/storefront/cart.db"
//! cart_key = "guest"
//!
//! [session]
//! expiry_margin_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use storefront_db::GUEST_CART_KEY;

const CONFIG_FILE_NAME: &str = "storefront.toml";
const CART_DB_FILE_NAME: &str = "storefront.db";

// =============================================================================
// API Settings
// =============================================================================

/// Storefront REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token for authenticated calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Where the cart lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSettings {
    /// SQLite file holding the cart. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Owner key of the cart row (user id, or "guest").
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

fn default_cart_key() -> String {
    GUEST_CART_KEY.to_string()
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            database_path: None,
            cart_key: default_cart_key(),
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Session token handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// A token within this many seconds of `exp` is reported as expiring.
    #[serde(default = "default_expiry_margin")]
    pub expiry_margin_secs: u64,
}

fn default_expiry_margin() -> u64 {
    60
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            expiry_margin_secs: default_expiry_margin(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Save("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "API URL must start with http:// or https://, got: {}",
                url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.cart.cart_key.trim().is_empty() {
            return Err(ConfigError::Invalid("cart_key must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `STOREFRONT_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STOREFRONT_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("STOREFRONT_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.api.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric STOREFRONT_TIMEOUT_SECS"),
            }
        }

        if let Some(token) = lookup("STOREFRONT_TOKEN") {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(path) = lookup("STOREFRONT_CART_DB") {
            debug!(path = %path, "Overriding cart database from environment");
            self.cart.database_path = Some(PathBuf::from(path));
        }

        if let Some(margin) = lookup("STOREFRONT_EXPIRY_MARGIN_SECS") {
            match margin.parse::<u64>() {
                Ok(m) => self.session.expiry_margin_secs = m,
                Err(_) => {
                    warn!(value = %margin, "Ignoring non-numeric STOREFRONT_EXPIRY_MARGIN_SECS")
                }
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "storefront", "checkout")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Expiry margin as a `Duration`.
    pub fn expiry_margin(&self) -> Duration {
        Duration::from_secs(self.session.expiry_margin_secs)
    }

    /// Resolved cart database path, falling back to the platform data dir
    /// and then the working directory.
    pub fn cart_database_path(&self) -> PathBuf {
        if let Some(path) = &self.cart.database_path {
            return path.clone();
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(CART_DB_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CART_DB_FILE_NAME))
    }
}
