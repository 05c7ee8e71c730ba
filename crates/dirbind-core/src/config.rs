//! Configuration for dirbind

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirbindConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DirbindConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from `DIRBIND_*` variables resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let flag = |key: &str| lookup(key).map(|v| v == "true" || v == "1");

        if let Some(host) = lookup("DIRBIND_HOST") {
            config.directory.host = host;
        }
        if let Some(port) = lookup("DIRBIND_PORT") {
            if let Ok(p) = port.parse() {
                config.directory.port = Some(p);
            }
        }
        if let Some(base_dn) = lookup("DIRBIND_BASE_DN") {
            config.directory.base_dn = base_dn;
        }
        if let Some(username) = lookup("DIRBIND_ADMIN_USERNAME") {
            config.directory.admin_username = Some(username);
        }
        if let Some(password) = lookup("DIRBIND_ADMIN_PASSWORD") {
            config.directory.admin_password = Some(password);
        }
        if let Some(ssl) = flag("DIRBIND_USE_SSL") {
            config.directory.use_ssl = ssl;
        }
        if let Some(tls) = flag("DIRBIND_USE_TLS") {
            config.directory.use_tls = tls;
        }
        if let Some(referrals) = flag("DIRBIND_FOLLOW_REFERRALS") {
            config.directory.follow_referrals = referrals;
        }
        if let Some(timeout) = lookup("DIRBIND_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                config.directory.timeout_seconds = t;
            }
        }
        if let Some(level) = lookup("DIRBIND_LOG_LEVEL") {
            config.logging.level = level;
        }

        config
    }
}

/// Directory server connection and administrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory server host name or address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port; defaults to 389, or 636 when `use_ssl` is set
    #[serde(default)]
    pub port: Option<u16>,

    /// Base DN used by query scopes
    /// Example: "dc=corp,dc=example,dc=com"
    #[serde(default)]
    pub base_dn: String,

    /// Administrator account used to rebind after a user authenticates
    #[serde(default)]
    pub admin_username: Option<String>,

    /// Administrator password
    #[serde(default)]
    pub admin_password: Option<String>,

    /// LDAP protocol version
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,

    /// Chase referrals returned by the server
    #[serde(default)]
    pub follow_referrals: bool,

    /// Connect over LDAPS
    #[serde(default)]
    pub use_ssl: bool,

    /// Upgrade a plain connection with STARTTLS
    #[serde(default)]
    pub use_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Connect and bind timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_protocol_version() -> u32 {
    crate::DEFAULT_PROTOCOL_VERSION
}

fn default_timeout() -> u64 {
    5
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            base_dn: String::new(),
            admin_username: None,
            admin_password: None,
            protocol_version: default_protocol_version(),
            follow_referrals: false,
            use_ssl: false,
            use_tls: false,
            skip_tls_verify: false,
            timeout_seconds: default_timeout(),
        }
    }
}

impl DirectoryConfig {
    pub fn set_admin_username(&mut self, username: impl Into<String>) -> &mut Self {
        self.admin_username = Some(username.into());
        self
    }

    pub fn set_admin_password(&mut self, password: impl Into<String>) -> &mut Self {
        self.admin_password = Some(password.into());
        self
    }

    /// Administrator credentials, only when both halves are present.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        let username = self.admin_username.as_deref().filter(|u| !u.trim().is_empty())?;
        let password = self.admin_password.as_deref().filter(|p| !p.trim().is_empty())?;
        Some((username, password))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(if self.use_ssl {
            crate::DEFAULT_LDAPS_PORT
        } else {
            crate::DEFAULT_LDAP_PORT
        })
    }

    pub fn server_url(&self) -> crate::Result<Url> {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        let raw = format!("{}://{}:{}", scheme, self.host, self.port());

        Url::parse(&raw)
            .map_err(|e| crate::Error::InvalidConfig(format!("Invalid server URL {}: {}", raw, e)))
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::InvalidConfig("Host is required".into()));
        }

        if !(2..=3).contains(&self.protocol_version) {
            return Err(crate::Error::InvalidConfig(format!(
                "Unsupported protocol version: {}",
                self.protocol_version
            )));
        }

        if self.use_ssl && self.use_tls {
            return Err(crate::Error::InvalidConfig(
                "use_ssl and use_tls cannot both be enabled".into(),
            ));
        }

        let has_username = self.admin_username.as_deref().is_some_and(|u| !u.trim().is_empty());
        let has_password = self.admin_password.as_deref().is_some_and(|p| !p.trim().is_empty());
        if has_username != has_password {
            return Err(crate::Error::InvalidConfig(
                "admin_username and admin_password must be set together".into(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(crate::Error::InvalidConfig(
                "timeout_seconds must be greater than zero".into(),
            ));
        }

        self.server_url().map(|_| ())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
