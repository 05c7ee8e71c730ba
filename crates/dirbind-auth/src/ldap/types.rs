//! LDAP result codes and connection settings

use dirbind_core::DirectoryConfig;
use std::time::Duration;
use url::Url;

// ============================================================================
// Result Codes
// ============================================================================

/// Result code of a successful operation
pub const RC_SUCCESS: u32 = 0;

/// Result code returned for a wrong DN or password
pub const RC_INVALID_CREDENTIALS: u32 = 49;

/// Describe an LDAP result code (RFC 4511, section 4.1.9)
pub fn describe_result_code(rc: u32) -> &'static str {
    match rc {
        0 => "Success",
        1 => "Operations error",
        2 => "Protocol error",
        3 => "Time limit exceeded",
        7 => "Auth method not supported",
        8 => "Stronger auth required",
        10 => "Referral",
        13 => "Confidentiality required",
        32 => "No such object",
        34 => "Invalid DN syntax",
        48 => "Inappropriate authentication",
        49 => "Invalid credentials",
        50 => "Insufficient access",
        51 => "Busy",
        52 => "Unavailable",
        53 => "Unwilling to perform",
        80 => "Other",
        _ => "Unknown error",
    }
}

/// Format a non-success bind result for `last_error`
pub fn format_result_error(rc: u32, text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        format!("{} (rc={})", describe_result_code(rc), rc)
    } else {
        format!("{}: {} (rc={})", describe_result_code(rc), text, rc)
    }
}

// ============================================================================
// Connection Settings
// ============================================================================

/// Transport settings resolved from `DirectoryConfig`
#[derive(Debug, Clone)]
pub struct LdapSettings {
    /// ldap:// or ldaps:// URL of the server
    pub url: Url,

    /// Upgrade with STARTTLS after connecting
    pub start_tls: bool,

    /// Skip TLS certificate verification
    pub skip_tls_verify: bool,

    /// Connect and operation timeout
    pub timeout: Duration,
}

impl LdapSettings {
    pub fn from_config(config: &DirectoryConfig) -> dirbind_core::Result<Self> {
        Ok(Self {
            url: config.server_url()?,
            start_tls: config.use_tls,
            skip_tls_verify: config.skip_tls_verify,
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    /// Whether the transport is encrypted once connected
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "ldaps" || self.start_tls
    }
}
