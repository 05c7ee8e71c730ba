//! Dirbind Core Library
//!
//! Configuration and error types shared by the dirbind crates.

pub mod config;
pub mod error;

pub use config::{DirbindConfig, DirectoryConfig, LoggingConfig};
pub use error::{Error, Result};

/// Dirbind version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default plain LDAP port
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Default LDAPS port
pub const DEFAULT_LDAPS_PORT: u16 = 636;

/// Default LDAP protocol version
pub const DEFAULT_PROTOCOL_VERSION: u32 = 3;
