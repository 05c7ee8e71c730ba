//! LDAP/Active Directory connection module
//!
//! Provides the `DirectoryConnection` implementation backed by `ldap3`:
//! - LDAP and LDAPS transports
//! - STARTTLS upgrade
//! - Simple binds with connect and operation timeouts

mod client;
mod types;

pub use client::LdapConnection;
pub use types::*;
