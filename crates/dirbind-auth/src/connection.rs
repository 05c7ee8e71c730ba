//! Directory connection capability
//!
//! The low-level session primitives the manager and authenticator drive.
//! Every call is blocking and runs to completion before returning.

#[cfg(test)]
use mockall::automock;
use serde::Serialize;

/// Protocol options applied to a connection before binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOption {
    /// LDAP protocol version
    ProtocolVersion(u32),
    /// Whether referrals returned by the server are chased
    FollowReferrals(bool),
}

/// A single session with a directory server
#[cfg_attr(test, automock)]
pub trait DirectoryConnection: Send {
    /// Establish transport to the configured server; `true` on success.
    fn connect(&mut self) -> bool;

    /// Apply a protocol or connection option. Safe to repeat before a bind.
    fn set_option(&mut self, option: ConnectionOption) -> bool;

    /// Whether the transport is currently secured with SSL/TLS.
    fn is_using_ssl(&self) -> bool;

    /// Authenticate the session as `username`.
    fn bind(&mut self, username: &str, password: &str) -> bool;

    /// Whether the session currently holds an authenticated bind.
    fn is_bound(&self) -> bool;

    /// Most recent server or library error message, empty if none.
    fn last_error(&self) -> String;

    /// Terminate the session.
    fn close(&mut self) -> bool;
}
