//! Directory connection management and authentication for dirbind

pub mod auth;
pub mod connection;
pub mod ldap;
pub mod manager;
pub mod scopes;

pub use auth::{AuthOutcome, Authenticator, RebindOutcome, SkipReason};
pub use connection::{ConnectionOption, DirectoryConnection};
pub use ldap::LdapConnection;
pub use manager::ConnectionManager;
pub use scopes::{Query, Scope, ScopeKind, SearchFactory};
