//! Connection manager
//!
//! Owns one directory connection and its configuration. All authentication
//! and query scopes go through the manager, so a connection is never driven
//! by two attempts at once. Callers needing several sessions build several
//! managers.

use crate::auth::Authenticator;
use crate::connection::DirectoryConnection;
use crate::ldap::LdapConnection;
use crate::scopes::{Scope, ScopeKind, SearchFactory};
use dirbind_core::DirectoryConfig;
use tracing::debug;

pub struct ConnectionManager<C: DirectoryConnection> {
    connection: C,
    config: DirectoryConfig,
}

impl ConnectionManager<LdapConnection> {
    /// Create a manager over an ldap3 connection to the configured server
    pub fn ldap(config: DirectoryConfig) -> dirbind_core::Result<Self> {
        config.validate()?;
        let connection = LdapConnection::new(&config)?;
        Ok(Self::new(connection, config))
    }
}

impl<C: DirectoryConnection> ConnectionManager<C> {
    pub fn new(connection: C, config: DirectoryConfig) -> Self {
        debug!("Creating connection manager for {}", config.host);
        Self { connection, config }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn configuration(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Authenticator bound to this manager's connection and configuration
    pub fn auth(&mut self) -> Authenticator<'_, C> {
        Authenticator::new(&mut self.connection, &self.config)
    }

    pub fn into_parts(self) -> (C, DirectoryConfig) {
        (self.connection, self.config)
    }

    // ========================================================================
    // Query scopes
    // ========================================================================

    pub fn scope(&self, kind: ScopeKind) -> Scope<'_, C> {
        Scope::new(&self.connection, &self.config.base_dn, kind)
    }

    pub fn users(&self) -> Scope<'_, C> {
        self.scope(ScopeKind::Users)
    }

    pub fn groups(&self) -> Scope<'_, C> {
        self.scope(ScopeKind::Groups)
    }

    pub fn containers(&self) -> Scope<'_, C> {
        self.scope(ScopeKind::Containers)
    }

    pub fn contacts(&self) -> Scope<'_, C> {
        self.scope(ScopeKind::Contacts)
    }

    pub fn exchange_servers(&self) -> Scope<'_, C> {
        self.scope(ScopeKind::ExchangeServers)
    }

    pub fn computers(&self) -> Scope<'_, C> {
        self.scope(ScopeKind::Computers)
    }

    pub fn printers(&self) -> Scope<'_, C> {
        self.scope(ScopeKind::Printers)
    }

    pub fn search(&self) -> SearchFactory<'_, C> {
        SearchFactory::new(&self.connection, &self.config.base_dn)
    }
}
