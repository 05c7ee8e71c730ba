//! Query scopes for directory entity kinds
//!
//! A scope pairs the manager's connection with the base DN and the object
//! filter of one entity kind. Scopes only build filters; running them is up
//! to the query layer.

use crate::connection::DirectoryConnection;
use ldap3::ldap_escape;
use serde::Serialize;

/// Filter matching every entry
pub const MATCH_ALL_FILTER: &str = "(objectClass=*)";

/// Directory entity kinds with a dedicated scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Users,
    Groups,
    Containers,
    Contacts,
    ExchangeServers,
    Computers,
    Printers,
}

impl ScopeKind {
    pub const ALL: [ScopeKind; 7] = [
        ScopeKind::Users,
        ScopeKind::Groups,
        ScopeKind::Containers,
        ScopeKind::Contacts,
        ScopeKind::ExchangeServers,
        ScopeKind::Computers,
        ScopeKind::Printers,
    ];

    /// Active Directory filter selecting entries of this kind
    pub fn object_filter(&self) -> &'static str {
        match self {
            ScopeKind::Users => "(&(objectCategory=person)(objectClass=user))",
            ScopeKind::Groups => "(objectCategory=group)",
            ScopeKind::Containers => "(objectCategory=container)",
            ScopeKind::Contacts => "(&(objectCategory=person)(objectClass=contact))",
            ScopeKind::ExchangeServers => "(objectCategory=msExchExchangeServer)",
            ScopeKind::Computers => "(objectCategory=computer)",
            ScopeKind::Printers => "(objectCategory=printQueue)",
        }
    }
}

/// Filter builder over a borrowed connection
pub struct Query<'a, C> {
    connection: &'a C,
    base_dn: &'a str,
    clauses: Vec<String>,
}

impl<'a, C: DirectoryConnection> Query<'a, C> {
    fn new(connection: &'a C, base_dn: &'a str) -> Self {
        Self {
            connection,
            base_dn,
            clauses: Vec::new(),
        }
    }

    pub fn connection(&self) -> &'a C {
        self.connection
    }

    pub fn base_dn(&self) -> &'a str {
        self.base_dn
    }

    /// Add a raw filter clause, e.g. `(mail=*)`
    pub fn where_raw(mut self, clause: impl Into<String>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    /// Add an equality clause with the value escaped
    pub fn where_equals(self, attribute: &str, value: &str) -> Self {
        let clause = format!("({}={})", attribute, ldap_escape(value));
        self.where_raw(clause)
    }

    /// The combined LDAP filter
    pub fn filter(&self) -> String {
        match self.clauses.as_slice() {
            [] => MATCH_ALL_FILTER.to_string(),
            [single] => single.clone(),
            clauses => format!("(&{})", clauses.concat()),
        }
    }
}

/// Query scope for one entity kind
pub struct Scope<'a, C> {
    kind: ScopeKind,
    query: Query<'a, C>,
}

impl<'a, C: DirectoryConnection> Scope<'a, C> {
    pub fn new(connection: &'a C, base_dn: &'a str, kind: ScopeKind) -> Self {
        Self {
            kind,
            query: Query::new(connection, base_dn).where_raw(kind.object_filter()),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn connection(&self) -> &'a C {
        self.query.connection()
    }

    pub fn base_dn(&self) -> &'a str {
        self.query.base_dn()
    }

    pub fn filter(&self) -> String {
        self.query.filter()
    }

    /// Narrow the scope with an equality clause
    pub fn where_equals(mut self, attribute: &str, value: &str) -> Self {
        self.query = self.query.where_equals(attribute, value);
        self
    }

    pub fn into_query(self) -> Query<'a, C> {
        self.query
    }
}

/// Entry point for free-form searches
pub struct SearchFactory<'a, C> {
    connection: &'a C,
    base_dn: &'a str,
}

impl<'a, C: DirectoryConnection> SearchFactory<'a, C> {
    pub fn new(connection: &'a C, base_dn: &'a str) -> Self {
        Self { connection, base_dn }
    }

    /// Query matching every entry under the base DN
    pub fn new_query(&self) -> Query<'a, C> {
        Query::new(self.connection, self.base_dn)
    }

    pub fn scope(&self, kind: ScopeKind) -> Scope<'a, C> {
        Scope::new(self.connection, self.base_dn, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MockDirectoryConnection;

    const BASE_DN: &str = "dc=corp,dc=local";

    #[test]
    fn test_scope_filters() {
        let connection = MockDirectoryConnection::new();

        for kind in ScopeKind::ALL {
            let scope = Scope::new(&connection, BASE_DN, kind);
            assert_eq!(scope.filter(), kind.object_filter());
            assert_eq!(scope.base_dn(), BASE_DN);
        }
    }

    #[test]
    fn test_where_equals_escapes_values() {
        let connection = MockDirectoryConnection::new();

        let scope = Scope::new(&connection, BASE_DN, ScopeKind::Groups)
            .where_equals("cn", "Sales (EMEA)*");

        assert_eq!(
            scope.filter(),
            "(&(objectCategory=group)(cn=Sales \\28EMEA\\29\\2a))"
        );
    }

    #[test]
    fn test_search_factory() {
        let connection = MockDirectoryConnection::new();
        let search = SearchFactory::new(&connection, BASE_DN);

        assert_eq!(search.new_query().filter(), MATCH_ALL_FILTER);
        assert_eq!(
            search.new_query().where_raw("(mail=*)").filter(),
            "(mail=*)"
        );
        assert_eq!(search.scope(ScopeKind::Printers).kind(), ScopeKind::Printers);
    }
}
