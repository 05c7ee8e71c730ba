//! User authentication against a directory connection
//!
//! An attempt runs through a fixed sequence:
//!
//! 1. validate the username and password
//! 2. connect and apply protocol options
//! 3. bind as the user
//! 4. rebind as the administrator, unless `stay_bound` is set or no admin
//!    credentials are configured
//! 5. capture the last error and close the connection if it is bound
//!
//! Malformed input is an `Err`. Everything after validation, including
//! connection failures, is reported through `AuthOutcome`.

use crate::connection::{ConnectionOption, DirectoryConnection};
use dirbind_core::{DirectoryConfig, Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Why the administrator rebind did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The caller asked to stay bound as the user
    StayBound,
    /// Admin username and password are not both configured
    NoAdminCredentials,
    /// The user bind did not succeed
    UserBindFailed,
}

/// Result of the administrator rebind step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RebindOutcome {
    Skipped(SkipReason),
    Succeeded,
    Failed,
}

/// Outcome of a single authentication attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    /// Whether the user's own credentials were accepted
    pub authenticated: bool,

    /// What happened to the administrator rebind. Does not affect `authenticated`.
    pub rebind: RebindOutcome,

    /// Last error reported by the connection, if any
    pub last_error: Option<String>,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn rebind_failed(&self) -> bool {
        self.rebind == RebindOutcome::Failed
    }
}

/// Authenticates users over a manager's connection
pub struct Authenticator<'a, C: DirectoryConnection> {
    connection: &'a mut C,
    config: &'a DirectoryConfig,
}

impl<'a, C: DirectoryConnection> Authenticator<'a, C> {
    pub fn new(connection: &'a mut C, config: &'a DirectoryConfig) -> Self {
        Self { connection, config }
    }

    /// Authenticate `username` with `password`.
    ///
    /// Fails with `Error::UsernameRequired` or `Error::PasswordRequired` when
    /// either is blank. Otherwise returns an outcome whose `authenticated`
    /// flag reflects the user bind only. The connection is closed before
    /// returning whenever it is bound.
    pub fn attempt(&mut self, username: &str, password: &str, stay_bound: bool) -> Result<AuthOutcome> {
        if let Err(e) = validate_credentials(username, password) {
            self.close_if_bound();
            return Err(e);
        }

        let outcome = self.run(username, password, stay_bound);
        self.close_if_bound();

        info!(
            username = %username,
            authenticated = outcome.authenticated,
            rebind = ?outcome.rebind,
            "Authentication attempt finished"
        );

        Ok(outcome)
    }

    fn run(&mut self, username: &str, password: &str, stay_bound: bool) -> AuthOutcome {
        if !self.connection.connect() {
            warn!("Failed to connect to directory server");
            return self.failed(RebindOutcome::Skipped(SkipReason::UserBindFailed));
        }

        if !self.configure() {
            return self.failed(RebindOutcome::Skipped(SkipReason::UserBindFailed));
        }

        if !self.connection.is_using_ssl() && (self.config.use_ssl || self.config.use_tls) {
            warn!("SSL/TLS is configured but the connection is not encrypted");
        }

        debug!("Binding as user: {}", username);
        let authenticated = self.connection.bind(username, password);

        let rebind = if !authenticated {
            RebindOutcome::Skipped(SkipReason::UserBindFailed)
        } else if stay_bound {
            RebindOutcome::Skipped(SkipReason::StayBound)
        } else {
            match self.config.admin_credentials() {
                Some((admin_username, admin_password)) => {
                    debug!("Rebinding as administrator: {}", admin_username);
                    if self.connection.bind(admin_username, admin_password) {
                        RebindOutcome::Succeeded
                    } else {
                        warn!("Administrator rebind failed");
                        RebindOutcome::Failed
                    }
                }
                None => RebindOutcome::Skipped(SkipReason::NoAdminCredentials),
            }
        };

        AuthOutcome {
            authenticated,
            rebind,
            last_error: self.last_error(),
        }
    }

    /// Apply protocol version then referral handling.
    fn configure(&mut self) -> bool {
        let options = [
            ConnectionOption::ProtocolVersion(self.config.protocol_version),
            ConnectionOption::FollowReferrals(self.config.follow_referrals),
        ];

        for option in options {
            if !self.connection.set_option(option) {
                warn!("Failed to apply connection option {:?}", option);
                return false;
            }
        }

        true
    }

    fn failed(&mut self, rebind: RebindOutcome) -> AuthOutcome {
        AuthOutcome {
            authenticated: false,
            rebind,
            last_error: self.last_error(),
        }
    }

    fn last_error(&self) -> Option<String> {
        Some(self.connection.last_error()).filter(|e| !e.is_empty())
    }

    fn close_if_bound(&mut self) {
        if self.connection.is_bound() {
            debug!("Closing directory connection");
            self.connection.close();
        }
    }
}

/// Blank means empty after trimming Unicode whitespace. NUL is not whitespace.
fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::UsernameRequired);
    }

    if password.trim().is_empty() {
        return Err(Error::PasswordRequired);
    }

    Ok(())
}
