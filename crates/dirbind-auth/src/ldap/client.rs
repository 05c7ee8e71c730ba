//! LDAP connection implementation
//!
//! Wraps a synchronous `ldap3::LdapConn` behind `DirectoryConnection`.
//! Supports LDAP, LDAPS (SSL), and STARTTLS connections.

use crate::connection::{ConnectionOption, DirectoryConnection};
use crate::ldap::types::*;
use dirbind_core::{DirectoryConfig, DEFAULT_PROTOCOL_VERSION};
use ldap3::{LdapConn, LdapConnSettings};
use tracing::{debug, warn};

/// Directory connection backed by ldap3
pub struct LdapConnection {
    settings: LdapSettings,
    conn: Option<LdapConn>,
    bound: bool,
    protocol_version: u32,
    follow_referrals: bool,
    last_error: String,
}

impl LdapConnection {
    /// Create a connection for the configured server. No I/O is performed.
    pub fn new(config: &DirectoryConfig) -> dirbind_core::Result<Self> {
        Ok(Self::with_settings(LdapSettings::from_config(config)?))
    }

    pub fn with_settings(settings: LdapSettings) -> Self {
        Self {
            settings,
            conn: None,
            bound: false,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            follow_referrals: false,
            last_error: String::new(),
        }
    }

    pub fn settings(&self) -> &LdapSettings {
        &self.settings
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn follows_referrals(&self) -> bool {
        self.follow_referrals
    }

    fn record_error(&mut self, message: String) {
        debug!("LDAP error: {}", message);
        self.last_error = message;
    }

    fn shutdown(&mut self) -> bool {
        self.bound = false;

        match self.conn.take() {
            Some(mut conn) => match conn.unbind() {
                Ok(()) => true,
                Err(e) => {
                    self.record_error(format!("Unbind failed: {}", e));
                    false
                }
            },
            None => true,
        }
    }
}

impl DirectoryConnection for LdapConnection {
    fn connect(&mut self) -> bool {
        if self.conn.is_some() {
            self.shutdown();
        }

        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.settings.timeout)
            .set_starttls(self.settings.start_tls)
            .set_no_tls_verify(self.settings.skip_tls_verify);

        debug!("Connecting to LDAP server: {}", self.settings.url);

        match LdapConn::with_settings(settings, self.settings.url.as_str()) {
            Ok(conn) => {
                self.conn = Some(conn);
                self.last_error.clear();
                true
            }
            Err(e) => {
                self.record_error(format!("Failed to connect to LDAP server: {}", e));
                false
            }
        }
    }

    fn set_option(&mut self, option: ConnectionOption) -> bool {
        match option {
            ConnectionOption::ProtocolVersion(version) if version == DEFAULT_PROTOCOL_VERSION => {
                self.protocol_version = version;
                true
            }
            ConnectionOption::ProtocolVersion(version) => {
                self.record_error(format!("LDAP protocol version {} is not supported", version));
                false
            }
            ConnectionOption::FollowReferrals(follow) => {
                if follow {
                    // ldap3 hands referrals back in the result instead of chasing them
                    warn!("Referral chasing requested; referrals will be returned, not followed");
                }
                self.follow_referrals = follow;
                true
            }
        }
    }

    fn is_using_ssl(&self) -> bool {
        self.conn.is_some() && self.settings.is_secure()
    }

    fn bind(&mut self, username: &str, password: &str) -> bool {
        let timeout = self.settings.timeout;

        let Some(conn) = self.conn.as_mut() else {
            self.record_error("Not connected to an LDAP server".to_string());
            return false;
        };

        let result = conn.with_timeout(timeout).simple_bind(username, password);

        match result {
            Ok(res) if res.rc == RC_SUCCESS => {
                self.bound = true;
                self.last_error.clear();
                true
            }
            Ok(res) => {
                self.shutdown();
                self.record_error(format_result_error(res.rc, &res.text));
                false
            }
            Err(e) => {
                self.shutdown();
                self.record_error(format!("Bind failed: {}", e));
                false
            }
        }
    }

    fn is_bound(&self) -> bool {
        self.conn.is_some() && self.bound
    }

    fn last_error(&self) -> String {
        self.last_error.clone()
    }

    fn close(&mut self) -> bool {
        self.shutdown()
    }
}

impl Drop for LdapConnection {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let _ = conn.unbind();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Authenticator;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// Answer one BindRequest with `rc`, then report whether the client hung up.
    fn spawn_bind_server(rc: u8) -> (u16, mpsc::Receiver<bool>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 512];
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 4 && buf[0] == 0x30);

            // Skip the envelope length to reach the messageID
            let offset = if buf[1] & 0x80 != 0 {
                2 + (buf[1] & 0x7f) as usize
            } else {
                2
            };
            let id_len = buf[offset + 1] as usize;
            let message_id = &buf[offset..offset + 2 + id_len];

            let mut response = vec![0x30, (message_id.len() + 9) as u8];
            response.extend_from_slice(message_id);
            response.extend_from_slice(&[0x61, 0x07, 0x0a, 0x01, rc, 0x04, 0x00, 0x04, 0x00]);
            stream.write_all(&response).unwrap();

            stream
                .set_read_timeout(Some(Duration::from_secs(3)))
                .unwrap();
            let hung_up = loop {
                match stream.read(&mut buf) {
                    Ok(0) => break true,
                    Ok(_) => continue,
                    Err(_) => break false,
                }
            };
            let _ = tx.send(hung_up);
        });

        (port, rx)
    }

    fn unreachable_config() -> DirectoryConfig {
        DirectoryConfig {
            host: "127.0.0.1".to_string(),
            port: Some(1),
            timeout_seconds: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_performs_no_io() {
        let connection = LdapConnection::new(&unreachable_config()).unwrap();

        assert!(!connection.is_connected());
        assert!(!connection.is_bound());
        assert!(!connection.is_using_ssl());
        assert_eq!(connection.last_error(), "");
        assert_eq!(connection.settings().url.as_str(), "ldap://127.0.0.1:1");
    }

    #[test]
    fn test_bind_without_connect() {
        let mut connection = LdapConnection::new(&unreachable_config()).unwrap();

        assert!(!connection.bind("cn=admin,dc=example,dc=com", "admin"));
        assert!(!connection.is_bound());
        assert_eq!(connection.last_error(), "Not connected to an LDAP server");
    }

    #[test]
    fn test_connect_failure_is_recorded() {
        let mut connection = LdapConnection::new(&unreachable_config()).unwrap();

        assert!(!connection.connect());
        assert!(!connection.is_connected());
        assert!(connection
            .last_error()
            .starts_with("Failed to connect to LDAP server"));
    }

    #[test]
    fn test_set_option() {
        let mut connection = LdapConnection::new(&unreachable_config()).unwrap();

        assert!(connection.set_option(ConnectionOption::ProtocolVersion(3)));
        assert!(connection.set_option(ConnectionOption::FollowReferrals(true)));
        assert!(connection.follows_referrals());

        assert!(!connection.set_option(ConnectionOption::ProtocolVersion(2)));
        assert!(connection.last_error().contains("version 2"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut connection = LdapConnection::new(&unreachable_config()).unwrap();

        assert!(connection.close());
        assert!(connection.close());
        assert!(!connection.is_bound());
    }

    #[test]
    fn test_rejected_bind_closes_session() {
        let (port, hung_up) = spawn_bind_server(RC_INVALID_CREDENTIALS as u8);
        let config = DirectoryConfig {
            host: "127.0.0.1".to_string(),
            port: Some(port),
            timeout_seconds: 2,
            ..Default::default()
        };
        let mut connection = LdapConnection::new(&config).unwrap();

        let outcome = Authenticator::new(&mut connection, &config)
            .attempt("username", "password", false)
            .unwrap();

        assert!(!outcome.authenticated);
        assert_eq!(outcome.last_error.as_deref(), Some("Invalid credentials (rc=49)"));
        assert!(!connection.is_bound());
        assert!(!connection.is_connected());
        assert!(hung_up.recv_timeout(Duration::from_secs(5)).unwrap());
    }
}
