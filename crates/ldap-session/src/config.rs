//! Session configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DirectoryError, DirectoryResult};

/// Configuration for a directory session.
///
/// Immutable after construction; owned by the session for its lifetime.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Directory server URL, including scheme and port
    /// (e.g., "ldap://ds.example.com:389" or "ldaps://ds.example.com:636").
    pub url: Url,

    /// Base DN for all searches (e.g., "dc=example,dc=com").
    pub base_dn: String,

    /// Bind DN for authentication (e.g., "cn=reader,dc=example,dc=com").
    pub bind_dn: String,

    /// Bind password. Never logged; redacted from Debug output.
    pub bind_password: String,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl LdapConfig {
    /// Create a new config with required fields.
    pub fn new(url: Url, base_dn: impl Into<String>, bind_dn: impl Into<String>) -> Self {
        Self {
            url,
            base_dn: base_dn.into(),
            bind_dn: bind_dn.into(),
            bind_password: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Set the bind password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = password.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        match self.url.scheme() {
            "ldap" | "ldaps" => {}
            other => {
                return Err(DirectoryError::invalid_configuration(format!(
                    "unsupported URL scheme '{other}', expected ldap or ldaps"
                )));
            }
        }

        if self.base_dn.is_empty() {
            return Err(DirectoryError::invalid_configuration("base_dn is required"));
        }

        if self.bind_dn.is_empty() {
            return Err(DirectoryError::invalid_configuration("bind_dn is required"));
        }

        Ok(())
    }

    /// A clone with the password replaced, safe to display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.bind_password.is_empty() {
            config.bind_password = "***REDACTED***".to_string();
        }
        config
    }
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("url", &self.url.as_str())
            .field("base_dn", &self.base_dn)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"***REDACTED***")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LdapConfig {
        LdapConfig::new(
            Url::parse("ldap://ds.example.com:389").unwrap(),
            "dc=example,dc=com",
            "cn=reader,dc=example,dc=com",
        )
        .with_password("secret")
    }

    #[test]
    fn test_config_new() {
        let config = config();
        assert_eq!(config.url.as_str(), "ldap://ds.example.com:389");
        assert_eq!(config.base_dn, "dc=example,dc=com");
        assert_eq!(config.bind_password, "secret");
        assert_eq!(config.connect_timeout_secs, 30);
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());

        let mut empty_base = config();
        empty_base.base_dn.clear();
        assert!(empty_base.validate().is_err());

        let mut empty_bind = config();
        empty_bind.bind_dn.clear();
        assert!(empty_bind.validate().is_err());

        let mut bad_scheme = config();
        bad_scheme.url = Url::parse("http://ds.example.com").unwrap();
        assert!(bad_scheme.validate().is_err());
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("***REDACTED***"));
    }

    #[test]
    fn test_config_redacted() {
        let redacted = config().redacted();
        assert_eq!(redacted.bind_password, "***REDACTED***");

        // An unset password stays empty rather than pretending one exists.
        let no_password = LdapConfig::new(
            Url::parse("ldap://ds.example.com").unwrap(),
            "dc=example,dc=com",
            "cn=reader,dc=example,dc=com",
        );
        assert_eq!(no_password.redacted().bind_password, "");
    }

    #[test]
    fn test_config_serialization() {
        let json = serde_json::to_string(&config()).unwrap();
        let parsed: LdapConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.url.as_str(), "ldap://ds.example.com:389");
        assert_eq!(parsed.bind_dn, "cn=reader,dc=example,dc=com");
    }

    #[test]
    fn test_config_timeout_default_on_deserialize() {
        let parsed: LdapConfig = serde_json::from_str(
            r#"{
                "url": "ldaps://ds.example.com:636",
                "base_dn": "dc=example,dc=com",
                "bind_dn": "cn=reader,dc=example,dc=com",
                "bind_password": "secret"
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.connect_timeout_secs, 30);
    }
}
