//! # ldap-session
//!
//! A minimal directory-access client: bind to an LDAP server, run a subtree
//! search, and normalize a few binary attributes into consumable forms.
//!
//! The crate has two responsibilities:
//!
//! - [`LdapSession`] - owns one lazily (re)connecting, authenticated link to
//!   a directory server and exposes a single search operation.
//! - [`DirectoryRecord`] - the translation of one raw search entry into a
//!   typed attribute mapping, with `objectGUID` decoded into its canonical
//!   hyphenated string form and `thumbnailPhoto` / `jpegPhoto` carried as
//!   raw bytes.
//!
//! Connection lifecycle, request multiplexing and transport security belong
//! to the underlying [`ldap3`] client; this crate only configures them.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), ldap_session::DirectoryError> {
//! use ldap_session::{LdapConfig, LdapSession};
//! use url::Url;
//!
//! let config = LdapConfig::new(
//!     Url::parse("ldap://ds.example.com:389").expect("valid url"),
//!     "dc=example,dc=com",
//!     "cn=reader,dc=example,dc=com",
//! )
//! .with_password("secret");
//!
//! let session = LdapSession::new(config)?;
//! let records = session
//!     .search("(objectClass=inetOrgPerson)", Some(&["cn", "objectGUID"]))
//!     .await?;
//!
//! for record in &records {
//!     println!("{:?} {:?}", record.dn(), record.object_guid());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate organization
//!
//! - [`config`] - session configuration with secret redaction
//! - [`error`] - error types with transient/permanent classification
//! - [`guid`] - the byte-order-sensitive objectGUID reformatting routine
//! - [`record`] - typed attribute values and entry translation
//! - [`session`] - the connection session and its state machine

pub mod config;
pub mod error;
pub mod guid;
pub mod record;
pub mod session;

pub use config::LdapConfig;
pub use error::{DirectoryError, DirectoryResult};
pub use guid::format_guid;
pub use record::{AttributeValue, DirectoryRecord};
pub use session::{LdapSession, SessionState};

// Re-export the transport crate for callers that need its types directly.
pub use ldap3;
