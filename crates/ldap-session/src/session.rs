//! Connection session.
//!
//! Owns one authenticated link to a directory server and exposes a single
//! search operation. The connection is established lazily and re-established
//! the same way after a transport failure: the spawned driver task clears the
//! cached handle when the connection dies, so the next call reconnects and
//! rebinds. A rejected bind is logged and leaves the connection usable for
//! unauthenticated searches.

use std::sync::Arc;
use std::time::Duration;

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, ResultEntry, Scope, SearchEntry};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::LdapConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::record::DirectoryRecord;

/// Connection lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection; the next search will connect.
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Connected, but the bind was rejected; searches run unauthenticated
    /// until the next reconnect rebinds.
    ConnectedUnbound,
    /// Connected and bound.
    ConnectedBound,
    /// Connection attempt after an earlier established connection was lost.
    Reconnecting,
}

struct SessionInner {
    handle: Option<Ldap>,
    state: SessionState,
    was_connected: bool,
    /// Identifies the currently installed connection. Bumped on every
    /// install and invalidation so a stale driver task cannot clobber a
    /// newer connection.
    generation: u64,
}

impl SessionInner {
    /// Drop the cached handle, but only if `generation` still identifies it.
    fn invalidate(&mut self, generation: u64) {
        if self.generation == generation {
            self.generation = self.generation.wrapping_add(1);
            self.handle = None;
            self.state = SessionState::Disconnected;
        }
    }
}

/// An owned, lazily connecting session against one directory server.
///
/// Concurrent [`search`](LdapSession::search) calls are independent: each
/// clones the cached handle, which multiplexes requests over the single
/// underlying connection, and accumulates its own result sequence.
pub struct LdapSession {
    config: LdapConfig,
    inner: Arc<RwLock<SessionInner>>,
}

impl LdapSession {
    /// Create a new session with the given configuration.
    ///
    /// No connection is opened yet; the first search connects and binds.
    pub fn new(config: LdapConfig) -> DirectoryResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            inner: Arc::new(RwLock::new(SessionInner {
                handle: None,
                state: SessionState::Disconnected,
                was_connected: false,
                generation: 0,
            })),
        })
    }

    /// The current connection lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    /// Get a connection handle, creating one if necessary.
    async fn get_connection(&self) -> DirectoryResult<Ldap> {
        {
            let guard = self.inner.read().await;
            if let Some(ref handle) = guard.handle {
                return Ok(handle.clone());
            }
        }

        self.connect_and_bind().await
    }

    /// Open a connection, spawn its driver, and attempt to bind.
    async fn connect_and_bind(&self) -> DirectoryResult<Ldap> {
        // Reserve a generation for the connection being built; concurrent
        // connects each get their own.
        let generation = {
            let mut guard = self.inner.write().await;
            guard.state = if guard.was_connected {
                SessionState::Reconnecting
            } else {
                SessionState::Connecting
            };
            guard.generation = guard.generation.wrapping_add(1);
            guard.generation
        };

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connect_timeout_secs));

        debug!(url = %self.config.url, "connecting to directory server");

        let (conn, mut handle) =
            match LdapConnAsync::with_settings(settings, self.config.url.as_str()).await {
                Ok(pair) => pair,
                Err(e) => {
                    self.inner.write().await.invalidate(generation);
                    warn!(error = %e, url = %self.config.url, "directory connection failed");
                    return Err(DirectoryError::connection_failed_with_source(
                        format!("failed to connect to {}", self.config.url),
                        e,
                    ));
                }
            };

        // Drive the connection until it dies, then drop the cached handle so
        // the next call reconnects and rebinds. The generation check keeps a
        // late-waking driver from clobbering a newer connection.
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "directory connection lost, will reconnect on next call");
            }
            inner.write().await.invalidate(generation);
        });

        // A rejected bind is non-fatal: the connection stays usable for
        // unauthenticated searches and rebinds on the next reconnect.
        debug!(bind_dn = %self.config.bind_dn, "performing directory bind");

        let state = match handle
            .simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
        {
            Ok(result) if result.rc == 0 => {
                info!(url = %self.config.url, "directory connection established and bound");
                SessionState::ConnectedBound
            }
            Ok(result) => {
                warn!(
                    rc = result.rc,
                    text = %result.text,
                    bind_dn = %self.config.bind_dn,
                    "directory bind rejected, continuing unauthenticated"
                );
                SessionState::ConnectedUnbound
            }
            Err(e) => {
                warn!(error = %e, "directory bind failed, continuing unauthenticated");
                SessionState::ConnectedUnbound
            }
        };

        let mut guard = self.inner.write().await;
        // Skip the install if the driver already invalidated this connection
        // or a newer connect superseded it; the handle still serves this call.
        if guard.generation == generation {
            guard.handle = Some(handle.clone());
            guard.state = state;
        }
        guard.was_connected = true;

        Ok(handle)
    }

    /// Force a bind attempt on the current connection, surfacing the outcome
    /// that the lazy connect path only logs.
    ///
    /// Connects first if necessary. On rejection the session stays usable
    /// for unauthenticated searches, exactly as after a lazy bind failure.
    pub async fn bind(&self) -> DirectoryResult<()> {
        let mut handle = self.get_connection().await?;

        let result = handle
            .simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
            .map_err(|e| {
                DirectoryError::connection_failed_with_source("bind request failed", e)
            })?;

        let mut guard = self.inner.write().await;
        if result.rc == 0 {
            guard.state = SessionState::ConnectedBound;
            Ok(())
        } else {
            guard.state = SessionState::ConnectedUnbound;
            Err(DirectoryError::bind_failed(format!(
                "bind rejected with code {}: {}",
                result.rc, result.text
            )))
        }
    }

    /// Translate raw search messages into records.
    ///
    /// SearchResultReference messages (continuation referrals, routine in
    /// subtree searches against Active Directory) carry no entry and are
    /// skipped. Entries translate in delivery order; any translation failure
    /// discards the accumulated records and fails the whole call.
    fn collect_records(entries: Vec<ResultEntry>) -> DirectoryResult<Vec<DirectoryRecord>> {
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.is_ref() {
                continue;
            }
            records.push(DirectoryRecord::from_entry(SearchEntry::construct(entry))?);
        }
        Ok(records)
    }

    /// Run one subtree search rooted at the configured base DN.
    ///
    /// `attributes` restricts which attributes the server returns; `None`
    /// requests the server default set. The filter string is passed through
    /// unvalidated; a malformed filter surfaces as a failed search.
    ///
    /// Entries accumulate strictly in server-delivery order and the call
    /// resolves only after the server signals end-of-results. If any error
    /// arrives before that, already-accumulated entries are discarded and
    /// the whole call fails; the caller must reissue the search.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &str,
        attributes: Option<&[&str]>,
    ) -> DirectoryResult<Vec<DirectoryRecord>> {
        let mut handle = self.get_connection().await?;

        let attrs: Vec<String> = match attributes {
            Some(list) => list.iter().map(|s| (*s).to_string()).collect(),
            None => vec!["*".to_string()],
        };

        debug!(filter = %filter, base_dn = %self.config.base_dn, "searching directory");

        let mut stream = handle
            .streaming_search(&self.config.base_dn, Scope::Subtree, filter, attrs)
            .await
            .map_err(|e| {
                DirectoryError::search_failed_with_source("failed to start search", e)
            })?;

        // Drain the raw message stream before translating anything, so that
        // finish() runs on every outcome and scrubs this search's message id
        // from the long-lived multiplexed handle.
        let mut raw = Vec::new();
        let stream_error = loop {
            match stream.next().await {
                Ok(Some(entry)) => raw.push(entry),
                Ok(None) => break None,
                Err(e) => break Some(e),
            }
        };
        let result = stream.finish().await;

        if let Some(e) = stream_error {
            return Err(DirectoryError::search_failed_with_source(
                "search aborted before end-of-results",
                e,
            ));
        }

        if result.rc != 0 {
            return Err(DirectoryError::search_rejected(result.rc, result.text));
        }

        let records = Self::collect_records(raw)?;

        info!(count = records.len(), "directory search completed");

        Ok(records)
    }

    /// Unbind and drop the connection, returning the session to
    /// [`SessionState::Disconnected`]. The next search reconnects.
    pub async fn close(&self) -> DirectoryResult<()> {
        let mut guard = self.inner.write().await;
        guard.state = SessionState::Disconnected;
        // Invalidate so the old connection's driver cannot touch whatever
        // connection comes next.
        guard.generation = guard.generation.wrapping_add(1);

        if let Some(mut handle) = guard.handle.take() {
            if let Err(e) = handle.unbind().await {
                warn!(error = %e, "error during directory unbind");
            }
            info!("directory session closed");
        }

        Ok(())
    }
}

impl std::fmt::Debug for LdapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSession")
            .field("config", &self.config.redacted())
            .finish()
    }
}
