//! Registry of running matches
//!
//! Maps match codes to the handles of their tasks, and connections to the
//! code they last joined so a transport disconnect can be routed. Both maps
//! sit behind `parking_lot` locks that are never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rand::Rng;
use shared::TimeControl;
use tracing::{debug, info};

use crate::actor::{self, Command, MatchHandle};
use crate::config::MatchSettings;
use crate::error::{MatchError, ServerResult};
use crate::session::{ConnId, MatchSession};

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;

#[derive(Clone)]
pub struct MatchRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    matches: RwLock<HashMap<String, MatchHandle>>,
    connections: RwLock<HashMap<ConnId, String>>,
    settings: MatchSettings,
}

impl RegistryInner {
    fn remove(&self, code: &str) -> Option<MatchHandle> {
        let removed = self.matches.write().remove(code);
        if removed.is_some() {
            self.connections.write().retain(|_, bound| bound != code);
        }
        removed
    }
}

fn generate_match_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

impl MatchRegistry {
    pub fn new(settings: MatchSettings) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                matches: RwLock::new(HashMap::new()),
                connections: RwLock::new(HashMap::new()),
                settings,
            }),
        }
    }

    /// Create a match for a time-control selector and return its code
    ///
    /// The selector is validated before anything is registered.
    pub fn create(&self, time_control: &str) -> ServerResult<String> {
        let time_control: TimeControl = time_control.parse()?;

        let mut matches = self.inner.matches.write();
        let code = loop {
            let candidate = generate_match_code();
            if !matches.contains_key(&candidate) {
                break candidate;
            }
        };

        let session = MatchSession::new(code.clone(), time_control, self.inner.settings.clock_mode);
        let handle = actor::spawn(session, self.inner.settings, self.exit_hook(code.clone()));
        matches.insert(code.clone(), handle);
        drop(matches);

        info!(%code, %time_control, "Match created");
        Ok(code)
    }

    /// Remove the entry for `code` once its task stops, unless it was replaced
    fn exit_hook(&self, code: String) -> impl FnOnce() + Send + 'static {
        let registry: Weak<RegistryInner> = Arc::downgrade(&self.inner);
        move || {
            let Some(inner) = registry.upgrade() else {
                return;
            };
            let stale = inner
                .matches
                .read()
                .get(&code)
                .is_some_and(MatchHandle::is_closed);
            if stale {
                inner.remove(&code);
                debug!(%code, "Match removed");
            }
        }
    }

    pub fn get(&self, code: &str) -> ServerResult<MatchHandle> {
        self.inner
            .matches
            .read()
            .get(code)
            .cloned()
            .ok_or_else(|| MatchError::InvalidCode(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.inner.matches.read().contains_key(code)
    }

    pub fn remove(&self, code: &str) -> Option<MatchHandle> {
        self.inner.remove(code)
    }

    pub fn len(&self) -> usize {
        self.inner.matches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record that `conn` joined `code`, returning the previous binding if different
    pub fn bind_connection(&self, conn: ConnId, code: &str) -> Option<String> {
        self.inner
            .connections
            .write()
            .insert(conn, code.to_string())
            .filter(|previous| previous != code)
    }

    pub fn connection_code(&self, conn: ConnId) -> Option<String> {
        self.inner.connections.read().get(&conn).cloned()
    }

    pub fn unbind_connection(&self, conn: ConnId) -> Option<String> {
        self.inner.connections.write().remove(&conn)
    }

    /// Stop every match task and clear both maps
    pub fn shutdown(&self) {
        let drained: Vec<MatchHandle> = self.inner.matches.write().drain().map(|(_, h)| h).collect();
        self.inner.connections.write().clear();
        for handle in &drained {
            let _ = handle.send(Command::Shutdown);
        }
        info!(matches = drained.len(), "Registry drained");
    }
}
