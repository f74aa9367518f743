//! Named-session registry.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::config::{BackendKind, SessionConfig};
use crate::error::Result;

use super::session::Session;

/// Manages multiple named sessions.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<String, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the named session, opening it with the supplied backend and config
    /// if it does not exist yet.
    pub fn open(
        &mut self,
        name: &str,
        kind: BackendKind,
        config: SessionConfig,
    ) -> Result<&mut Session> {
        match self.sessions.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let session = Session::connect(kind, config, name)?;
                Ok(entry.insert(session))
            }
        }
    }

    /// Get an existing session.
    pub fn get(&self, name: &str) -> Option<&Session> {
        self.sessions.get(name)
    }

    /// Get an existing session mutably (required for sends).
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Session> {
        self.sessions.get_mut(name)
    }

    /// Remove a session, dropping its history.
    pub fn remove(&mut self, name: &str) -> Option<Session> {
        self.sessions.remove(name)
    }

    /// List session names.
    pub fn names(&self) -> Vec<&str> {
        self.sessions.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
