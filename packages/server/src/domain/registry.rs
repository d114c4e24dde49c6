//! Connection Registry
//!
//! 接続中のコネクションと表示名の対応表。Dispatcher タスクだけが所有・更新する
//! （単一ライター）。他のタスクはキュー経由でのみ変更を依頼する。

use std::{collections::HashMap, sync::Arc};

use super::{ConnectionHandle, ConnectionId, DisplayName, RegistryError};

struct RegistryEntry {
    handle: Arc<dyn ConnectionHandle>,
    name: DisplayName,
    /// Join order, used to keep sorting stable for duplicate names
    joined_seq: u64,
}

/// Mapping of live connections to their display names
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, RegistryEntry>,
    next_seq: u64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection with an empty name
    ///
    /// # Errors
    ///
    /// `DuplicateConnection` if a handle with the same id is already registered.
    pub fn register(&mut self, handle: Arc<dyn ConnectionHandle>) -> Result<(), RegistryError> {
        let id = handle.id();
        if self.entries.contains_key(&id) {
            return Err(RegistryError::DuplicateConnection(id));
        }

        let joined_seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            id,
            RegistryEntry {
                handle,
                name: DisplayName::unnamed(),
                joined_seq,
            },
        );
        Ok(())
    }

    /// Set the display name of a registered connection
    ///
    /// # Errors
    ///
    /// `UnknownConnection` if the connection is not registered.
    pub fn set_name(&mut self, id: ConnectionId, name: DisplayName) -> Result<(), RegistryError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;
        entry.name = name;
        Ok(())
    }

    /// Current display name of a registered connection
    pub fn name_of(&self, id: ConnectionId) -> Result<&DisplayName, RegistryError> {
        self.entries
            .get(&id)
            .map(|entry| &entry.name)
            .ok_or(RegistryError::UnknownConnection(id))
    }

    /// Remove a connection and hand back its handle so the caller can close it.
    ///
    /// Removing an absent connection is a no-op: explicit leaves race with
    /// eviction.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Arc<dyn ConnectionHandle>> {
        self.entries.remove(&id).map(|entry| entry.handle)
    }

    /// Sorted names of identified members
    ///
    /// Unnamed connections are excluded. Equal names keep join order.
    pub fn list_names(&self) -> Vec<String> {
        let mut named: Vec<&RegistryEntry> = self
            .entries
            .values()
            .filter(|entry| !entry.name.is_unnamed())
            .collect();
        named.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.joined_seq.cmp(&b.joined_seq))
        });
        named
            .into_iter()
            .map(|entry| entry.name.as_str().to_string())
            .collect()
    }

    pub fn handle(&self, id: ConnectionId) -> Option<Arc<dyn ConnectionHandle>> {
        self.entries.get(&id).map(|entry| entry.handle.clone())
    }

    /// Every live connection at this instant
    pub fn snapshot(&self) -> Vec<(ConnectionId, Arc<dyn ConnectionHandle>)> {
        self.entries
            .iter()
            .map(|(id, entry)| (*id, entry.handle.clone()))
            .collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
