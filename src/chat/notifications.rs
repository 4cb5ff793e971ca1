use std::collections::{BTreeSet, HashMap};

/// Per-user set of peers with unread messages.
#[derive(Debug, Default)]
pub struct NotificationTracker {
    unread: HashMap<String, BTreeSet<String>>,
}

impl NotificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, owner: &str) {
        self.unread.entry(owner.to_owned()).or_default();
    }

    pub fn close(&mut self, owner: &str) {
        self.unread.remove(owner);
    }

    pub fn mark_unread(&mut self, owner: &str, peer: &str) -> bool {
        match self.unread.get_mut(owner) {
            Some(peers) => peers.insert(peer.to_owned()),
            None => false,
        }
    }

    pub fn clear(&mut self, owner: &str, peer: &str) -> bool {
        match self.unread.get_mut(owner) {
            Some(peers) => peers.remove(peer),
            None => false,
        }
    }

    /// Sorted; empty for unknown owners.
    pub fn snapshot(&self, owner: &str) -> Vec<String> {
        self.unread
            .get(owner)
            .map(|peers| peers.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_owner(&self, owner: &str) -> bool {
        self.unread.contains_key(owner)
    }
}
