use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
};

use uuid::Uuid;

/// Handle for one live socket. v7 ids sort by creation time, so fan-out
/// order over a connection set is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// The username had no live connections before this one.
    pub new: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub username: String,
    pub became_empty: bool,
}

/// Username to connection sets, plus the reverse index so owner lookups
/// never scan. Both maps change together or not at all.
#[derive(Debug, Default)]
pub struct Registry {
    users: BTreeMap<String, BTreeSet<ConnectionId>>,
    owners: HashMap<ConnectionId, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callers must unregister a connection before moving it to another name.
    pub fn register(&mut self, connection: ConnectionId, username: &str) -> Registration {
        debug_assert!(
            self.owners.get(&connection).is_none_or(|owner| owner == username),
            "connection {connection} is still owned by another user"
        );

        let new = !self.users.contains_key(username);
        self.users
            .entry(username.to_owned())
            .or_default()
            .insert(connection);
        self.owners.insert(connection, username.to_owned());

        Registration { new }
    }

    pub fn resolve_owner(&self, connection: ConnectionId) -> Option<&str> {
        self.owners.get(&connection).map(String::as_str)
    }

    pub fn unregister(&mut self, connection: ConnectionId) -> Option<Departure> {
        let username = self.owners.remove(&connection)?;

        let became_empty = match self.users.get_mut(&username) {
            Some(connections) => {
                connections.remove(&connection);
                connections.is_empty()
            }
            None => true,
        };
        if became_empty {
            self.users.remove(&username);
        }

        Some(Departure {
            username,
            became_empty,
        })
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Sorted snapshot of everyone online.
    pub fn list_usernames(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    pub fn connections_of(&self, username: &str) -> impl Iterator<Item = ConnectionId> + '_ {
        self.users
            .get(username)
            .into_iter()
            .flat_map(|connections| connections.iter().copied())
    }

    pub fn all_connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.users.values().flat_map(|connections| connections.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_connection_creates_the_user() {
        let mut registry = Registry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert_eq!(registry.register(a, "alice"), Registration { new: true });
        assert_eq!(registry.register(b, "alice"), Registration { new: false });

        assert_eq!(registry.list_usernames(), vec!["alice".to_owned()]);
        assert_eq!(registry.connections_of("alice").collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(registry.resolve_owner(a), Some("alice"));
        assert_eq!(registry.resolve_owner(b), Some("alice"));
    }

    #[test]
    fn user_disappears_with_last_connection() {
        let mut registry = Registry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.register(a, "alice");
        registry.register(b, "alice");

        assert_eq!(
            registry.unregister(a),
            Some(Departure { username: "alice".into(), became_empty: false })
        );
        assert!(registry.contains("alice"));
        assert_eq!(registry.resolve_owner(a), None);

        assert_eq!(
            registry.unregister(b),
            Some(Departure { username: "alice".into(), became_empty: true })
        );
        assert!(!registry.contains("alice"));
        assert!(registry.list_usernames().is_empty());
        assert_eq!(registry.all_connections().count(), 0);
    }

    #[test]
    fn unknown_connection_is_not_found() {
        let mut registry = Registry::new();
        let stranger = ConnectionId::new();

        assert_eq!(registry.resolve_owner(stranger), None);
        assert_eq!(registry.unregister(stranger), None);
    }

    #[test]
    fn names_are_case_sensitive_and_sorted() {
        let mut registry = Registry::new();
        registry.register(ConnectionId::new(), "bob");
        registry.register(ConnectionId::new(), "Alice");
        registry.register(ConnectionId::new(), "alice");

        assert_eq!(registry.list_usernames(), vec!["Alice", "alice", "bob"]);
        assert_eq!(registry.all_connections().count(), 3);
    }
}
