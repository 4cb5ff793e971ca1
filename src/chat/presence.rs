use super::{
    events::{Outbound, ServerEvent},
    hub::Hub,
    registry::ConnectionId,
};

impl Hub {
    /// Sorted usernames of everyone with at least one live connection.
    pub fn online(&self) -> Vec<String> {
        self.registry.list_usernames()
    }

    fn presence_update(&self) -> ServerEvent {
        ServerEvent::PresenceUpdate {
            users: self.online(),
        }
    }

    /// Full list to every connection, the one that just joined included.
    pub(super) fn presence_broadcast(&self) -> Vec<Outbound> {
        let event = self.presence_update();
        self.registry
            .all_connections()
            .map(|c| Outbound::new(c, event.clone()))
            .collect()
    }

    pub(super) fn presence_snapshot(&self, connection: ConnectionId) -> Outbound {
        Outbound::new(connection, self.presence_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::hub::tests::{events_for, joined};

    #[test]
    fn everyone_hears_about_membership_changes() {
        let mut hub = Hub::new();
        let alice = joined(&mut hub, "alice");
        let bob = joined(&mut hub, "bob");
        let bob_phone = joined(&mut hub, "bob");

        let out = hub.join(ConnectionId::new(), "carol");
        let expected = ServerEvent::PresenceUpdate {
            users: vec!["alice".into(), "bob".into(), "carol".into()],
        };
        for connection in [alice, bob, bob_phone] {
            assert_eq!(events_for(&out, connection), vec![&expected]);
        }
    }

    #[test]
    fn online_is_sorted() {
        let mut hub = Hub::new();
        joined(&mut hub, "zoe");
        joined(&mut hub, "adam");

        assert_eq!(hub.online(), vec!["adam", "zoe"]);
    }
}
