use super::{
    events::{Outbound, ServerEvent},
    hub::Hub,
    registry::ConnectionId,
};

impl Hub {
    /// Relays a typing indicator to the recipient's connections. Nothing is
    /// remembered; clients time stale indicators out themselves.
    pub fn typing(&self, connection: ConnectionId, to: &str, is_typing: bool) -> Vec<Outbound> {
        let Some(from) = self.registry.resolve_owner(connection) else {
            return Vec::new();
        };

        let to = to.trim();
        if to == from || !self.registry.contains(to) {
            return Vec::new();
        }

        let event = ServerEvent::TypingUpdate {
            from: from.to_owned(),
            is_typing,
        };
        self.registry
            .connections_of(to)
            .map(|c| Outbound::new(c, event.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::hub::tests::{events_for, joined};

    #[test]
    fn only_the_recipient_sees_typing() {
        let mut hub = Hub::new();
        let alice = joined(&mut hub, "alice");
        let bob = joined(&mut hub, "bob");
        let bob_phone = joined(&mut hub, "bob");
        let carol = joined(&mut hub, "carol");

        let out = hub.typing(alice, "bob", true);

        let expected = ServerEvent::TypingUpdate { from: "alice".into(), is_typing: true };
        assert_eq!(events_for(&out, bob), vec![&expected]);
        assert_eq!(events_for(&out, bob_phone), vec![&expected]);
        assert!(events_for(&out, alice).is_empty());
        assert!(events_for(&out, carol).is_empty());

        let out = hub.typing(alice, "bob", false);
        assert_eq!(
            events_for(&out, bob),
            vec![&ServerEvent::TypingUpdate { from: "alice".into(), is_typing: false }]
        );
    }

    #[test]
    fn typing_to_nobody_goes_nowhere() {
        let mut hub = Hub::new();
        let alice = joined(&mut hub, "alice");

        assert!(hub.typing(alice, "ghost", true).is_empty());
        assert!(hub.typing(alice, "alice", true).is_empty());
    }
}
