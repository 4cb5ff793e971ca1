use std::{collections::HashMap, sync::Arc};

use time::OffsetDateTime;
use tokio::sync::{Mutex, mpsc};

use super::{
    events::{ClientEvent, Outbound, Rejection, ServerEvent},
    hub::Hub,
    registry::ConnectionId,
};

pub type Outbox = mpsc::UnboundedReceiver<ServerEvent>;

/// The live chat: one hub plus an outbox per open socket, behind a single
/// lock. Events are queued while the lock is held, so every connection sees
/// them in the order the hub produced them.
#[derive(Clone, Default)]
pub struct Lobby {
    inner: Arc<Mutex<LobbyInner>>,
}

#[derive(Default)]
struct LobbyInner {
    hub: Hub,
    outboxes: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
}

impl LobbyInner {
    fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound { to, event } in outbound {
            if let Some(tx) = self.outboxes.get(&to) {
                // receiver gone means the socket is closing; its disconnect is on the way
                let _ = tx.send(event);
            }
        }
    }
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect(&self) -> (ConnectionId, Outbox) {
        let connection = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().await.outboxes.insert(connection, tx);
        (connection, rx)
    }

    pub async fn dispatch(&self, connection: ConnectionId, event: ClientEvent) {
        let mut inner = self.inner.lock().await;
        let outbound = inner.hub.handle(connection, event, OffsetDateTime::now_utc());
        inner.deliver(outbound);
    }

    pub async fn reject(&self, connection: ConnectionId, rejection: Rejection) {
        self.inner
            .lock()
            .await
            .deliver(vec![Outbound::rejected(connection, rejection)]);
    }

    pub async fn disconnect(&self, connection: ConnectionId) {
        let mut inner = self.inner.lock().await;
        inner.outboxes.remove(&connection);
        let outbound = inner.hub.leave(connection);
        inner.deliver(outbound);
    }

    pub async fn online(&self) -> Vec<String> {
        self.inner.lock().await.hub.online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(outbox: &mut Outbox) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = outbox.try_recv() {
            events.push(event);
        }
        events
    }

    fn join(username: &str) -> ClientEvent {
        ClientEvent::Join { username: username.into() }
    }

    #[tokio::test]
    async fn routes_events_to_outboxes() {
        let lobby = Lobby::new();
        let (alice, mut alice_box) = lobby.connect().await;
        let (bob, mut bob_box) = lobby.connect().await;

        lobby.dispatch(alice, join("alice")).await;
        lobby.dispatch(bob, join("bob")).await;
        drain(&mut alice_box);
        drain(&mut bob_box);

        lobby
            .dispatch(alice, ClientEvent::SendMessage { to: "bob".into(), text: "hi".into() })
            .await;

        let bob_events = drain(&mut bob_box);
        assert!(matches!(
            &bob_events[..],
            [
                ServerEvent::NotificationsUpdate { peers },
                ServerEvent::MessageReceived { text, is_own_message: false, .. },
            ] if peers == &["alice"] && text == "hi"
        ));
        assert!(matches!(
            &drain(&mut alice_box)[..],
            [ServerEvent::MessageReceived { is_own_message: true, .. }]
        ));
    }

    #[tokio::test]
    async fn disconnect_announces_departure() {
        let lobby = Lobby::new();
        let (alice, mut alice_box) = lobby.connect().await;
        let (bob, _bob_box) = lobby.connect().await;
        lobby.dispatch(alice, join("alice")).await;
        lobby.dispatch(bob, join("bob")).await;
        drain(&mut alice_box);

        lobby.disconnect(bob).await;

        assert_eq!(lobby.online().await, vec!["alice"]);
        assert_eq!(
            drain(&mut alice_box),
            vec![ServerEvent::PresenceUpdate { users: vec!["alice".into()] }]
        );
    }

    #[tokio::test]
    async fn rejections_reach_only_the_offender() {
        let lobby = Lobby::new();
        let (alice, mut alice_box) = lobby.connect().await;
        let (_bob, mut bob_box) = lobby.connect().await;

        lobby.reject(alice, Rejection::Malformed).await;

        assert_eq!(
            drain(&mut alice_box),
            vec![ServerEvent::Rejected { reason: "unrecognised event".into() }]
        );
        assert!(drain(&mut bob_box).is_empty());
    }

    #[tokio::test]
    async fn closed_outbox_does_not_break_delivery() {
        let lobby = Lobby::new();
        let (alice, alice_box) = lobby.connect().await;
        let (bob, mut bob_box) = lobby.connect().await;
        lobby.dispatch(alice, join("alice")).await;
        drop(alice_box);

        lobby.dispatch(bob, join("bob")).await;

        assert_eq!(drain(&mut bob_box).len(), 2);
    }
}
