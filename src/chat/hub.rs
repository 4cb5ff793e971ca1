use time::OffsetDateTime;
use tracing::{debug, info};

use super::{
    conversations::ConversationStore,
    events::{ClientEvent, Outbound, Rejection, ServerEvent},
    notifications::NotificationTracker,
    registry::{ConnectionId, Registry},
};

/// All chat state for one server process. Every operation takes the
/// connection an event came from and returns what should be sent where;
/// nothing in here touches a socket.
#[derive(Debug, Default)]
pub struct Hub {
    pub(super) registry: Registry,
    pub(super) conversations: ConversationStore,
    pub(super) notifications: NotificationTracker,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, connection: ConnectionId, event: ClientEvent, now: OffsetDateTime) -> Vec<Outbound> {
        match event {
            ClientEvent::Join { username } => self.join(connection, &username),
            ClientEvent::SendMessage { to, text } => self.send_message(connection, &to, &text, now),
            ClientEvent::GetConversation { peer } => self.get_conversation(connection, &peer),
            ClientEvent::Typing { to, is_typing } => self.typing(connection, &to, is_typing),
        }
    }

    pub fn join(&mut self, connection: ConnectionId, username: &str) -> Vec<Outbound> {
        let username = username.trim();
        if username.is_empty() {
            return vec![Outbound::rejected(connection, Rejection::EmptyUsername)];
        }

        let mut out = Vec::new();

        let renamed = self
            .registry
            .resolve_owner(connection)
            .is_some_and(|current| current != username);
        if renamed {
            out.extend(self.leave(connection));
        }

        if self.registry.register(connection, username).new {
            self.conversations.open(username);
            self.notifications.open(username);
            info!(%username, %connection, "user joined");
            out.extend(self.presence_broadcast());
        } else {
            debug!(%username, %connection, "another connection joined");
            out.push(self.presence_snapshot(connection));
        }

        out.push(Outbound::new(connection, self.notifications_update(username)));
        out
    }

    pub fn send_message(
        &mut self,
        connection: ConnectionId,
        to: &str,
        text: &str,
        now: OffsetDateTime,
    ) -> Vec<Outbound> {
        let Some(from) = self.registry.resolve_owner(connection).map(str::to_owned) else {
            debug!(%connection, "message from unnamed connection dropped");
            return Vec::new();
        };

        let to = to.trim();
        let text = text.trim();
        if text.is_empty() {
            return vec![Outbound::rejected(connection, Rejection::EmptyText)];
        }
        if to == from {
            return vec![Outbound::rejected(connection, Rejection::SelfAddressed)];
        }
        if !self.registry.contains(to) {
            debug!(%from, %to, "message to offline user refused");
            return vec![Outbound::rejected(connection, Rejection::UnknownRecipient)];
        }

        self.conversations.append_sent(&from, to, text, now);
        self.conversations.append_received(to, &from, text, now);
        self.notifications.mark_unread(to, &from);
        debug!(%from, %to, "message routed");

        let mut out = self.notify_all(to);

        let senders = self.registry.connections_of(&from).map(|c| (c, true));
        let recipients = self.registry.connections_of(to).map(|c| (c, false));
        out.extend(senders.chain(recipients).map(|(c, is_own_message)| {
            Outbound::new(c, ServerEvent::MessageReceived {
                from: from.clone(),
                to: to.to_owned(),
                text: text.to_owned(),
                timestamp: now,
                is_own_message,
            })
        }));
        out
    }

    pub fn get_conversation(&mut self, connection: ConnectionId, peer: &str) -> Vec<Outbound> {
        let Some(owner) = self.registry.resolve_owner(connection).map(str::to_owned) else {
            return Vec::new();
        };

        let peer = peer.trim();
        if peer.is_empty() {
            return vec![Outbound::rejected(connection, Rejection::EmptyPeer)];
        }

        self.conversations.fetch(&owner, peer);
        self.conversations.mark_all_read_from(&owner, peer);
        self.notifications.clear(&owner, peer);

        let messages = self
            .conversations
            .get(&owner, peer)
            .map(|c| c.messages().iter().map(|m| m.view(&owner, peer)).collect())
            .unwrap_or_default();

        let mut out = self.notify_all(&owner);
        out.push(Outbound::new(connection, ServerEvent::ConversationSnapshot {
            peer: peer.to_owned(),
            messages,
        }));
        out
    }

    pub fn leave(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        let Some(departure) = self.registry.unregister(connection) else {
            return Vec::new();
        };

        if !departure.became_empty {
            debug!(username = %departure.username, %connection, "one of several connections left");
            return Vec::new();
        }

        self.conversations.close(&departure.username);
        self.notifications.close(&departure.username);
        info!(username = %departure.username, %connection, "user left");

        self.presence_broadcast()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn notifications(&self) -> &NotificationTracker {
        &self.notifications
    }

    fn notifications_update(&self, owner: &str) -> ServerEvent {
        ServerEvent::NotificationsUpdate {
            peers: self.notifications.snapshot(owner),
        }
    }

    /// Current notification set, to every connection of `owner`.
    fn notify_all(&self, owner: &str) -> Vec<Outbound> {
        let event = self.notifications_update(owner);
        self.registry
            .connections_of(owner)
            .map(|c| Outbound::new(c, event.clone()))
            .collect()
    }
}
