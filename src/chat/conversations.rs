use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    /// Written by the conversation's owner.
    Owner,
    /// Written by the peer the conversation is with.
    Peer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub author: Author,
    pub text: String,
    pub timestamp: OffsetDateTime,
    pub read: bool,
}

/// A message as shown to the conversation's owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub from: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub read: bool,
    pub is_own_message: bool,
}

impl Message {
    pub fn view(&self, owner: &str, peer: &str) -> MessageView {
        let from = match self.author {
            Author::Owner => owner,
            Author::Peer => peer,
        };
        MessageView {
            from: from.to_owned(),
            text: self.text.clone(),
            timestamp: self.timestamp,
            read: self.read,
            is_own_message: self.author == Author::Owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub peer: String,
    messages: Vec<Message>,
}

impl Conversation {
    fn new(peer: &str) -> Self {
        Self {
            peer: peer.to_owned(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn unread(&self) -> usize {
        self.messages.iter().filter(|m| !m.read).count()
    }
}

/// Per-owner histories, one conversation per peer, in the order they were
/// started. Owners must be opened before anything is stored for them.
#[derive(Debug, Default)]
pub struct ConversationStore {
    by_owner: HashMap<String, Vec<Conversation>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, owner: &str) {
        self.by_owner.entry(owner.to_owned()).or_default();
    }

    /// Drops every conversation the owner had.
    pub fn close(&mut self, owner: &str) {
        self.by_owner.remove(owner);
    }

    pub fn append_sent(&mut self, owner: &str, peer: &str, text: &str, timestamp: OffsetDateTime) -> bool {
        self.append(owner, peer, Message {
            author: Author::Owner,
            text: text.to_owned(),
            timestamp,
            read: true,
        })
    }

    pub fn append_received(&mut self, owner: &str, peer: &str, text: &str, timestamp: OffsetDateTime) -> bool {
        self.append(owner, peer, Message {
            author: Author::Peer,
            text: text.to_owned(),
            timestamp,
            read: false,
        })
    }

    fn append(&mut self, owner: &str, peer: &str, message: Message) -> bool {
        let Some(conversation) = self.conversation_mut(owner, peer) else {
            return false;
        };
        conversation.messages.push(message);
        true
    }

    /// The owner's conversation with `peer`, created empty if they never talked.
    /// `None` only when the owner is not open.
    pub fn fetch(&mut self, owner: &str, peer: &str) -> Option<&Conversation> {
        self.conversation_mut(owner, peer).map(|c| &*c)
    }

    /// Returns how many messages flipped to read.
    pub fn mark_all_read_from(&mut self, owner: &str, peer: &str) -> usize {
        let Some(conversation) = self.find_mut(owner, peer) else {
            return 0;
        };

        let mut flipped = 0;
        for message in conversation.messages.iter_mut() {
            if message.author == Author::Peer && !message.read {
                message.read = true;
                flipped += 1;
            }
        }
        flipped
    }

    pub fn get(&self, owner: &str, peer: &str) -> Option<&Conversation> {
        self.by_owner
            .get(owner)?
            .iter()
            .find(|c| c.peer == peer)
    }

    pub fn conversations(&self, owner: &str) -> &[Conversation] {
        self.by_owner.get(owner).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_owner(&self, owner: &str) -> bool {
        self.by_owner.contains_key(owner)
    }

    fn find_mut(&mut self, owner: &str, peer: &str) -> Option<&mut Conversation> {
        self.by_owner
            .get_mut(owner)?
            .iter_mut()
            .find(|c| c.peer == peer)
    }

    fn conversation_mut(&mut self, owner: &str, peer: &str) -> Option<&mut Conversation> {
        let conversations = self.by_owner.get_mut(owner)?;
        let index = match conversations.iter().position(|c| c.peer == peer) {
            Some(index) => index,
            None => {
                conversations.push(Conversation::new(peer));
                conversations.len() - 1
            }
        };
        conversations.get_mut(index)
    }
}
