use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::turn_timer::TimerFired;

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ParticipantId(pub String);

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ChannelId(pub String);

/// An identity on the chat platform. The bot never owns participants,
/// it only refers to them.
#[derive(Clone, Debug, Eq, PartialEq, getset::Getters)]
pub struct Participant {
    #[getset(get = "pub")]
    id: ParticipantId,
    #[getset(get = "pub")]
    handle: String,
}

#[derive(Clone, Debug, getset::Getters)]
pub struct ChatMessage {
    #[getset(get = "pub")]
    author: Participant,
    #[getset(get = "pub")]
    channel: ChannelId,
    #[getset(get = "pub")]
    content: String,
}

/// Everything the dispatcher reacts to. Timer expirations travel the same
/// path as chat messages so they are processed strictly one at a time.
#[derive(Clone, Debug, Event)]
pub enum Inbound {
    Message(ChatMessage),
    Timer(TimerFired),
}

#[derive(Clone, Debug, Eq, Event, PartialEq, getset::Getters)]
pub struct ChatReply {
    #[getset(get = "pub")]
    channel: ChannelId,
    #[getset(get = "pub")]
    content: String,
}

impl ParticipantId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        ParticipantId(value.to_owned())
    }
}

impl ChannelId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        ChannelId(value.to_owned())
    }
}

impl Participant {
    pub fn new<I: Into<String>, H: Into<String>>(id: I, handle: H) -> Self {
        Participant {
            id: ParticipantId(id.into()),
            handle: handle.into(),
        }
    }

    /// Platform mention markup, e.g. `<@1234>`
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl ChatMessage {
    pub fn new<S: Into<String>>(author: Participant, channel: ChannelId, content: S) -> Self {
        ChatMessage {
            author,
            channel,
            content: content.into(),
        }
    }
}

impl From<ChatMessage> for Inbound {
    fn from(value: ChatMessage) -> Self {
        Inbound::Message(value)
    }
}

impl From<TimerFired> for Inbound {
    fn from(value: TimerFired) -> Self {
        Inbound::Timer(value)
    }
}

impl ChatReply {
    pub fn new<S: Into<String>>(channel: ChannelId, content: S) -> Self {
        ChatReply {
            channel,
            content: content.into(),
        }
    }
}
