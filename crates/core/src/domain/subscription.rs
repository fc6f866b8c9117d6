use serde::{Deserialize, Serialize};

use super::node::NodeKind;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// One channel's entry in a node's subscription record.
///
/// `deep` is set only on the node the cascade was issued against; the
/// entries a cascade writes onto descendants are always plain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSubscription {
    pub channel: ChannelId,
    pub deep: bool,
}

/// The per-slug subscription document.
///
/// Invariant: at most one entry per channel id. A record whose channel
/// list has emptied is kept around rather than deleted; re-subscribing
/// through an empty record must behave the same as first contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    #[serde(rename = "node_kind")]
    pub kind: NodeKind,
    pub slug: String,
    pub channels: Vec<ChannelSubscription>,
}

impl SubscriptionRecord {
    pub fn new(kind: NodeKind, slug: impl Into<String>) -> Self {
        Self { kind, slug: slug.into(), channels: Vec::new() }
    }

    pub fn contains(&self, channel: &ChannelId) -> bool {
        self.channels.iter().any(|entry| &entry.channel == channel)
    }

    /// The `deep` flag for `channel`, or `None` when the channel has no entry.
    pub fn deep_for(&self, channel: &ChannelId) -> Option<bool> {
        self.channels.iter().find(|entry| &entry.channel == channel).map(|entry| entry.deep)
    }

    /// Appends an entry unless the channel already has one. Returns whether
    /// the record changed; an existing entry is never overwritten, so a
    /// cascade cannot downgrade a descendant's own deep subscription.
    pub fn push_channel(&mut self, channel: ChannelId, deep: bool) -> bool {
        if self.contains(&channel) {
            return false;
        }
        self.channels.push(ChannelSubscription { channel, deep });
        true
    }

    /// Removes the channel's entry. Returns whether an entry was present.
    pub fn remove_channel(&mut self, channel: &ChannelId) -> bool {
        let before = self.channels.len();
        self.channels.retain(|entry| &entry.channel != channel);
        self.channels.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
