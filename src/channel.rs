//! Channel abstraction used by UI components.
//!
//! Provider-specific powers (moderation) are exposed as optional capability
//! traits that a channel may or may not return.

/// A joined chat channel.
pub trait Channel: Send + Sync {
    /// Channel name without the leading `#`.
    fn name(&self) -> &str;

    /// Send a chat line or slash command to the channel.
    fn send_message(&self, text: &str);

    /// Moderation capability, if this channel's provider has one.
    fn moderation(&self) -> Option<&dyn ModerationRights> {
        None
    }
}

/// Rights the current account holds in a channel.
pub trait ModerationRights {
    /// The current account owns the channel.
    fn is_broadcaster(&self) -> bool;

    /// The current account is a moderator in the channel.
    fn is_mod(&self) -> bool;

    fn has_mod_rights(&self) -> bool {
        self.is_broadcaster() || self.is_mod()
    }
}
