//! Moderation actions offered by the user-info popup.
//!
//! The popup itself is a view; this module decides which controls it shows
//! and turns button presses into slash commands sent to the channel.

use crate::channel::Channel;
use std::sync::Arc;
use thiserror::Error;

/// A moderation button in the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Ban,
    Unban,
    /// Timeout for the given number of seconds.
    Timeout(u32),
    Mod,
    Unmod,
}

impl ModerationAction {
    /// Chat command that performs this action on `user`.
    pub fn command(self, user: &str) -> String {
        match self {
            Self::Ban => format!("/ban {user}"),
            Self::Unban => format!("/unban {user}"),
            Self::Timeout(seconds) => format!("/timeout {user} {seconds}"),
            Self::Mod => format!("/mod {user}"),
            Self::Unmod => format!("/unmod {user}"),
        }
    }
}

/// Timeout buttons shown between unban and ban, grouped by unit label.
/// Each entry is a button caption and its duration in seconds.
pub const TIMEOUT_PRESETS: &[(&str, &[(&str, u32)])] = &[
    ("sec", &[("1", 1)]),
    ("min", &[("1", 60), ("5", 5 * 60), ("10", 10 * 60)]),
    ("hour", &[("1", 60 * 60), ("4", 4 * 60 * 60)]),
    ("days", &[("1", 24 * 60 * 60), ("3", 3 * 24 * 60 * 60)]),
    ("weeks", &[("1", 7 * 24 * 60 * 60), ("2", 2 * 7 * 24 * 60 * 60)]),
];

/// Every preset as the action its button performs, in display order.
pub fn timeout_preset_actions() -> impl Iterator<Item = ModerationAction> {
    TIMEOUT_PRESETS
        .iter()
        .flat_map(|(_, buttons)| buttons.iter())
        .map(|&(_, seconds)| ModerationAction::Timeout(seconds))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModerationError {
    #[error("'{action:?}' is not available for {user} in this channel")]
    NotPermitted {
        action: ModerationAction,
        user: String,
    },
    #[error("timeout duration must be at least one second")]
    ZeroTimeout,
}

/// Which moderation controls the popup shows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModerationControls {
    pub show_mod: bool,
    pub show_unmod: bool,
    /// Ban, unban and timeout buttons.
    pub show_timeouts: bool,
}

impl ModerationControls {
    pub fn allows(&self, action: ModerationAction) -> bool {
        match action {
            ModerationAction::Mod => self.show_mod,
            ModerationAction::Unmod => self.show_unmod,
            ModerationAction::Ban | ModerationAction::Unban | ModerationAction::Timeout(_) => {
                self.show_timeouts
            }
        }
    }
}

/// State behind a user-info popup opened on `user_name` in `channel`.
pub struct UserInfo {
    user_name: String,
    current_user: String,
    channel: Arc<dyn Channel>,
}

impl std::fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInfo")
            .field("user_name", &self.user_name)
            .field("channel", &self.channel.name())
            .finish_non_exhaustive()
    }
}

impl UserInfo {
    pub fn new(
        user_name: impl Into<String>,
        current_user: impl Into<String>,
        channel: Arc<dyn Channel>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            current_user: current_user.into(),
            channel,
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Whether the popup is showing the logged-in account.
    pub fn is_self(&self) -> bool {
        self.user_name.eq_ignore_ascii_case(&self.current_user)
    }

    /// Controls to show, recomputed whenever the channel's user state changes.
    pub fn controls(&self) -> ModerationControls {
        let Some(rights) = self.channel.moderation() else {
            return ModerationControls::default();
        };
        let is_self = self.is_self();
        let broadcaster = rights.is_broadcaster();
        ModerationControls {
            show_mod: broadcaster && !is_self,
            show_unmod: (broadcaster && !is_self) || (rights.is_mod() && is_self),
            show_timeouts: rights.has_mod_rights(),
        }
    }

    /// Send the command for `action` if the popup would offer it.
    ///
    /// Returns the command that was sent.
    pub fn perform(&self, action: ModerationAction) -> Result<String, ModerationError> {
        if action == ModerationAction::Timeout(0) {
            return Err(ModerationError::ZeroTimeout);
        }
        if !self.controls().allows(action) {
            return Err(ModerationError::NotPermitted {
                action,
                user: self.user_name.clone(),
            });
        }
        let command = action.command(&self.user_name);
        log::info!("Moderation in #{}: {}", self.channel.name(), command);
        self.channel.send_message(&command);
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ModerationRights;
    use parking_lot::Mutex;

    struct TestChannel {
        broadcaster: bool,
        moderator: bool,
        capable: bool,
        sent: Mutex<Vec<String>>,
    }

    impl TestChannel {
        fn new(capable: bool, broadcaster: bool, moderator: bool) -> Arc<Self> {
            Arc::new(Self {
                broadcaster,
                moderator,
                capable,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    impl ModerationRights for TestChannel {
        fn is_broadcaster(&self) -> bool {
            self.broadcaster
        }

        fn is_mod(&self) -> bool {
            self.moderator
        }
    }

    impl Channel for TestChannel {
        fn name(&self) -> &str {
            "pajlada"
        }

        fn send_message(&self, text: &str) {
            self.sent.lock().push(text.to_string());
        }

        fn moderation(&self) -> Option<&dyn ModerationRights> {
            self.capable.then_some(self as &dyn ModerationRights)
        }
    }

    #[test]
    fn test_command_formats() {
        assert_eq!(ModerationAction::Ban.command("troll"), "/ban troll");
        assert_eq!(ModerationAction::Unban.command("troll"), "/unban troll");
        assert_eq!(
            ModerationAction::Timeout(600).command("troll"),
            "/timeout troll 600"
        );
        assert_eq!(ModerationAction::Mod.command("helper"), "/mod helper");
        assert_eq!(ModerationAction::Unmod.command("helper"), "/unmod helper");
    }

    #[test]
    fn test_broadcaster_viewing_other_user() {
        let info = UserInfo::new("viewer", "owner", TestChannel::new(true, true, false));
        assert_eq!(
            info.controls(),
            ModerationControls {
                show_mod: true,
                show_unmod: true,
                show_timeouts: true,
            }
        );
    }

    #[test]
    fn test_moderator_viewing_self_can_only_unmod() {
        let info = UserInfo::new("Helper", "helper", TestChannel::new(true, false, true));
        assert!(info.is_self());
        let controls = info.controls();
        assert!(!controls.show_mod);
        assert!(controls.show_unmod);
        assert!(controls.show_timeouts);
    }

    #[test]
    fn test_regular_user_sees_nothing() {
        let info = UserInfo::new("viewer", "me", TestChannel::new(true, false, false));
        assert_eq!(info.controls(), ModerationControls::default());
    }

    #[test]
    fn test_channel_without_capability_sees_nothing() {
        let info = UserInfo::new("viewer", "me", TestChannel::new(false, true, true));
        assert_eq!(info.controls(), ModerationControls::default());
    }

    #[test]
    fn test_perform_sends_to_channel() {
        let channel = TestChannel::new(true, false, true);
        let info = UserInfo::new("troll", "me", channel.clone());

        let sent = info
            .perform(ModerationAction::Timeout(30))
            .expect("timeout allowed");
        assert_eq!(sent, "/timeout troll 30");
        info.perform(ModerationAction::Ban).expect("ban allowed");

        assert_eq!(
            *channel.sent.lock(),
            vec!["/timeout troll 30".to_string(), "/ban troll".to_string()]
        );
    }

    #[test]
    fn test_perform_refuses_hidden_actions() {
        let channel = TestChannel::new(true, false, true);
        let info = UserInfo::new("troll", "me", channel.clone());

        assert_eq!(
            info.perform(ModerationAction::Mod),
            Err(ModerationError::NotPermitted {
                action: ModerationAction::Mod,
                user: "troll".to_string(),
            })
        );
        assert_eq!(
            info.perform(ModerationAction::Timeout(0)),
            Err(ModerationError::ZeroTimeout)
        );
        assert!(channel.sent.lock().is_empty());
    }

    #[test]
    fn test_timeout_presets_ladder() {
        let seconds: Vec<u32> = timeout_preset_actions()
            .map(|action| match action {
                ModerationAction::Timeout(s) => s,
                other => panic!("unexpected preset action {other:?}"),
            })
            .collect();
        assert_eq!(
            seconds,
            vec![1, 60, 300, 600, 3600, 14400, 86400, 259200, 604800, 1209600]
        );
        let units: Vec<&str> = TIMEOUT_PRESETS.iter().map(|(unit, _)| *unit).collect();
        assert_eq!(units, vec!["sec", "min", "hour", "days", "weeks"]);
    }

    #[test]
    fn test_every_preset_can_be_performed_by_a_moderator() {
        let channel = TestChannel::new(true, false, true);
        let info = UserInfo::new("troll", "me", channel.clone());
        for action in timeout_preset_actions() {
            info.perform(action).expect("preset allowed");
        }
        assert_eq!(channel.sent.lock().len(), 10);
        assert_eq!(
            channel.sent.lock().last().map(String::as_str),
            Some("/timeout troll 1209600")
        );
    }
}
