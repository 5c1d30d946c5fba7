//! Command targets: text entities on smart speakers the panel writes to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Text sent by the one-tap "dismiss" button (tells the speaker to stand down).
pub const DISMISS_TEXT: &str = "退下";

/// What writing text to a target does on the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandRole {
    /// The text is interpreted as a voice directive.
    Execute,
    /// The text is read aloud.
    PlayText,
}

impl fmt::Display for CommandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execute => f.write_str("execute"),
            Self::PlayText => f.write_str("play_text"),
        }
    }
}

/// Error returned when parsing an unknown [`CommandRole`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command role {0:?}, expected execute or play")]
pub struct UnknownRole(pub String);

impl FromStr for CommandRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "execute" | "exec" => Ok(Self::Execute),
            "play" | "play_text" | "say" => Ok(Self::PlayText),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A writable text entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTarget {
    pub id: String,
    pub role: CommandRole,
}

/// A speaker model and its two text entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Short stable key (e.g. `pro`).
    pub key: String,
    /// Display label.
    pub label: String,
    /// Entity id of the execute-directive text entity.
    pub execute: String,
    /// Entity id of the play-text entity.
    pub play_text: String,
}

impl DeviceProfile {
    /// The target for the given role.
    #[must_use]
    pub fn target(&self, role: CommandRole) -> CommandTarget {
        let id = match role {
            CommandRole::Execute => &self.execute,
            CommandRole::PlayText => &self.play_text,
        };
        CommandTarget {
            id: id.clone(),
            role,
        }
    }
}

/// A request to write `text` to `target`.
///
/// Front-ends build these instead of capturing entity ids in callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub target: CommandTarget,
    pub text: String,
}

impl CommandRequest {
    #[must_use]
    pub fn new(target: CommandTarget, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
        }
    }

    /// The dismiss preset for a profile: [`DISMISS_TEXT`] to its execute target.
    #[must_use]
    pub fn dismiss(profile: &DeviceProfile) -> Self {
        Self::new(profile.target(CommandRole::Execute), DISMISS_TEXT)
    }
}
