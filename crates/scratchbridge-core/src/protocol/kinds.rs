//! Command and event vocabularies.

use serde::{Deserialize, Serialize};

/// Commands the host sends to the embedded editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostCommand {
    LoadProject,
    SaveProject,
    RunProject,
    StopProject,
    GetThumbnail,
}

impl HostCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            HostCommand::LoadProject => "LOAD_PROJECT",
            HostCommand::SaveProject => "SAVE_PROJECT",
            HostCommand::RunProject => "RUN_PROJECT",
            HostCommand::StopProject => "STOP_PROJECT",
            HostCommand::GetThumbnail => "GET_THUMBNAIL",
        }
    }

    /// Event that answers this command, if the peer answers it at all.
    pub fn answered_by(self) -> Option<PeerEventKind> {
        match self {
            HostCommand::LoadProject => Some(PeerEventKind::ProjectLoaded),
            HostCommand::SaveProject => Some(PeerEventKind::ProjectSaved),
            HostCommand::GetThumbnail => Some(PeerEventKind::Thumbnail),
            HostCommand::RunProject | HostCommand::StopProject => None,
        }
    }
}

/// Events the embedded editor reports to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeerEventKind {
    /// Runtime shell finished loading.
    EditorLoaded,
    /// Engine accepts commands.
    EditorReady,
    ProjectLoaded,
    ProjectSaved,
    Thumbnail,
    ProjectChanged,
    BrowserNotSupported,
}

impl PeerEventKind {
    pub const ALL: [PeerEventKind; 7] = [
        PeerEventKind::EditorLoaded,
        PeerEventKind::EditorReady,
        PeerEventKind::ProjectLoaded,
        PeerEventKind::ProjectSaved,
        PeerEventKind::Thumbnail,
        PeerEventKind::ProjectChanged,
        PeerEventKind::BrowserNotSupported,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PeerEventKind::EditorLoaded => "EDITOR_LOADED",
            PeerEventKind::EditorReady => "EDITOR_READY",
            PeerEventKind::ProjectLoaded => "PROJECT_LOADED",
            PeerEventKind::ProjectSaved => "PROJECT_SAVED",
            PeerEventKind::Thumbnail => "THUMBNAIL",
            PeerEventKind::ProjectChanged => "PROJECT_CHANGED",
            PeerEventKind::BrowserNotSupported => "BROWSER_NOT_SUPPORTED",
        }
    }

    /// Parse a wire `type` string. Unknown types yield `None`.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Whether the event carries a `{ success, data?, error? }` outcome.
    pub fn carries_outcome(self) -> bool {
        matches!(
            self,
            PeerEventKind::ProjectLoaded | PeerEventKind::ProjectSaved | PeerEventKind::Thumbnail
        )
    }
}
