//! Error taxonomy shared by every crate in the workspace.
//!
//! Only genuine failures are represented here. Operations attempted without
//! a valid target (delete with nothing selected, animate a missing node) are
//! structural no-ops and report through `bool`/`Option` instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// An image or video failed to decode or load.
    #[error("failed to load `{source_ref}`: {reason}")]
    ResourceLoad { source_ref: String, reason: String },

    /// The platform refused to start playback (usually autoplay policy).
    #[error("media playback failed: {reason}")]
    MediaPlayback { reason: String },

    /// A history snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Malformed template JSON or an unknown template key.
    #[error("template error: {0}")]
    Template(String),

    /// Editor configuration JSON that does not parse.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The rasterizer failed to produce an image.
    #[error("export failed: {0}")]
    Export(String),

    /// A color string could not be parsed.
    #[error("invalid color `{0}`")]
    Color(String),
}

impl EditorError {
    pub fn resource_load(source_ref: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            source_ref: source_ref.into(),
            reason: reason.into(),
        }
    }

    pub fn playback(reason: impl Into<String>) -> Self {
        Self::MediaPlayback {
            reason: reason.into(),
        }
    }
}
