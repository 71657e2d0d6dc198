//! Platform capability interfaces.
//!
//! Speech synthesis and camera capture are environment-specific. The
//! training engine only talks to them through these traits, so a browser
//! bridge, a native binding, or a test double can sit behind the same
//! contract. Implementations notify completion through callbacks on the
//! owning controller rather than by blocking the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a platform capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The capability is not present in this environment.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The capability exists but the call failed.
    #[error("capability failed: {0}")]
    Failed(String),
}

/// A synthesis voice offered by the narration engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Display name, e.g. "Samantha".
    pub name: String,
    /// BCP 47 language tag, e.g. "en-GB".
    pub lang: String,
}

/// Speech synthesis capability.
pub trait NarrationEngine: Send + Sync {
    /// Voices currently offered by the engine.
    fn voices(&self) -> Vec<Voice>;

    /// Starts speaking `text` as utterance number `utterance`. `None`
    /// selects the engine default voice. End-of-utterance reports carry the
    /// same number back.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the utterance could not be queued.
    fn speak(
        &self,
        utterance: u64,
        text: &str,
        voice: Option<&Voice>,
    ) -> Result<(), PlatformError>;

    /// Pauses the current utterance without discarding it.
    fn pause(&self);

    /// Resumes a paused utterance.
    fn resume(&self);

    /// Cancels any in-flight utterance.
    fn cancel(&self);
}

/// A single still frame taken from the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// MIME type of the encoded image, e.g. "image/jpeg".
    pub mime_type: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

/// Camera capture capability.
pub trait Camera: Send + Sync {
    /// Acquires the camera stream.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if no camera can be opened.
    fn start(&self) -> Result<(), PlatformError>;

    /// Grabs the current frame from the running stream.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the stream is not running or the grab fails.
    fn capture_frame(&self) -> Result<Frame, PlatformError>;

    /// Releases the camera stream.
    fn stop(&self);
}
