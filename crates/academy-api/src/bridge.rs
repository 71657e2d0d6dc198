//! Browser-side implementations of the platform capabilities.
//!
//! Speech synthesis and the camera run in the browser. The server-side
//! narration engine queues commands for the page to drain and play; the
//! camera holds the frame the page uploaded for the next capture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use academy_core::platform::{Camera, Frame, NarrationEngine, PlatformError, Voice};
use serde::Serialize;

/// A command for the browser's speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum NarrationCommand {
    /// Speak `text` with the named voice, or the default voice.
    Speak {
        /// Echoed back by the page when the utterance ends.
        utterance: u64,
        /// Text to speak.
        text: String,
        /// Voice name, `None` for the browser default.
        voice: Option<String>,
    },
    /// Pause the current utterance.
    Pause,
    /// Resume the paused utterance.
    Resume,
    /// Cancel all speech.
    Cancel,
}

/// Narration engine that forwards commands to the browser.
#[derive(Debug, Default)]
pub struct BrowserNarration {
    voices: Vec<Voice>,
    queue: Mutex<Vec<NarrationCommand>>,
}

impl BrowserNarration {
    /// Create a bridge for a page that reported `voices`.
    #[must_use]
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Takes every queued command, oldest first.
    pub fn drain(&self) -> Vec<NarrationCommand> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, command: NarrationCommand) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }
}

impl NarrationEngine for BrowserNarration {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(
        &self,
        utterance: u64,
        text: &str,
        voice: Option<&Voice>,
    ) -> Result<(), PlatformError> {
        self.push(NarrationCommand::Speak {
            utterance,
            text: text.to_owned(),
            voice: voice.map(|v| v.name.clone()),
        });
        Ok(())
    }

    fn pause(&self) {
        self.push(NarrationCommand::Pause);
    }

    fn resume(&self) {
        self.push(NarrationCommand::Resume);
    }

    fn cancel(&self) {
        self.push(NarrationCommand::Cancel);
    }
}

/// Camera whose frames are uploaded by the browser.
#[derive(Debug, Default)]
pub struct BrowserCamera {
    running: AtomicBool,
    staged: Mutex<Option<Frame>>,
}

impl BrowserCamera {
    /// Holds `frame` for the next `capture_frame`.
    pub fn stage(&self, frame: Frame) {
        *self.staged.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }

    /// Whether the stream is acquired.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Camera for BrowserCamera {
    fn start(&self) -> Result<(), PlatformError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn capture_frame(&self) -> Result<Frame, PlatformError> {
        if !self.is_running() {
            return Err(PlatformError::Unavailable("camera stopped".into()));
        }
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| PlatformError::Failed("no frame uploaded".into()))
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
