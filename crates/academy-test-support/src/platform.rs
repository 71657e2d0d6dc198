//! Test doubles for the narration and camera capabilities.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use academy_core::platform::{Camera, Frame, NarrationEngine, PlatformError, Voice};

/// One call observed by [`RecordingNarrationEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationCall {
    /// `speak(text, voice_name)`.
    Speak(String, Option<String>),
    /// `pause()`.
    Pause,
    /// `resume()`.
    Resume,
    /// `cancel()`.
    Cancel,
}

/// A narration engine that records every call and speaks nothing.
#[derive(Debug, Default)]
pub struct RecordingNarrationEngine {
    voices: Vec<Voice>,
    calls: Mutex<Vec<NarrationCall>>,
}

impl RecordingNarrationEngine {
    /// Create an engine offering `voices`.
    #[must_use]
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<NarrationCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the texts passed to `speak`, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NarrationCall::Speak(text, _) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl NarrationEngine for RecordingNarrationEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(
        &self,
        _utterance: u64,
        text: &str,
        voice: Option<&Voice>,
    ) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push(NarrationCall::Speak(
            text.to_owned(),
            voice.map(|v| v.name.clone()),
        ));
        Ok(())
    }

    fn pause(&self) {
        self.calls.lock().unwrap().push(NarrationCall::Pause);
    }

    fn resume(&self) {
        self.calls.lock().unwrap().push(NarrationCall::Resume);
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(NarrationCall::Cancel);
    }
}

/// A camera that hands out a fixed frame and counts start/stop calls.
#[derive(Debug)]
pub struct StubCamera {
    frame: Option<Frame>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl StubCamera {
    /// A working camera returning a tiny JPEG payload.
    #[must_use]
    pub fn working() -> Self {
        Self {
            frame: Some(Frame {
                mime_type: "image/jpeg".to_owned(),
                bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            }),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// A camera whose `start` always fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            frame: None,
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// Number of `start` calls.
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Number of `stop` calls.
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Camera for StubCamera {
    fn start(&self) -> Result<(), PlatformError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.frame.is_some() {
            Ok(())
        } else {
            Err(PlatformError::Unavailable("no camera attached".into()))
        }
    }

    fn capture_frame(&self) -> Result<Frame, PlatformError> {
        self.frame
            .clone()
            .ok_or_else(|| PlatformError::Unavailable("no camera attached".into()))
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}
