//! Narration controller: per-step voice narration.
//!
//! The sequencer drives this one way: every step entry hands the new
//! step's text to [`NarrationController::step_entered`]. The controller
//! never influences navigation.

use std::sync::Arc;

use academy_core::platform::{NarrationEngine, Voice};
use serde::Serialize;
use tracing::{debug, warn};

/// Narration state as shown by the voice controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationState {
    /// Nothing is being spoken.
    Idle,
    /// The current step is being spoken.
    Speaking,
    /// Speech is paused mid-utterance.
    Paused,
    /// Narration is switched off until unmuted.
    Muted,
}

/// Which voice to ask the engine for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePreference {
    /// Voice names to prefer, best first. Matched case-insensitively as
    /// substrings.
    pub preferred_names: Vec<String>,
    /// Language tag to fall back on, e.g. "en-GB".
    pub locale: String,
}

impl Default for VoicePreference {
    fn default() -> Self {
        Self {
            preferred_names: vec!["Samantha".to_owned(), "Google UK English Female".to_owned()],
            locale: "en-GB".to_owned(),
        }
    }
}

/// Picks a voice: a preferred name, else the first voice in the locale,
/// else `None` for the engine default. Finding nothing is not an error.
#[must_use]
pub fn select_voice(voices: &[Voice], preference: &VoicePreference) -> Option<Voice> {
    let by_name = preference.preferred_names.iter().find_map(|wanted| {
        let wanted = wanted.to_lowercase();
        voices
            .iter()
            .find(|voice| voice.name.to_lowercase().contains(&wanted))
    });
    let locale = preference.locale.to_lowercase();
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    by_name
        .or_else(|| {
            voices
                .iter()
                .find(|voice| voice.lang.to_lowercase().replace('_', "-") == locale)
        })
        .or_else(|| {
            voices.iter().find(|voice| {
                voice
                    .lang
                    .to_lowercase()
                    .split(['-', '_'])
                    .next()
                    .is_some_and(|lang| lang == language)
            })
        })
        .cloned()
}

/// Idle / speaking / paused / muted state machine over a narration engine.
///
/// Without an engine the controller is disabled and every action is a
/// no-op, leaving the rest of the session untouched.
pub struct NarrationController {
    engine: Option<Arc<dyn NarrationEngine>>,
    voice: Option<Voice>,
    state: NarrationState,
    current_text: Option<String>,
    utterance: u64,
}

impl std::fmt::Debug for NarrationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationController")
            .field("available", &self.engine.is_some())
            .field("voice", &self.voice)
            .field("state", &self.state)
            .field("utterance", &self.utterance)
            .finish_non_exhaustive()
    }
}

impl NarrationController {
    /// Creates a controller over `engine`, choosing a voice up front.
    #[must_use]
    pub fn new(engine: Arc<dyn NarrationEngine>, preference: &VoicePreference) -> Self {
        let voice = select_voice(&engine.voices(), preference);
        debug!(voice = ?voice.as_ref().map(|v| &v.name), "narration voice selected");
        Self {
            engine: Some(engine),
            voice,
            state: NarrationState::Idle,
            current_text: None,
            utterance: 0,
        }
    }

    /// A controller for environments without speech synthesis.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            engine: None,
            voice: None,
            state: NarrationState::Idle,
            current_text: None,
            utterance: 0,
        }
    }

    /// Number of the most recent utterance handed to the engine, 0 before
    /// the first one.
    #[must_use]
    pub fn utterance(&self) -> u64 {
        self.utterance
    }

    /// Whether voice controls should be enabled.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> NarrationState {
        self.state
    }

    /// The voice requested from the engine, `None` meaning engine default.
    #[must_use]
    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    /// A new step became active. Speaks it unless muted.
    pub fn step_entered(&mut self, text: String) {
        self.current_text = Some(text);
        if self.state != NarrationState::Muted {
            self.speak_current();
        }
    }

    /// Play/pause button.
    pub fn toggle(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        match self.state {
            NarrationState::Speaking => {
                engine.pause();
                self.state = NarrationState::Paused;
            }
            NarrationState::Paused => {
                engine.resume();
                self.state = NarrationState::Speaking;
            }
            NarrationState::Idle => self.speak_current(),
            NarrationState::Muted => {}
        }
    }

    /// Cancels speech and stops narrating future steps.
    pub fn mute(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        engine.cancel();
        self.state = NarrationState::Muted;
    }

    /// Allows narration again from the next step entry or replay.
    pub fn unmute(&mut self) {
        if self.engine.is_some() && self.state == NarrationState::Muted {
            self.state = NarrationState::Idle;
        }
    }

    /// Restarts the current step's text from the beginning.
    pub fn replay(&mut self) {
        if self.state != NarrationState::Muted {
            self.speak_current();
        }
    }

    /// The engine reported end of utterance `utterance` or an error on it.
    /// Reports for an earlier utterance, such as one cancelled by a step
    /// change, are ignored.
    pub fn engine_finished(&mut self, utterance: u64) {
        if utterance != self.utterance {
            debug!(
                utterance,
                current = self.utterance,
                "ignoring end of stale utterance"
            );
            return;
        }
        if matches!(
            self.state,
            NarrationState::Speaking | NarrationState::Paused
        ) {
            self.state = NarrationState::Idle;
        }
    }

    /// Stops any speech when the session ends. Mute survives.
    pub fn release(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        if matches!(
            self.state,
            NarrationState::Speaking | NarrationState::Paused
        ) {
            engine.cancel();
            self.state = NarrationState::Idle;
        }
    }

    fn speak_current(&mut self) {
        let (Some(engine), Some(text)) = (&self.engine, &self.current_text) else {
            return;
        };
        engine.cancel();
        self.utterance += 1;
        match engine.speak(self.utterance, text, self.voice.as_ref()) {
            Ok(()) => self.state = NarrationState::Speaking,
            Err(e) => {
                warn!(error = %e, "narration failed to start");
                self.state = NarrationState::Idle;
            }
        }
    }
}
