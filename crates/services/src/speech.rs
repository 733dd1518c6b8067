//! Speech playback for the current sentence.
//!
//! Synthesizers are fire-and-forget: nothing waits for an utterance to end.
//! [`Narrator`] cancels whatever is playing before it speaks, so at most one
//! utterance is active at a time.

use std::fmt;
use std::sync::Arc;

use crate::error::SpeechError;

/// Language tag used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "de-DE";

/// Playback speed multiplier, `1.0` being normal speed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SpeechRate(f32);

impl SpeechRate {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 10.0;

    /// # Errors
    ///
    /// Returns `SpeechError::InvalidRate` unless `rate` is within
    /// `0.1..=10.0`.
    pub fn new(rate: f32) -> Result<Self, SpeechError> {
        if !rate.is_finite() || !(Self::MIN..=Self::MAX).contains(&rate) {
            return Err(SpeechError::InvalidRate(rate));
        }
        Ok(Self(rate))
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for SpeechRate {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for SpeechRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One request to speak `text`.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: SpeechRate,
}

/// A text-to-speech backend.
///
/// Implementations report their own failures (logging) instead of returning
/// them; playback is never awaited.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, utterance: &Utterance);

    /// Stop any utterance that is still playing.
    fn cancel(&self);
}

/// Synthesizer that only logs. Used when audio is muted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&self, utterance: &Utterance) {
        tracing::debug!(
            text = %utterance.text,
            language = %utterance.language,
            rate = %utterance.rate,
            "speech muted"
        );
    }

    fn cancel(&self) {}
}

/// Speaks sentences in one language at a configurable rate.
#[derive(Clone)]
pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    language: String,
    rate: SpeechRate,
}

impl Narrator {
    #[must_use]
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            language: DEFAULT_LANGUAGE.to_owned(),
            rate: SpeechRate::default(),
        }
    }

    #[must_use]
    pub fn silent() -> Self {
        Self::new(Arc::new(SilentSynthesizer))
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_rate(mut self, rate: SpeechRate) -> Self {
        self.rate = rate;
        self
    }

    pub fn set_rate(&mut self, rate: SpeechRate) {
        self.rate = rate;
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn rate(&self) -> SpeechRate {
        self.rate
    }

    /// Cancel current playback, then speak `text`.
    pub fn speak(&self, text: &str) {
        self.synthesizer.cancel();
        self.synthesizer.speak(&Utterance {
            text: text.to_owned(),
            language: self.language.clone(),
            rate: self.rate,
        });
    }

    pub fn stop(&self) {
        self.synthesizer.cancel();
    }
}

impl fmt::Debug for Narrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Narrator")
            .field("language", &self.language)
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{SpeechSynthesizer, Utterance};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Speak(Utterance),
        Cancel,
    }

    /// Records every call so tests can check ordering.
    #[derive(Default)]
    pub(crate) struct RecordingSynthesizer {
        pub(crate) calls: Mutex<Vec<Call>>,
    }

    impl RecordingSynthesizer {
        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SpeechSynthesizer for RecordingSynthesizer {
        fn speak(&self, utterance: &Utterance) {
            self.calls.lock().unwrap().push(Call::Speak(utterance.clone()));
        }

        fn cancel(&self) {
            self.calls.lock().unwrap().push(Call::Cancel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingSynthesizer};
    use super::*;

    #[test]
    fn rate_bounds() {
        assert!(SpeechRate::new(0.05).is_err());
        assert!(SpeechRate::new(f32::NAN).is_err());
        assert!(SpeechRate::new(10.5).is_err());
        assert_eq!(SpeechRate::new(0.8).unwrap().value(), 0.8);
        assert_eq!(SpeechRate::default().value(), 1.0);
    }

    #[test]
    fn narrator_cancels_before_every_utterance() {
        let recorder = Arc::new(RecordingSynthesizer::default());
        let narrator = Narrator::new(recorder.clone())
            .with_rate(SpeechRate::new(0.7).unwrap());

        narrator.speak("Hallo.");
        narrator.speak("Tschüss.");

        let calls = recorder.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::Cancel);
        assert_eq!(
            calls[1],
            Call::Speak(Utterance {
                text: "Hallo.".into(),
                language: "de-DE".into(),
                rate: SpeechRate::new(0.7).unwrap(),
            })
        );
        assert_eq!(calls[2], Call::Cancel);
        assert!(matches!(&calls[3], Call::Speak(u) if u.text == "Tschüss."));
    }

    #[test]
    fn narrator_language_is_configurable() {
        let recorder = Arc::new(RecordingSynthesizer::default());
        let narrator = Narrator::new(recorder.clone()).with_language("fr-FR");
        narrator.speak("Bonjour.");
        assert!(matches!(&recorder.calls()[1], Call::Speak(u) if u.language == "fr-FR"));
    }
}
