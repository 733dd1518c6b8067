//! Speech through an external text-to-speech program.

use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use services::{SpeechSynthesizer, Utterance};

/// Words per minute the program speaks at for a rate of `1.0`.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Runs an `espeak`-compatible program (`-v <voice> -s <wpm> <text>`) per
/// utterance. Cancelling kills the running child.
pub struct CommandSynthesizer {
    program: String,
    current: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }

    fn build_command(&self, utterance: &Utterance) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-v")
            .arg(voice_for(&utterance.language))
            .arg("-s")
            .arg(words_per_minute(utterance.rate.value()).to_string())
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, utterance: &Utterance) {
        let Ok(mut current) = self.current.lock() else {
            tracing::warn!("speech state poisoned; skipping utterance");
            return;
        };
        if let Some(previous) = current.take() {
            stop_child(previous);
        }
        match self.build_command(utterance).spawn() {
            Ok(child) => *current = Some(child),
            Err(err) => {
                tracing::warn!(program = %self.program, error = %err, "failed to start speech");
            }
        }
    }

    fn cancel(&self) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        if let Some(child) = current.take() {
            stop_child(child);
        }
    }
}

fn stop_child(mut child: Child) {
    // Already exited is fine.
    let _ = child.kill();
    let _ = child.wait();
}

impl Drop for CommandSynthesizer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `de-DE` -> `de`.
fn voice_for(language: &str) -> String {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
        .to_ascii_lowercase()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn words_per_minute(rate: f32) -> u32 {
    (BASE_WORDS_PER_MINUTE * rate).round().clamp(80.0, 450.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::SpeechRate;

    #[test]
    fn voice_uses_primary_language_subtag() {
        assert_eq!(voice_for("de-DE"), "de");
        assert_eq!(voice_for("en_US"), "en");
        assert_eq!(voice_for("FR"), "fr");
    }

    #[test]
    fn words_per_minute_scales_and_clamps() {
        assert_eq!(words_per_minute(1.0), 175);
        assert_eq!(words_per_minute(2.0), 350);
        assert_eq!(words_per_minute(0.1), 80);
        assert_eq!(words_per_minute(10.0), 450);
    }

    #[test]
    fn missing_program_is_not_fatal() {
        let synth = CommandSynthesizer::new("definitely-not-a-speech-program");
        synth.speak(&Utterance {
            text: "Hallo.".into(),
            language: "de-DE".into(),
            rate: SpeechRate::default(),
        });
        synth.cancel();
        assert!(synth.current.lock().unwrap().is_none());
    }

    #[cfg(target_os = "linux")]
    mod process {
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};
        use std::process::Child;

        use services::{SpeechRate, SpeechSynthesizer, Utterance};

        use crate::voice::CommandSynthesizer;

        /// Executable that ignores its arguments and keeps running.
        fn slow_speaker(name: &str) -> PathBuf {
            let dir = std::env::temp_dir().join(format!("dictation-voice-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            let path = dir.join(name);
            std::fs::write(&path, "#!/bin/sh\nexec sleep 30\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn running_pid(synth: &CommandSynthesizer) -> Option<u32> {
            synth.current.lock().unwrap().as_ref().map(Child::id)
        }

        fn is_alive(pid: u32) -> bool {
            Path::new(&format!("/proc/{pid}")).exists()
        }

        fn utterance(text: &str) -> Utterance {
            Utterance {
                text: text.into(),
                language: "de-DE".into(),
                rate: SpeechRate::default(),
            }
        }

        #[test]
        fn cancel_kills_and_reaps_running_child() {
            let synth = CommandSynthesizer::new(slow_speaker("cancel").display().to_string());
            synth.speak(&utterance("Hallo."));
            let pid = running_pid(&synth).unwrap();
            assert!(is_alive(pid));

            synth.cancel();
            assert!(running_pid(&synth).is_none());
            assert!(!is_alive(pid));
        }

        #[test]
        fn speaking_again_stops_previous_child() {
            let synth = CommandSynthesizer::new(slow_speaker("replace").display().to_string());
            synth.speak(&utterance("Eins."));
            let first = running_pid(&synth).unwrap();

            synth.speak(&utterance("Zwei."));
            let second = running_pid(&synth).unwrap();
            assert_ne!(first, second);
            assert!(!is_alive(first));

            drop(synth);
            assert!(!is_alive(second));
        }
    }
}
