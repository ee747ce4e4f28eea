//! Speech engine lifecycle

use crate::config::ResponseSettings;
use crate::speech::driver::{resolve_voice_id, speak_native, CommandDriver, SpeechDriver};
use crate::speech::{normalize_text, Platform};
use crate::Result;
use tracing::{debug, info, warn};

/// Where the engine is in its playback loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Speaking,
}

/// Owns a driver and tracks whether an utterance is still open
pub struct SpeechEngine {
    driver: Box<dyn SpeechDriver>,
    state: EngineState,
    platform: Platform,
}

impl SpeechEngine {
    pub fn new(driver: Box<dyn SpeechDriver>, platform: Platform) -> Self {
        Self {
            driver,
            state: EngineState::Idle,
            platform,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// Idle to Speaking, closing a loop left open by an earlier utterance
    fn begin_utterance(&mut self) {
        if self.state == EngineState::Speaking {
            warn!("Previous utterance never finished; ending its loop");
            self.driver.end_loop();
        }
        self.state = EngineState::Speaking;
    }

    fn finish_utterance(&mut self) {
        self.state = EngineState::Idle;
    }

    /// Speak `text` and block until playback ends
    ///
    /// A failed utterance leaves the engine in `Speaking`; the next call
    /// ends that loop first.
    pub fn speak(&mut self, text: &str, config: &ResponseSettings) -> Result<()> {
        let text = normalize_text(text);
        if text.is_empty() {
            return Ok(());
        }

        if config.use_mac_os_speech {
            let voice = config
                .voice_name
                .as_deref()
                .or(self.platform.default_voice())
                .unwrap_or(crate::speech::platform::DEFAULT_MAC_OS_VOICE);
            debug!("Speaking {} chars with native say", text.len());
            return speak_native(&text, config.speech_rate(), voice);
        }

        self.begin_utterance();
        debug!("Speaking {} chars with {}", text.len(), self.driver.name());
        self.driver.say(&text)?;
        self.finish_utterance();
        Ok(())
    }
}

/// Turn off options the platform cannot provide
pub fn normalize_config(platform: Platform, mut config: ResponseSettings) -> ResponseSettings {
    if config.use_mac_os_speech && !platform.supports_native_speech() {
        warn!(
            "use_mac_os_speech is set but this host is {}; using the speech engine instead",
            platform
        );
        config.use_mac_os_speech = false;
    }
    config
}

/// Set up speech for the current host
pub fn initialize(config: ResponseSettings) -> Result<(ResponseSettings, SpeechEngine)> {
    initialize_for(Platform::current(), config)
}

/// Set up speech as if running on `platform`
pub fn initialize_for(
    platform: Platform,
    config: ResponseSettings,
) -> Result<(ResponseSettings, SpeechEngine)> {
    let driver = default_driver(platform, &config)?;
    Ok(initialize_with_driver(platform, config, driver))
}

/// Set up speech around an already constructed driver
pub fn initialize_with_driver(
    platform: Platform,
    config: ResponseSettings,
    mut driver: Box<dyn SpeechDriver>,
) -> (ResponseSettings, SpeechEngine) {
    info!("Using {} speech on {}", driver.name(), platform);
    let config = normalize_config(platform, config);

    let voice_name = config
        .voice_name
        .clone()
        .or_else(|| platform.default_voice().map(str::to_string));

    if let Some(voice_name) = voice_name {
        match driver.voices() {
            Ok(voices) => match resolve_voice_id(&voices, &voice_name) {
                Some(id) => {
                    debug!("Using voice ID {} for voice {}", id, voice_name);
                    driver.set_voice(id);
                }
                None => warn!("Voice '{}' is not installed; keeping the default", voice_name),
            },
            Err(e) => warn!("Could not list voices: {}", e),
        }
    }

    driver.set_rate(config.speech_rate());

    (config, SpeechEngine::new(driver, platform))
}

#[cfg(feature = "neural-voice")]
fn default_driver(platform: Platform, config: &ResponseSettings) -> Result<Box<dyn SpeechDriver>> {
    match (&config.tts_model_path, &config.tts_tokens_path) {
        (Some(model), Some(tokens)) => Ok(Box::new(crate::speech::neural::NeuralDriver::new(
            crate::speech::neural::NeuralVoiceConfig::new(model, tokens)
                .with_rate(config.speech_rate()),
        )?)),
        _ => Ok(Box::new(CommandDriver::for_platform(platform))),
    }
}

#[cfg(not(feature = "neural-voice"))]
fn default_driver(platform: Platform, config: &ResponseSettings) -> Result<Box<dyn SpeechDriver>> {
    if config.tts_model_path.is_some() {
        warn!("tts_model_path is set but neural voices are not compiled in");
    }
    Ok(Box::new(CommandDriver::for_platform(platform)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::speech::VoiceInfo;
    use crate::ChatError;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records what it was asked to do
    #[derive(Clone, Default)]
    pub(crate) struct FakeDriver {
        pub spoken: Arc<Mutex<Vec<String>>>,
        pub ended: Arc<Mutex<usize>>,
        pub voice: Arc<Mutex<Option<String>>>,
        pub rate: Arc<Mutex<u32>>,
        pub fail_next: Arc<Mutex<bool>>,
        /// How long each utterance takes
        pub pause: Arc<Mutex<std::time::Duration>>,
    }

    impl SpeechDriver for FakeDriver {
        fn name(&self) -> &str {
            "fake"
        }

        fn voices(&mut self) -> Result<Vec<VoiceInfo>> {
            Ok(vec![VoiceInfo {
                id: "com.voice.samantha".to_string(),
                name: "Samantha".to_string(),
            }])
        }

        fn set_voice(&mut self, id: &str) {
            *self.voice.lock() = Some(id.to_string());
        }

        fn set_rate(&mut self, words_per_minute: u32) {
            *self.rate.lock() = words_per_minute;
        }

        fn say(&mut self, text: &str) -> Result<()> {
            if std::mem::take(&mut *self.fail_next.lock()) {
                return Err(ChatError::Speech("device busy".to_string()));
            }
            let pause = *self.pause.lock();
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
            self.spoken.lock().push(text.to_string());
            Ok(())
        }

        fn end_loop(&mut self) {
            *self.ended.lock() += 1;
        }
    }

    #[test]
    fn test_mac_speech_forced_off_elsewhere() {
        let config = ResponseSettings {
            use_mac_os_speech: true,
            ..Default::default()
        };

        let (updated, _engine) = initialize_for(Platform::Other, config.clone()).unwrap();
        assert!(!updated.use_mac_os_speech);

        let (updated, _engine) =
            initialize_with_driver(Platform::Windows, config.clone(), Box::new(FakeDriver::default()));
        assert!(!updated.use_mac_os_speech);

        let (updated, _engine) =
            initialize_with_driver(Platform::MacOs, config, Box::new(FakeDriver::default()));
        assert!(updated.use_mac_os_speech);
    }

    #[test]
    fn test_platform_default_voice_and_rate() {
        let driver = FakeDriver::default();
        let (_, _engine) = initialize_with_driver(
            Platform::MacOs,
            ResponseSettings::default(),
            Box::new(driver.clone()),
        );
        assert_eq!(driver.voice.lock().as_deref(), Some("com.voice.samantha"));
        assert_eq!(*driver.rate.lock(), 180);
    }

    #[test]
    fn test_unknown_voice_keeps_default() {
        let driver = FakeDriver::default();
        let config = ResponseSettings {
            voice_name: Some("Nobody".to_string()),
            speech_rate_wpm: Some(220.0),
            ..Default::default()
        };
        let _ = initialize_with_driver(Platform::Other, config, Box::new(driver.clone()));
        assert!(driver.voice.lock().is_none());
        assert_eq!(*driver.rate.lock(), 220);
    }

    #[test]
    fn test_speak_returns_to_idle() {
        let driver = FakeDriver::default();
        let mut engine = SpeechEngine::new(Box::new(driver.clone()), Platform::Other);
        let config = ResponseSettings::default();

        engine.speak("Hello there", &config).unwrap();
        engine.speak("Second time", &config).unwrap();

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(*driver.spoken.lock(), vec!["Hello there", "Second time"]);
        assert_eq!(*driver.ended.lock(), 0);
    }

    #[test]
    fn test_failed_utterance_is_ended_before_next() {
        let driver = FakeDriver::default();
        let mut engine = SpeechEngine::new(Box::new(driver.clone()), Platform::Other);
        let config = ResponseSettings::default();

        *driver.fail_next.lock() = true;
        assert!(engine.speak("first", &config).is_err());
        assert_eq!(engine.state(), EngineState::Speaking);

        engine.speak("second", &config).unwrap();
        assert_eq!(*driver.ended.lock(), 1);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_blank_text_is_skipped() {
        let driver = FakeDriver::default();
        let mut engine = SpeechEngine::new(Box::new(driver.clone()), Platform::Other);
        engine.speak("  ** ", &ResponseSettings::default()).unwrap();
        assert!(driver.spoken.lock().is_empty());
    }
}
