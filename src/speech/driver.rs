//! Speech drivers
//!
//! A driver owns one way of turning text into sound. The engine in
//! [`crate::speech::engine`] decides when to call it.

use crate::speech::Platform;
use crate::{ChatError, Result};
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// An installed voice as reported by a driver
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Identifier the driver accepts when selecting the voice
    pub id: String,
    /// Display name users put in configuration
    pub name: String,
}

/// Something that can speak text aloud
pub trait SpeechDriver: Send {
    fn name(&self) -> &str;

    /// List installed voices
    fn voices(&mut self) -> Result<Vec<VoiceInfo>>;

    fn set_voice(&mut self, id: &str);

    fn set_rate(&mut self, words_per_minute: u32);

    /// Speak `text`, returning once playback has finished
    fn say(&mut self, text: &str) -> Result<()>;

    /// Stop an utterance that never completed
    fn end_loop(&mut self);
}

/// Find the driver id for a configured voice name
pub fn resolve_voice_id<'a>(voices: &'a [VoiceInfo], name: &str) -> Option<&'a str> {
    voices
        .iter()
        .find(|voice| voice.name == name)
        .or_else(|| voices.iter().find(|voice| voice.id == name))
        .map(|voice| voice.id.as_str())
}

/// The system speech command for each platform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemCommand {
    /// macOS `say`
    Say,
    /// `espeak` on Linux and other Unixes
    Espeak,
    /// Windows `System.Speech` through PowerShell
    PowerShell,
}

impl SystemCommand {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::MacOs => SystemCommand::Say,
            Platform::Windows => SystemCommand::PowerShell,
            Platform::Other => SystemCommand::Espeak,
        }
    }

    fn program(&self) -> &'static str {
        match self {
            SystemCommand::Say => "say",
            SystemCommand::Espeak => "espeak",
            SystemCommand::PowerShell => "powershell",
        }
    }

    /// Arguments that speak `text`
    pub fn speak_args(&self, text: &str, voice: Option<&str>, rate: u32) -> Vec<String> {
        match self {
            SystemCommand::Say => {
                let mut args = Vec::new();
                if let Some(voice) = voice {
                    args.extend(["-v".to_string(), voice.to_string()]);
                }
                args.extend(["-r".to_string(), rate.to_string(), text.to_string()]);
                args
            }
            SystemCommand::Espeak => {
                let mut args = Vec::new();
                if let Some(voice) = voice {
                    args.extend(["-v".to_string(), voice.to_string()]);
                }
                args.extend(["-s".to_string(), rate.to_string(), text.to_string()]);
                args
            }
            SystemCommand::PowerShell => {
                let select = voice
                    .map(|v| format!("$s.SelectVoice('{}'); ", powershell_quote(v)))
                    .unwrap_or_default();
                let script = format!(
                    "Add-Type -AssemblyName System.Speech; \
                     $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
                     {}$s.Rate = {}; $s.Speak('{}')",
                    select,
                    sapi_rate(rate),
                    powershell_quote(text)
                );
                vec!["-NoProfile".to_string(), "-Command".to_string(), script]
            }
        }
    }

    fn list_voices_args(&self) -> Vec<String> {
        match self {
            SystemCommand::Say => vec!["-v".to_string(), "?".to_string()],
            SystemCommand::Espeak => vec!["--voices".to_string()],
            SystemCommand::PowerShell => vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                "Add-Type -AssemblyName System.Speech; \
                 (New-Object System.Speech.Synthesis.SpeechSynthesizer).GetInstalledVoices() \
                 | ForEach-Object { $_.VoiceInfo.Name }"
                    .to_string(),
            ],
        }
    }

    /// Parse the voice listing printed by the command
    pub fn parse_voices(&self, output: &str) -> Vec<VoiceInfo> {
        match self {
            SystemCommand::Say => output.lines().filter_map(parse_say_voice).collect(),
            SystemCommand::Espeak => output.lines().skip(1).filter_map(parse_espeak_voice).collect(),
            SystemCommand::PowerShell => output
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|name| VoiceInfo {
                    id: name.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

/// `Samantha            en_US    # Hello, my name is Samantha.`
fn parse_say_voice(line: &str) -> Option<VoiceInfo> {
    let left = line.split('#').next()?.trim_end();
    let (name, _locale) = left.rsplit_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(VoiceInfo {
        id: name.to_string(),
        name: name.to_string(),
    })
}

/// ` 5  en-us          --/M      English_(America)  gmw/en-US        (en 3)`
fn parse_espeak_voice(line: &str) -> Option<VoiceInfo> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    match columns.as_slice() {
        [_pty, _language, _gender, name, file, ..] => Some(VoiceInfo {
            id: file.to_string(),
            name: name.replace('_', " "),
        }),
        _ => None,
    }
}

/// Map words per minute onto the SAPI -10..=10 scale
fn sapi_rate(words_per_minute: u32) -> i32 {
    ((words_per_minute as i32 - 180) / 20).clamp(-10, 10)
}

fn powershell_quote(text: &str) -> String {
    text.replace('\'', "''")
}

/// Driver that shells out to the platform speech command
pub struct CommandDriver {
    command: SystemCommand,
    voice: Option<String>,
    rate: u32,
    child: Option<Child>,
}

impl CommandDriver {
    pub fn new(command: SystemCommand) -> Self {
        Self {
            command,
            voice: None,
            rate: crate::config::sections::DEFAULT_SPEECH_RATE_WPM,
            child: None,
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self::new(SystemCommand::for_platform(platform))
    }
}

impl SpeechDriver for CommandDriver {
    fn name(&self) -> &str {
        self.command.program()
    }

    fn voices(&mut self) -> Result<Vec<VoiceInfo>> {
        let output = Command::new(self.command.program())
            .args(self.command.list_voices_args())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| {
                ChatError::Speech(format!("Failed to run {}: {}", self.command.program(), e))
            })?;
        Ok(self
            .command
            .parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn set_voice(&mut self, id: &str) {
        self.voice = Some(id.to_string());
    }

    fn set_rate(&mut self, words_per_minute: u32) {
        self.rate = words_per_minute;
    }

    fn say(&mut self, text: &str) -> Result<()> {
        let program = self.command.program();
        let child = Command::new(program)
            .args(self.command.speak_args(text, self.voice.as_deref(), self.rate))
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| ChatError::Speech(format!("Failed to start {}: {}", program, e)))?;

        let status = self
            .child
            .insert(child)
            .wait()
            .map_err(|e| ChatError::Speech(format!("{} did not finish: {}", program, e)))?;
        self.child = None;

        if !status.success() {
            return Err(ChatError::Speech(format!("{} exited with {}", program, status)));
        }
        Ok(())
    }

    fn end_loop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("Stopping unfinished {} process", self.command.program());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Arguments for the direct macOS `say` mode
pub fn native_say_args(text: &str, rate: u32, voice: &str) -> Vec<String> {
    vec![
        "-r".to_string(),
        rate.to_string(),
        "-v".to_string(),
        voice.to_string(),
        text.to_string(),
    ]
}

/// Speak through `say -r <rate> -v <voice> <text>`, blocking until done
pub fn speak_native(text: &str, rate: u32, voice: &str) -> Result<()> {
    let status = Command::new("say")
        .args(native_say_args(text, rate, voice))
        .stdout(Stdio::null())
        .status()
        .map_err(|e| ChatError::Speech(format!("Failed to run say: {}", e)))?;

    if !status.success() {
        return Err(ChatError::Speech(format!("say exited with {}", status)));
    }
    Ok(())
}
