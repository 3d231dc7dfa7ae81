//! Voice command boundary.
//!
//! Speech recognition itself is out of scope; a [`VoiceCommandSource`] hands
//! over already-transcribed commands.  [`ScriptedVoice`] replays a fixed
//! script so sessions and tests are reproducible.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Polled once per interaction step.
pub trait VoiceCommandSource: Send {
    /// The next transcribed command, or `None` when the user said nothing.
    fn capture_voice_command(&mut self) -> Option<String>;
}

/// Deterministic replay of a command script.
///
/// Each entry is consumed by one poll; `None` entries are silent polls.
/// Once the script is exhausted every poll returns `None`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedVoice {
    script: VecDeque<Option<String>>,
}

impl ScriptedVoice {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            script: commands.into_iter().map(|c| c.map(Into::into)).collect(),
        }
    }

    /// One command per line; blank lines become silent polls.
    pub fn from_lines(text: &str) -> Self {
        Self {
            script: text
                .lines()
                .map(|l| {
                    let l = l.trim();
                    (!l.is_empty()).then(|| l.to_string())
                })
                .collect(),
        }
    }

    /// Load a script file (see [`ScriptedVoice::from_lines`]).
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read voice script at {}: {}", path.display(), e))?;
        Ok(Self::from_lines(&raw))
    }

    pub fn push(&mut self, command: Option<String>) {
        self.script.push_back(command);
    }

    /// Number of polls left in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl VoiceCommandSource for ScriptedVoice {
    fn capture_voice_command(&mut self) -> Option<String> {
        self.script.pop_front().flatten()
    }
}
