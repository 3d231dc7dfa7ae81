//! Spatial audio cues for the human (AR glasses) mode.
//!
//! Real 3-D audio rendering is out of scope; [`ConsoleAudioEngine`] logs each
//! cue with its position and keeps track of which cues are active.

use std::collections::BTreeMap;

use explorer_types::Position3;
use tracing::{debug, info, warn};

/// Directional audio output.
pub trait SpatialAudio: Send {
    /// Start (or move) the cue for `label` at `position`.
    fn play_spatial_cue(&mut self, label: &str, position: Position3);
    fn stop_spatial_cue(&mut self, label: &str);
    /// Speak `text` (text-to-speech).
    fn play_text(&mut self, text: &str);
    /// Periodic refresh, called once per interaction step.
    fn update(&mut self);
}

/// Logging stand-in for a spatial audio backend.
///
/// Calls made before [`ConsoleAudioEngine::initialize`] are ignored with a
/// warning.
#[derive(Debug, Default)]
pub struct ConsoleAudioEngine {
    initialized: bool,
    active: BTreeMap<String, Position3>,
    spoken: Vec<String>,
}

impl ConsoleAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self) {
        info!("Spatial audio engine initialised (console backend)");
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Position of the active cue for `label`, if any.
    pub fn active_cue(&self, label: &str) -> Option<Position3> {
        self.active.get(label).copied()
    }

    pub fn active_cue_count(&self) -> usize {
        self.active.len()
    }

    /// Everything passed to [`SpatialAudio::play_text`], oldest first.
    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }
}

impl SpatialAudio for ConsoleAudioEngine {
    fn play_spatial_cue(&mut self, label: &str, position: Position3) {
        if !self.initialized {
            warn!(label, "Audio engine not initialised; cue dropped");
            return;
        }
        info!(label, position = %position, "Playing spatial cue");
        self.active.insert(label.to_string(), position);
    }

    fn stop_spatial_cue(&mut self, label: &str) {
        if !self.initialized {
            return;
        }
        if self.active.remove(label).is_some() {
            info!(label, "Stopped spatial cue");
        }
    }

    fn play_text(&mut self, text: &str) {
        if !self.initialized {
            warn!("Audio engine not initialised; speech dropped");
            return;
        }
        info!(text, "[TTS]");
        self.spoken.push(text.to_string());
    }

    fn update(&mut self) {
        if !self.initialized {
            return;
        }
        debug!(active = self.active.len(), "audio update");
    }
}
