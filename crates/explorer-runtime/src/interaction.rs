//! Human (AR glasses) mode: perception, spatial cues and voice commands.

use std::collections::HashSet;

use explorer_hal::{FrameSource, HeadTracker, VoiceCommandSource};
use explorer_perception::{Catalog, CameraPose, DetectionMapper, Detector, ImageSize, associate_frame};
use explorer_types::{FrameObservation, Position3, RecognizedObject};
use tracing::{debug, info, warn};

use crate::audio::SpatialAudio;
use crate::guidance::{GuidanceUpdate, NavigationAssistance};
use crate::llm::{LanguageModel, query_environment};

// ─────────────────────────────────────────────────────────────────────────────
// Voice intents
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceIntent {
    /// "navigate to the fridge"
    Navigate(String),
    /// "what am I looking at?", "what is around", "describe"
    DescribeSurroundings,
    /// "where is the table?"
    Locate(String),
    Unrecognized(String),
}

impl VoiceIntent {
    pub fn parse(command: &str) -> Self {
        let lower = command.trim().to_lowercase();
        let cleaned = lower.trim_end_matches(['?', '.', '!']).trim_end();

        if let Some(idx) = cleaned.find("navigate to") {
            let target = object_name(&cleaned[idx + "navigate to".len()..]);
            if !target.is_empty() {
                return Self::Navigate(target);
            }
        }
        if cleaned.contains("what am i looking at")
            || cleaned.contains("what is around")
            || cleaned.contains("describe")
        {
            return Self::DescribeSurroundings;
        }
        if let Some(idx) = cleaned.find("where is") {
            let target = object_name(&cleaned[idx + "where is".len()..]);
            if !target.is_empty() {
                return Self::Locate(target);
            }
        }
        Self::Unrecognized(command.trim().to_string())
    }
}

fn object_name(raw: &str) -> String {
    let s = raw.trim();
    s.strip_prefix("the ").unwrap_or(s).trim().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// How a voice command was answered.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceResponse {
    NavigationStarted(String),
    Described(String),
    Located { name: String, position: Position3 },
    NotFound(String),
    Unrecognized(String),
    /// The language model failed; the message is the error text.
    LlmFailed(String),
}

/// What one [`UserInteraction::process_input`] call did.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionOutcome {
    /// `None` when the glasses produced no frame.
    pub observation: Option<FrameObservation>,
    pub voice_command: Option<String>,
    pub response: Option<VoiceResponse>,
    pub guidance: GuidanceUpdate,
}

// ─────────────────────────────────────────────────────────────────────────────
// UserInteraction
// ─────────────────────────────────────────────────────────────────────────────

/// The glasses-side devices.
pub struct HumanDevices {
    pub frames: Box<dyn FrameSource>,
    pub head: Box<dyn HeadTracker>,
    pub voice: Box<dyn VoiceCommandSource>,
}

pub struct UserInteraction {
    devices: HumanDevices,
    detector: Box<dyn Detector>,
    catalog: Catalog,
    mapper: DetectionMapper,
    audio: Box<dyn SpatialAudio>,
    guidance: NavigationAssistance,
    llm: Box<dyn LanguageModel>,
    objects: Vec<RecognizedObject>,
}

impl UserInteraction {
    pub fn new(
        devices: HumanDevices,
        detector: Box<dyn Detector>,
        catalog: Catalog,
        mapper: DetectionMapper,
        audio: Box<dyn SpatialAudio>,
        guidance: NavigationAssistance,
        llm: Box<dyn LanguageModel>,
    ) -> Self {
        Self {
            devices,
            detector,
            catalog,
            mapper,
            audio,
            guidance,
            llm,
            objects: Vec::new(),
        }
    }

    /// Objects recognized in the most recent frame.
    pub fn objects(&self) -> &[RecognizedObject] {
        &self.objects
    }

    pub fn guidance(&self) -> &NavigationAssistance {
        &self.guidance
    }

    /// One interaction step: perceive, announce, listen, guide.
    pub fn process_input(&mut self) -> InteractionOutcome {
        // ── 1. Perceive ──────────────────────────────────────────────────────
        let observation = self.devices.frames.get_frame().map(|frame| {
            let (yaw, pitch, roll) = self.devices.head.head_orientation();
            let detections = self.detector.detect(&frame);
            associate_frame(
                &detections,
                &CameraPose::from_head_orientation(yaw, pitch, roll),
                &self.catalog,
                ImageSize::new(frame.width, frame.height),
                &self.mapper,
            )
        });

        if let Some(obs) = &observation {
            self.announce(&obs.objects);
            self.objects = obs.objects.clone();
        }

        // ── 2. Listen ────────────────────────────────────────────────────────
        let voice_command = self.devices.voice.capture_voice_command();
        let response = voice_command
            .as_deref()
            .map(|cmd| self.handle_voice_command(cmd));

        // ── 3. Guide ─────────────────────────────────────────────────────────
        let guidance = self
            .guidance
            .update_navigation(Position3::default(), &self.objects, self.audio.as_mut());
        self.audio.update();

        InteractionOutcome {
            observation,
            voice_command,
            response,
            guidance,
        }
    }

    /// Play a cue per visible object and silence the ones that left view.
    fn announce(&mut self, objects: &[RecognizedObject]) {
        let visible: HashSet<&str> = objects.iter().map(|o| o.name.as_str()).collect();
        for gone in self.objects.iter().filter(|o| !visible.contains(o.name.as_str())) {
            self.audio.stop_spatial_cue(&gone.name);
        }
        for obj in objects {
            self.audio.play_spatial_cue(&obj.name, obj.position);
        }
    }

    pub fn handle_voice_command(&mut self, command: &str) -> VoiceResponse {
        info!(command, "Voice command received");
        match VoiceIntent::parse(command) {
            VoiceIntent::Navigate(target) => {
                self.guidance.start_navigation(&target, self.audio.as_mut());
                VoiceResponse::NavigationStarted(target)
            }
            VoiceIntent::DescribeSurroundings => {
                match query_environment(self.llm.as_mut(), command, &self.objects) {
                    Ok(answer) => {
                        self.audio.play_text(&answer);
                        VoiceResponse::Described(answer)
                    }
                    Err(e) => {
                        warn!(error = %e, "language model query failed");
                        VoiceResponse::LlmFailed(e.to_string())
                    }
                }
            }
            VoiceIntent::Locate(name) => {
                let found = self
                    .objects
                    .iter()
                    .find(|o| o.name.to_lowercase().contains(&name));
                match found {
                    Some(obj) => {
                        let answer = format!("The {} is at approximate 3D position {}.", obj.name, obj.position);
                        self.audio.play_text(&answer);
                        VoiceResponse::Located {
                            name: obj.name.clone(),
                            position: obj.position,
                        }
                    }
                    None => {
                        self.audio
                            .play_text(&format!("I can't see a {name} right now."));
                        VoiceResponse::NotFound(name)
                    }
                }
            }
            VoiceIntent::Unrecognized(text) => {
                debug!(command = %text, "command not recognized");
                VoiceResponse::Unrecognized(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use explorer_hal::{CameraFrame, ScriptedVoice, SimGlasses};
    use explorer_perception::{FixedBoxDetector, MapperConfig};
    use explorer_types::{BoundingBox, CatalogEntry, Detection};

    use crate::llm::CannedLanguageModel;

    #[test]
    fn parses_navigation() {
        assert_eq!(VoiceIntent::parse("Navigate to the fridge."), VoiceIntent::Navigate("fridge".into()));
        assert_eq!(VoiceIntent::parse("please navigate to kitchen table"), VoiceIntent::Navigate("kitchen table".into()));
    }

    #[test]
    fn parses_describe_variants() {
        for cmd in ["What am I looking at?", "what is around me", "Describe the room"] {
            assert_eq!(VoiceIntent::parse(cmd), VoiceIntent::DescribeSurroundings, "{cmd}");
        }
    }

    #[test]
    fn parses_locate() {
        assert_eq!(VoiceIntent::parse("Where is the table?"), VoiceIntent::Locate("table".into()));
        assert_eq!(VoiceIntent::parse("where is chair"), VoiceIntent::Locate("chair".into()));
    }

    #[test]
    fn unknown_and_empty_targets_are_unrecognized() {
        assert_eq!(VoiceIntent::parse("sing a song"), VoiceIntent::Unrecognized("sing a song".into()));
        assert!(matches!(VoiceIntent::parse("navigate to"), VoiceIntent::Unrecognized(_)));
        assert!(matches!(VoiceIntent::parse("where is?"), VoiceIntent::Unrecognized(_)));
    }

    /// Records audio calls so tests can inspect them after the engine has
    /// been boxed into the interaction.
    #[derive(Clone, Default)]
    struct RecordingAudio {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingAudio {
        fn entries(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl SpatialAudio for RecordingAudio {
        fn play_spatial_cue(&mut self, label: &str, _position: Position3) {
            self.log.lock().unwrap().push(format!("cue:{label}"));
        }
        fn stop_spatial_cue(&mut self, label: &str) {
            self.log.lock().unwrap().push(format!("stop:{label}"));
        }
        fn play_text(&mut self, text: &str) {
            self.log.lock().unwrap().push(format!("say:{text}"));
        }
        fn update(&mut self) {}
    }

    /// Emits the labels it is given, one fixed box each, then nothing.
    struct ScriptedDetector {
        frames: Vec<Vec<&'static str>>,
    }

    impl Detector for ScriptedDetector {
        fn detect(&mut self, _frame: &CameraFrame) -> Vec<Detection> {
            if self.frames.is_empty() {
                return Vec::new();
            }
            self.frames
                .remove(0)
                .into_iter()
                .map(|l| Detection::new(l, BoundingBox::new(100.0, 100.0, 200.0, 200.0), 0.8))
                .collect()
        }
    }

    fn catalog() -> Catalog {
        let mut c = Catalog::new();
        c.insert(
            "chair",
            CatalogEntry {
                name: "Office Chair".into(),
                category: "furniture".into(),
                description: String::new(),
            },
        );
        c
    }

    fn interaction(glasses: &SimGlasses, detector: Box<dyn Detector>, audio: RecordingAudio) -> UserInteraction {
        UserInteraction::new(
            HumanDevices {
                frames: Box::new(glasses.clone()),
                head: Box::new(glasses.clone()),
                voice: Box::new(glasses.clone()),
            },
            detector,
            catalog(),
            DetectionMapper::new(MapperConfig::default()).unwrap(),
            Box::new(audio),
            NavigationAssistance::default(),
            Box::new(CannedLanguageModel::new("You are facing a chair.")),
        )
    }

    #[test]
    fn frame_produces_cues_and_replaces_objects() {
        let glasses = SimGlasses::new(640, 480);
        glasses.connect();
        let audio = RecordingAudio::default();
        let detector = ScriptedDetector {
            frames: vec![vec!["chair", "lamp"], vec!["lamp"]],
        };
        let mut ui = interaction(&glasses, Box::new(detector), audio.clone());

        let out = ui.process_input();
        assert_eq!(out.observation.unwrap().objects.len(), 2);
        assert_eq!(ui.objects()[0].name, "Office Chair");
        assert_eq!(ui.objects()[1].category, "unknown");

        ui.process_input();
        assert_eq!(ui.objects().len(), 1);
        assert_eq!(
            audio.entries(),
            ["cue:Office Chair", "cue:lamp", "stop:Office Chair", "cue:lamp"]
        );
    }

    #[test]
    fn disconnected_glasses_keep_previous_objects() {
        let glasses = SimGlasses::new(640, 480);
        glasses.connect();
        let mut ui = interaction(&glasses, Box::new(FixedBoxDetector::default()), RecordingAudio::default());
        ui.process_input();
        assert_eq!(ui.objects().len(), 1);

        glasses.disconnect();
        let out = ui.process_input();
        assert!(out.observation.is_none());
        assert!(out.voice_command.is_none());
        assert_eq!(ui.objects().len(), 1);
    }

    #[test]
    fn voice_commands_are_handled() {
        let voice = ScriptedVoice::new([
            Some("What am I looking at?"),
            Some("Where is the chair?"),
            Some("Where is the sofa?"),
            None,
            Some("Navigate to the chair"),
            Some("Open the pod bay doors"),
        ]);
        let glasses = SimGlasses::new(640, 480).with_voice(voice);
        glasses.connect();
        let audio = RecordingAudio::default();
        let mut ui = interaction(&glasses, Box::new(FixedBoxDetector::default()), audio.clone());

        let out = ui.process_input();
        assert_eq!(out.response, Some(VoiceResponse::Described("You are facing a chair.".into())));

        let out = ui.process_input();
        assert!(matches!(
            out.response,
            Some(VoiceResponse::Located { ref name, .. }) if name == "Office Chair"
        ));

        let out = ui.process_input();
        assert_eq!(out.response, Some(VoiceResponse::NotFound("sofa".into())));

        let out = ui.process_input();
        assert_eq!(out.response, None);
        assert_eq!(out.guidance, GuidanceUpdate::Idle);

        let out = ui.process_input();
        assert_eq!(out.response, Some(VoiceResponse::NavigationStarted("chair".into())));
        // Chair sits 2 m ahead; guidance starts right away.
        assert!(matches!(out.guidance, GuidanceUpdate::Instruction(ref t) if t.contains("straight ahead")));

        let out = ui.process_input();
        assert!(matches!(out.response, Some(VoiceResponse::Unrecognized(_))));
        assert!(ui.guidance().is_navigating());
        assert!(audio.entries().iter().any(|e| e.starts_with("say:Begin walking toward the chair")));
    }
}
