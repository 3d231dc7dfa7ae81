//! Walking guidance for a human user toward a named object.
//!
//! Guidance works on the objects currently in view.  Positions are read in
//! the camera-relative frame (X lateral, positive to the right; Z forward),
//! with the user at the origin unless a different position is supplied.

use explorer_types::{Position3, RecognizedObject};
use tracing::{debug, info};

use crate::audio::SpatialAudio;

/// Default distance at which the user counts as having arrived.
pub const DEFAULT_ARRIVAL_DISTANCE: f32 = 0.75;

/// Lateral offset beyond which the destination is "to the left/right".
const LATERAL_DEADBAND: f32 = 0.3;

/// Result of one [`NavigationAssistance::update_navigation`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum GuidanceUpdate {
    /// No navigation in progress.
    Idle,
    /// Navigating, but the destination is not among the visible objects.
    NotInView,
    /// An instruction was issued.
    Instruction(String),
    /// The user reached the destination; guidance has ended.
    Arrived,
}

#[derive(Debug, Clone)]
pub struct NavigationAssistance {
    destination: Option<String>,
    arrival_distance: f32,
}

impl Default for NavigationAssistance {
    fn default() -> Self {
        Self::new(DEFAULT_ARRIVAL_DISTANCE)
    }
}

impl NavigationAssistance {
    pub fn new(arrival_distance: f32) -> Self {
        Self {
            destination: None,
            arrival_distance,
        }
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn is_navigating(&self) -> bool {
        self.destination.is_some()
    }

    /// Begin guiding toward `target_name`, replacing any current destination.
    pub fn start_navigation(&mut self, target_name: &str, audio: &mut dyn SpatialAudio) {
        let target = target_name.trim().to_lowercase();
        info!(destination = %target, "Starting guidance");
        audio.play_text(&format!("Begin walking toward the {target}."));
        self.destination = Some(target);
    }

    pub fn update_navigation(
        &mut self,
        user_position: Position3,
        objects: &[RecognizedObject],
        audio: &mut dyn SpatialAudio,
    ) -> GuidanceUpdate {
        let Some(destination) = self.destination.as_deref() else {
            return GuidanceUpdate::Idle;
        };

        let Some(obj) = objects
            .iter()
            .find(|o| o.name.to_lowercase().contains(destination))
        else {
            debug!(destination, "destination not in view");
            return GuidanceUpdate::NotInView;
        };

        let dx = obj.position.x - user_position.x;
        let dy = obj.position.y - user_position.y;
        let dz = obj.position.z - user_position.z;
        let distance = (dx * dx + dy * dy + dz * dz).sqrt();

        if distance < self.arrival_distance {
            let name = obj.name.clone();
            audio.play_text(&format!("You have reached the {name}."));
            audio.stop_spatial_cue(&name);
            info!(destination = %name, "Guidance complete");
            self.destination = None;
            return GuidanceUpdate::Arrived;
        }

        let direction = if dx < -LATERAL_DEADBAND {
            "to your left"
        } else if dx > LATERAL_DEADBAND {
            "to your right"
        } else {
            "straight ahead"
        };
        let instruction = format!("The {} is {direction}, about {distance:.1} metres away.", obj.name);
        audio.play_text(&instruction);
        GuidanceUpdate::Instruction(instruction)
    }

    /// Cancel guidance.  No-op when idle.
    pub fn stop_navigation(&mut self) {
        if let Some(d) = self.destination.take() {
            info!(destination = %d, "Guidance stopped");
        }
    }
}
