//! `explorer-types` – shared data model for the Explorer perception-to-action
//! pipeline.
//!
//! Every other crate in the workspace speaks in these types: the pose the
//! localization collaborator reports, the single navigation [`Target`], the
//! [`MotorCommand`] produced each tick, raw [`Detection`]s from a detector and
//! the [`RecognizedObject`]s derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Estimated robot (or observer) pose in the shared 2-D frame.
///
/// `heading_rad` is 0 when facing the +x axis and grows counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading_rad: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, heading_rad: f32) -> Self {
        Self { x, y, heading_rad }
    }
}

/// The single active navigation goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f32,
    pub y: f32,
}

impl Target {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from `pose` to this target, ignoring heading.
    pub fn distance_from(&self, pose: &Pose) -> f32 {
        let dx = self.x - pose.x;
        let dy = self.y - pose.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Differential-drive velocity command produced fresh on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorCommand {
    pub linear_speed: f32,
    pub angular_speed: f32,
}

impl MotorCommand {
    /// Explicit hold-position command.
    pub const STOP: Self = Self {
        linear_speed: 0.0,
        angular_speed: 0.0,
    };

    pub fn new(linear_speed: f32, angular_speed: f32) -> Self {
        Self {
            linear_speed,
            angular_speed,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.linear_speed == 0.0 && self.angular_speed == 0.0
    }
}

/// Axis-aligned pixel-space bounding box `(x1, y1)`–`(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Centre of the box in pixels.
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// `true` when the box has no positive extent on either axis (this also
    /// catches NaN corners).
    pub fn is_degenerate(&self) -> bool {
        !(self.x1 < self.x2 && self.y1 < self.y2)
    }
}

/// A raw detection as reported by the external detector for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub bbox: BoundingBox,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Detection {
    /// Build a detection, clamping `confidence` into `[0, 1]` (NaN becomes 0).
    pub fn new(label: impl Into<String>, bbox: BoundingBox, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            bbox,
            confidence,
        }
    }
}

/// A point in the shared 3-D frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for Position3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Catalog metadata for one object label, e.g. the `"chair"` entry of a
/// furniture database.
///
/// Extra keys present in the source document are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// A detection merged with catalog metadata and a 3-D position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedObject {
    pub name: String,
    pub category: String,
    pub description: String,
    pub position: Position3,
    pub confidence: f32,
}

/// The set of objects recognized in one frame.  A newer observation replaces
/// the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameObservation {
    pub captured_at: DateTime<Utc>,
    pub objects: Vec<RecognizedObject>,
}

impl FrameObservation {
    pub fn new(objects: Vec<RecognizedObject>) -> Self {
        Self {
            captured_at: Utc::now(),
            objects,
        }
    }
}

/// Operating mode selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// AR glasses: spatial audio, voice commands.
    #[default]
    Human,
    /// Autonomous robot: camera feed, goal seeking.
    Robot,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Human => write!(f, "human"),
            Mode::Robot => write!(f, "robot"),
        }
    }
}

/// Workspace-wide error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    #[error("Invalid detection geometry: {reason}")]
    InvalidDetectionGeometry { reason: String },

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Catalog Error: {0}")]
    Catalog(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl ExplorerError {
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidDetectionGeometry {
            reason: reason.into(),
        }
    }

    pub fn hardware_fault(component: impl Into<String>, details: impl Into<String>) -> Self {
        Self::HardwareFault {
            component: component.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_distance_ignores_heading() {
        let target = Target::new(5.0, 0.0);
        let d = target.distance_from(&Pose::new(4.85, 0.0, 2.0));
        assert!((d - 0.15).abs() < 1e-5);
    }

    #[test]
    fn stop_command_is_zero() {
        assert!(MotorCommand::STOP.is_stop());
        assert!(!MotorCommand::new(0.1, 0.0).is_stop());
    }

    #[test]
    fn bounding_box_center_and_degeneracy() {
        let b = BoundingBox::new(100.0, 50.0, 200.0, 150.0);
        assert_eq!(b.center(), (150.0, 100.0));
        assert!(!b.is_degenerate());

        assert!(BoundingBox::new(10.0, 0.0, 10.0, 5.0).is_degenerate());
        assert!(BoundingBox::new(0.0, 5.0, 10.0, 5.0).is_degenerate());
        assert!(BoundingBox::new(20.0, 0.0, 10.0, 5.0).is_degenerate());
        assert!(BoundingBox::new(f32::NAN, 0.0, 10.0, 5.0).is_degenerate());
    }

    #[test]
    fn detection_confidence_is_clamped() {
        let b = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(Detection::new("chair", b, 1.7).confidence, 1.0);
        assert_eq!(Detection::new("chair", b, -0.2).confidence, 0.0);
        assert_eq!(Detection::new("chair", b, f32::NAN).confidence, 0.0);
        assert!((Detection::new("chair", b, 0.9).confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn catalog_entry_reads_type_key_and_ignores_extras() {
        let json = r#"{"name":"chair","type":"furniture","description":"A seat","legs":4}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.name, "chair");
        assert_eq!(entry.category, "furniture");
        assert_eq!(entry.description, "A seat");
    }

    #[test]
    fn catalog_entry_description_defaults_to_empty() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"name":"lamp","type":"lighting"}"#).unwrap();
        assert!(entry.description.is_empty());
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Robot).unwrap(), "\"robot\"");
        assert_eq!(Mode::Human.to_string(), "human");
    }

    #[test]
    fn explorer_error_display() {
        let err = ExplorerError::invalid_geometry("image width must be positive");
        assert!(err.to_string().contains("image width"));

        let err = ExplorerError::hardware_fault("drive_base", "robot not connected");
        assert!(err.to_string().contains("drive_base"));
    }

    #[test]
    fn position_display_has_two_decimals() {
        assert_eq!(Position3::new(0.5, 0.0, 2.0).to_string(), "(0.50, 0.00, 2.00)");
    }
}
