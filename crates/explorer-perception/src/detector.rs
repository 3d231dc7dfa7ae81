//! Detector boundary.
//!
//! Real inference (YOLO, ONNX, …) lives outside this workspace; anything that
//! turns a [`CameraFrame`] into [`Detection`]s can plug in here.

use explorer_hal::camera::CameraFrame;
use explorer_types::{BoundingBox, Detection};

/// Produces the raw detections for one frame.
///
/// May return an empty list; must not fail for a well-formed frame.
pub trait Detector: Send {
    fn detect(&mut self, frame: &CameraFrame) -> Vec<Detection>;
}

/// Placeholder detector: reports a single object filling the central 40–60 %
/// of the frame on both axes.
#[derive(Debug, Clone)]
pub struct FixedBoxDetector {
    label: String,
    confidence: f32,
}

impl FixedBoxDetector {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

impl Default for FixedBoxDetector {
    fn default() -> Self {
        Self::new("chair", 0.90)
    }
}

impl Detector for FixedBoxDetector {
    fn detect(&mut self, frame: &CameraFrame) -> Vec<Detection> {
        if frame.width == 0 || frame.height == 0 {
            return Vec::new();
        }
        let w = frame.width as f32;
        let h = frame.height as f32;
        let bbox = BoundingBox::new(
            (w * 0.4).floor(),
            (h * 0.4).floor(),
            (w * 0.6).floor(),
            (h * 0.6).floor(),
        );
        vec![Detection::new(self.label.clone(), bbox, self.confidence)]
    }
}
