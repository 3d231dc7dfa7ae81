//! Detection-to-position mapper.
//!
//! Turns a pixel bounding box into an approximate 3-D point.  This is a
//! stand-in for intrinsics-based triangulation or depth-sensor fusion: the
//! lateral offset comes from where the box sits horizontally in the image,
//! and the depth is a configured constant, not a measurement.  Swapping in a
//! real estimator only has to keep the `map_to_3d` signature.
//!
//! # Example
//!
//! ```rust
//! use explorer_perception::mapper::{DetectionMapper, ImageSize, MapperConfig};
//! use explorer_perception::transform::CameraPose;
//! use explorer_types::BoundingBox;
//!
//! let mapper = DetectionMapper::new(MapperConfig::default()).unwrap();
//! let bbox = BoundingBox::new(480.0, 100.0, 640.0, 200.0); // right edge
//! let p = mapper
//!     .map_to_3d(&bbox, &CameraPose::default(), ImageSize::new(640, 480))
//!     .unwrap();
//! assert!((p.x - 0.75).abs() < 1e-5);
//! assert_eq!(p.z, 2.0);
//! ```

use explorer_types::{BoundingBox, ExplorerError, Position3};
use serde::{Deserialize, Serialize};

use crate::transform::{CameraPose, CameraRelative, FrameTransform, PlanarWorld, Vec3};

/// Image metadata the mapper needs.  `height` is only read when a vertical
/// scale is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Which built-in [`FrameTransform`] the mapper uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFrame {
    /// Positions relative to the camera ([`CameraRelative`]).
    #[default]
    Camera,
    /// World X/Y on the ground plane, Z still the assumed depth
    /// ([`PlanarWorld`]).
    World,
}

/// Tunables for the approximation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Metres of lateral offset at the image edge.
    #[serde(default = "default_lateral_scale")]
    pub lateral_scale: f32,

    /// Depth assigned to every detection, in metres.  Must be > 0.
    #[serde(default = "default_assumed_depth")]
    pub assumed_depth: f32,

    /// Metres of vertical offset at the image edge.  `None` keeps Y at 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_scale: Option<f32>,

    #[serde(default)]
    pub frame: OutputFrame,
}

fn default_lateral_scale() -> f32 {
    1.0
}
fn default_assumed_depth() -> f32 {
    2.0
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            lateral_scale: default_lateral_scale(),
            assumed_depth: default_assumed_depth(),
            vertical_scale: None,
            frame: OutputFrame::default(),
        }
    }
}

impl MapperConfig {
    /// # Errors
    ///
    /// [`ExplorerError::Config`] when `assumed_depth` is not strictly
    /// positive or a scale is not finite.
    pub fn validate(&self) -> Result<(), ExplorerError> {
        if !(self.assumed_depth > 0.0) || !self.assumed_depth.is_finite() {
            return Err(ExplorerError::Config(format!(
                "mapper.assumed_depth must be > 0, got {}",
                self.assumed_depth
            )));
        }
        if !self.lateral_scale.is_finite() {
            return Err(ExplorerError::Config(
                "mapper.lateral_scale must be finite".to_string(),
            ));
        }
        if let Some(v) = self.vertical_scale
            && !v.is_finite()
        {
            return Err(ExplorerError::Config(
                "mapper.vertical_scale must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Box + camera pose + image metadata → approximate 3-D position.
pub struct DetectionMapper {
    config: MapperConfig,
    transform: Box<dyn FrameTransform>,
}

impl std::fmt::Debug for DetectionMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionMapper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DetectionMapper {
    /// Build a mapper using the transform selected by `config.frame`.
    ///
    /// # Errors
    ///
    /// Propagates [`MapperConfig::validate`].
    pub fn new(config: MapperConfig) -> Result<Self, ExplorerError> {
        config.validate()?;
        let transform: Box<dyn FrameTransform> = match config.frame {
            OutputFrame::Camera => Box::new(CameraRelative),
            OutputFrame::World => Box::new(PlanarWorld),
        };
        Ok(Self { config, transform })
    }

    /// Replace the coordinate transform with a custom one.
    pub fn with_transform(mut self, transform: Box<dyn FrameTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Map `bbox` to a point in the shared frame.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::InvalidDetectionGeometry`] when the box is degenerate
    /// (`x1 >= x2` or `y1 >= y2`), the image width is zero, or a vertical
    /// scale is configured and the image height is zero.
    pub fn map_to_3d(
        &self,
        bbox: &BoundingBox,
        camera_pose: &CameraPose,
        image: ImageSize,
    ) -> Result<Position3, ExplorerError> {
        if image.width == 0 {
            return Err(ExplorerError::invalid_geometry("image width must be positive"));
        }
        if bbox.is_degenerate() {
            return Err(ExplorerError::invalid_geometry(format!(
                "degenerate box ({}, {}, {}, {})",
                bbox.x1, bbox.y1, bbox.x2, bbox.y2
            )));
        }

        let (cx, cy) = bbox.center();
        let half_w = image.width as f32 / 2.0;
        let x = (cx - half_w) / half_w * self.config.lateral_scale;

        let y = match self.config.vertical_scale {
            Some(scale) => {
                if image.height == 0 {
                    return Err(ExplorerError::invalid_geometry(
                        "image height must be positive when a vertical scale is set",
                    ));
                }
                let half_h = image.height as f32 / 2.0;
                (cy - half_h) / half_h * scale
            }
            None => 0.0,
        };

        let camera_point = Vec3::new(x, y, self.config.assumed_depth);
        let p = self.transform.to_shared_frame(camera_point, camera_pose);
        Ok(Position3::new(p.x, p.y, p.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_types::Pose;

    const VGA: ImageSize = ImageSize {
        width: 640,
        height: 480,
    };

    fn mapper() -> DetectionMapper {
        DetectionMapper::new(MapperConfig::default()).unwrap()
    }

    fn box_centred_at(cx: f32) -> BoundingBox {
        BoundingBox::new(cx - 10.0, 100.0, cx + 10.0, 200.0)
    }

    #[test]
    fn centred_box_maps_to_zero_lateral_offset() {
        let p = mapper()
            .map_to_3d(&box_centred_at(320.0), &CameraPose::default(), VGA)
            .unwrap();
        assert!(p.x.abs() < 1e-6);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.z, 2.0);
    }

    #[test]
    fn image_edges_map_to_plus_minus_lateral_scale() {
        let m = DetectionMapper::new(MapperConfig {
            lateral_scale: 1.5,
            ..MapperConfig::default()
        })
        .unwrap();
        let left = m.map_to_3d(&box_centred_at(0.0), &CameraPose::default(), VGA).unwrap();
        let right = m.map_to_3d(&box_centred_at(640.0), &CameraPose::default(), VGA).unwrap();
        assert!((left.x + 1.5).abs() < 1e-5);
        assert!((right.x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn depth_is_constant_and_lateral_offset_monotonic() {
        let m = mapper();
        let mut previous = f32::NEG_INFINITY;
        for cx in [15.0, 100.0, 250.0, 320.0, 321.0, 500.0, 630.0] {
            let p = m.map_to_3d(&box_centred_at(cx), &CameraPose::default(), VGA).unwrap();
            assert_eq!(p.z, 2.0);
            assert!(p.x > previous, "x must increase with box centre ({cx})");
            previous = p.x;
        }
    }

    #[test]
    fn assumed_depth_is_configurable() {
        let m = DetectionMapper::new(MapperConfig {
            assumed_depth: 3.5,
            ..MapperConfig::default()
        })
        .unwrap();
        let p = m.map_to_3d(&box_centred_at(320.0), &CameraPose::default(), VGA).unwrap();
        assert_eq!(p.z, 3.5);
    }

    #[test]
    fn vertical_scale_offsets_y_from_box_centre() {
        let m = DetectionMapper::new(MapperConfig {
            vertical_scale: Some(0.5),
            ..MapperConfig::default()
        })
        .unwrap();
        // Box centre y = 360 → (360 - 240) / 240 = 0.5 → 0.25 m.
        let bbox = BoundingBox::new(300.0, 320.0, 340.0, 400.0);
        let p = m.map_to_3d(&bbox, &CameraPose::default(), VGA).unwrap();
        assert!((p.y - 0.25).abs() < 1e-5);
    }

    #[test]
    fn degenerate_boxes_are_rejected() {
        let m = mapper();
        for bbox in [
            BoundingBox::new(10.0, 10.0, 10.0, 20.0),
            BoundingBox::new(10.0, 20.0, 30.0, 20.0),
            BoundingBox::new(30.0, 10.0, 10.0, 20.0),
        ] {
            let err = m.map_to_3d(&bbox, &CameraPose::default(), VGA).unwrap_err();
            assert!(matches!(err, ExplorerError::InvalidDetectionGeometry { .. }));
        }
    }

    #[test]
    fn zero_width_image_is_rejected() {
        let err = mapper()
            .map_to_3d(&box_centred_at(320.0), &CameraPose::default(), ImageSize::new(0, 480))
            .unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidDetectionGeometry { .. }));
    }

    #[test]
    fn zero_height_only_matters_with_vertical_scale() {
        let flat = ImageSize::new(640, 0);
        assert!(mapper().map_to_3d(&box_centred_at(320.0), &CameraPose::default(), flat).is_ok());

        let m = DetectionMapper::new(MapperConfig {
            vertical_scale: Some(1.0),
            ..MapperConfig::default()
        })
        .unwrap();
        assert!(m.map_to_3d(&box_centred_at(320.0), &CameraPose::default(), flat).is_err());
    }

    #[test]
    fn non_positive_depth_config_is_rejected() {
        for depth in [0.0, -1.0, f32::NAN] {
            let result = DetectionMapper::new(MapperConfig {
                assumed_depth: depth,
                ..MapperConfig::default()
            });
            assert!(matches!(result, Err(ExplorerError::Config(_))));
        }
    }

    #[test]
    fn world_frame_uses_camera_pose() {
        let m = DetectionMapper::new(MapperConfig {
            frame: OutputFrame::World,
            ..MapperConfig::default()
        })
        .unwrap();
        let pose = CameraPose::from(Pose::new(3.0, 1.0, 0.0));
        let p = m.map_to_3d(&box_centred_at(320.0), &pose, VGA).unwrap();
        assert!((p.x - 5.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
        assert_eq!(p.z, 2.0);
    }

    #[test]
    fn depth_stays_positive_in_every_frame() {
        let below_centre = BoundingBox::new(300.0, 400.0, 340.0, 470.0);
        let above_centre = BoundingBox::new(300.0, 10.0, 340.0, 40.0);
        let pose = CameraPose::from(Pose::new(-2.0, 4.0, 2.5));
        for frame in [OutputFrame::Camera, OutputFrame::World] {
            for vertical_scale in [None, Some(1.0)] {
                let m = DetectionMapper::new(MapperConfig {
                    frame,
                    vertical_scale,
                    ..MapperConfig::default()
                })
                .unwrap();
                for bbox in [below_centre, above_centre] {
                    let p = m.map_to_3d(&bbox, &pose, VGA).unwrap();
                    assert!(p.z > 0.0, "{frame:?}/{vertical_scale:?} gave {p:?}");
                    assert_eq!(p.z, 2.0);
                }
            }
        }
    }

    #[test]
    fn custom_transform_can_be_plugged_in() {
        struct Lift;
        impl FrameTransform for Lift {
            fn to_shared_frame(&self, p: Vec3, _pose: &CameraPose) -> Vec3 {
                Vec3::new(p.x, p.y + 10.0, p.z)
            }
        }
        let m = mapper().with_transform(Box::new(Lift));
        let p = m.map_to_3d(&box_centred_at(320.0), &CameraPose::default(), VGA).unwrap();
        assert!((p.y - 10.0).abs() < 1e-5);
    }

    #[test]
    fn config_reads_partial_toml_like_json() {
        let cfg: MapperConfig = serde_json::from_str(r#"{"assumed_depth": 4.0, "frame": "world"}"#).unwrap();
        assert_eq!(cfg.lateral_scale, 1.0);
        assert_eq!(cfg.assumed_depth, 4.0);
        assert_eq!(cfg.frame, OutputFrame::World);
        assert!(cfg.vertical_scale.is_none());
    }
}
