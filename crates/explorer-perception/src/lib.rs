//! `explorer-perception` – from pixels to positioned, named objects.
//!
//! # Modules
//!
//! - [`transform`] – quaternions, rigid transforms, [`CameraPose`][transform::CameraPose]
//!   and the pluggable [`FrameTransform`][transform::FrameTransform] that puts
//!   mapped points into the frame shared with the robot pose.
//! - [`mapper`] – [`DetectionMapper`][mapper::DetectionMapper]: bounding box +
//!   camera pose + image size → approximate 3-D position.
//! - [`catalog`] – [`Catalog`][catalog::Catalog]: label → object metadata,
//!   loaded once from JSON.
//! - [`association`] – merges a detection, its catalog entry and its mapped
//!   position into a [`RecognizedObject`][explorer_types::RecognizedObject].
//! - [`detector`] – the [`Detector`][detector::Detector] boundary and a
//!   placeholder implementation.
//! - [`ingestion`] – building-model format dispatch.

pub mod association;
pub mod catalog;
pub mod detector;
pub mod ingestion;
pub mod mapper;
pub mod transform;

pub use association::{associate, associate_frame};
pub use catalog::Catalog;
pub use detector::{Detector, FixedBoxDetector};
pub use mapper::{DetectionMapper, ImageSize, MapperConfig};
pub use transform::CameraPose;
