//! Object association: detection + catalog + mapped position →
//! [`RecognizedObject`].

use explorer_types::{Detection, ExplorerError, FrameObservation, RecognizedObject};
use tracing::warn;

use crate::catalog::Catalog;
use crate::mapper::{DetectionMapper, ImageSize};
use crate::transform::CameraPose;

/// Category given to labels the catalog does not know.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Associate a single detection.
///
/// A catalog miss is not an error: the object keeps its detector label,
/// category [`UNKNOWN_CATEGORY`] and an empty description.  Confidence always
/// comes from the detection.
///
/// # Errors
///
/// Propagates [`ExplorerError::InvalidDetectionGeometry`] from the mapper.
pub fn associate(
    detection: &Detection,
    camera_pose: &CameraPose,
    catalog: &Catalog,
    image: ImageSize,
    mapper: &DetectionMapper,
) -> Result<RecognizedObject, ExplorerError> {
    let position = mapper.map_to_3d(&detection.bbox, camera_pose, image)?;

    let (name, category, description) = match catalog.lookup(&detection.label) {
        Some(entry) => (
            entry.name.clone(),
            entry.category.clone(),
            entry.description.clone(),
        ),
        None => (
            detection.label.clone(),
            UNKNOWN_CATEGORY.to_string(),
            String::new(),
        ),
    };

    Ok(RecognizedObject {
        name,
        category,
        description,
        position,
        confidence: detection.confidence,
    })
}

/// Associate every detection of one frame, skipping the ones with invalid
/// geometry.
pub fn associate_frame(
    detections: &[Detection],
    camera_pose: &CameraPose,
    catalog: &Catalog,
    image: ImageSize,
    mapper: &DetectionMapper,
) -> FrameObservation {
    let objects = detections
        .iter()
        .filter_map(|d| match associate(d, camera_pose, catalog, image, mapper) {
            Ok(obj) => Some(obj),
            Err(e) => {
                warn!(label = %d.label, error = %e, "skipping detection");
                None
            }
        })
        .collect();
    FrameObservation::new(objects)
}
