//! Building-model ingestion.
//!
//! Dispatches on file extension and records which named parts a model
//! declares.  Geometry is not decoded; downstream code only needs to know
//! the model exists, its format and what it calls its parts.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Supported building-model formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Wavefront OBJ.
    Obj,
    /// Industry Foundation Classes (STEP physical file).
    Ifc,
}

impl ModelFormat {
    /// Match a lower-cased or mixed-case extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "obj" => Some(Self::Obj),
            "ifc" => Some(Self::Ifc),
            _ => None,
        }
    }
}

/// Whatever could be learned about the building model.
///
/// `format == None` marks the empty stub returned for missing or
/// unsupported files.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingModel {
    pub source: PathBuf,
    pub format: Option<ModelFormat>,
    /// OBJ object/group names or IFC entity types, in file order.
    pub objects: Vec<String>,
}

impl BuildingModel {
    pub fn empty(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            format: None,
            objects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.format.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ModelIngestion;

impl ModelIngestion {
    pub fn new() -> Self {
        Self
    }

    /// Load the model at `path`.  Never fails: missing files, unreadable
    /// files and unknown extensions all produce [`BuildingModel::empty`].
    pub fn load_model(&self, path: &Path) -> BuildingModel {
        if !path.exists() {
            warn!(path = %path.display(), "model file not found");
            return BuildingModel::empty(path);
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let Some(format) = ModelFormat::from_extension(ext) else {
            warn!(path = %path.display(), extension = ext, "unsupported model format");
            return BuildingModel::empty(path);
        };

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read model file");
                return BuildingModel::empty(path);
            }
        };

        let objects = match format {
            ModelFormat::Obj => obj_object_names(&raw),
            ModelFormat::Ifc => ifc_entity_types(&raw),
        };
        info!(path = %path.display(), ?format, parts = objects.len(), "building model loaded");

        BuildingModel {
            source: path.to_path_buf(),
            format: Some(format),
            objects,
        }
    }
}

/// Names from `o <name>` and `g <name>` statements.
fn obj_object_names(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix("o ").or_else(|| line.strip_prefix("g "))?;
            let name = rest.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Entity types from `#12=IFCWALL(...)` instance lines.
fn ifc_entity_types(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            if !line.starts_with('#') {
                return None;
            }
            let (_, rhs) = line.split_once('=')?;
            let (entity, _) = rhs.trim_start().split_once('(')?;
            let entity = entity.trim();
            entity
                .to_ascii_uppercase()
                .starts_with("IFC")
                .then(|| entity.to_string())
        })
        .collect()
}
