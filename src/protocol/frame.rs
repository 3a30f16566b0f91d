//! Inbound frame types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::params::Param;

/// One complete inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Mesh(MeshFrame),
    Error(ErrorFrame),
}

impl Frame {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mesh",
            Self::Error(_) => "error",
        }
    }
}

/// Regenerated model plus the metrics computed alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFrame {
    pub vertex_count: u32,
    pub face_count: u32,
    /// `3 * vertex_count` coordinates.
    pub vertices: Vec<f32>,
    /// `3 * vertex_count` components.
    pub normals: Vec<f32>,
    /// `3 * face_count` vertex indices.
    pub faces: Vec<u32>,
    pub derived: DerivedValues,
    pub validation: Vec<Warning>,
    /// Component name to `[start_face, end_face]`.
    pub component_ranges: Option<BTreeMap<String, [u32; 2]>>,
}

impl MeshFrame {
    pub fn has_errors(&self) -> bool {
        self.validation
            .iter()
            .any(|w| w.level == WarningLevel::Error)
    }
}

/// Metrics the backend derives from the design. Passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedValues {
    pub tip_chord_mm: f64,
    pub wing_area_cm2: f64,
    pub aspect_ratio: f64,
    pub mean_aero_chord_mm: f64,
    pub taper_ratio: f64,
    pub estimated_cg_mm: f64,
    pub min_feature_thickness_mm: f64,
    pub wall_thickness_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Error,
    Warn,
    Info,
}

/// A validation finding attached to a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub id: String,
    pub level: WarningLevel,
    pub message: String,
    /// Parameters the finding refers to (wire or UI names).
    pub fields: Vec<String>,
}

impl Warning {
    pub fn params(&self) -> Vec<Param> {
        self.fields.iter().filter_map(|f| Param::resolve(f)).collect()
    }
}

/// Application-level failure reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub error: String,
    pub detail: String,
    pub field: Option<String>,
}

impl ErrorFrame {
    /// Parameter the error refers to, if the backend named a known one.
    pub fn param(&self) -> Option<Param> {
        self.field.as_deref().and_then(Param::resolve)
    }
}

/// JSON trailer that follows the mesh arrays.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct MeshTrailer {
    pub derived: DerivedValues,
    pub validation: Vec<Warning>,
    #[serde(
        rename = "componentRanges",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub component_ranges: Option<BTreeMap<String, [u32; 2]>>,
}
