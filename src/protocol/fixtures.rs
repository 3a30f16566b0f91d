//! Frame builders for tests (the backend side of the wire).

use super::codec::{MSG_ERROR, MSG_MESH};
use super::frame::{DerivedValues, MeshFrame, MeshTrailer, Warning, WarningLevel};

pub fn sample_derived() -> DerivedValues {
    DerivedValues {
        tip_chord_mm: 180.0,
        wing_area_cm2: 1800.0,
        aspect_ratio: 5.56,
        mean_aero_chord_mm: 180.0,
        taper_ratio: 1.0,
        estimated_cg_mm: 45.0,
        min_feature_thickness_mm: 1.2,
        wall_thickness_mm: 1.2,
    }
}

/// A mesh with valid face indices and one warning.
pub fn sample_mesh(vertex_count: u32, face_count: u32) -> MeshFrame {
    let vertices = (0..vertex_count * 3).map(|i| i as f32 * 0.5).collect();
    let normals = (0..vertex_count * 3)
        .map(|i| if i % 3 == 2 { 1.0 } else { 0.0 })
        .collect();
    let faces = (0..face_count * 3)
        .map(|i| if vertex_count == 0 { 0 } else { i % vertex_count })
        .collect();

    MeshFrame {
        vertex_count,
        face_count,
        vertices,
        normals,
        faces,
        derived: sample_derived(),
        validation: vec![Warning {
            id: "thin-wall".to_string(),
            level: WarningLevel::Warn,
            message: "wall thickness near printer minimum".to_string(),
            fields: vec!["wall_thickness".to_string()],
        }],
        component_ranges: None,
    }
}

pub fn mesh_frame_bytes(mesh: &MeshFrame) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&MSG_MESH.to_le_bytes());
    bytes.extend_from_slice(&mesh.vertex_count.to_le_bytes());
    bytes.extend_from_slice(&mesh.face_count.to_le_bytes());
    for v in mesh.vertices.iter().chain(&mesh.normals) {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    for f in &mesh.faces {
        bytes.extend_from_slice(&f.to_le_bytes());
    }
    let trailer = MeshTrailer {
        derived: mesh.derived,
        validation: mesh.validation.clone(),
        component_ranges: mesh.component_ranges.clone(),
    };
    bytes.extend_from_slice(serde_json::to_string(&trailer).unwrap().as_bytes());
    bytes
}

pub fn error_frame_bytes(json: &str) -> Vec<u8> {
    let mut bytes = MSG_ERROR.to_le_bytes().to_vec();
    bytes.extend_from_slice(json.as_bytes());
    bytes
}
