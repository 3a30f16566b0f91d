//! Human-readable summaries of inbound frames.

use owo_colors::OwoColorize;

use crate::protocol::{DerivedValues, ErrorFrame, Frame, MeshFrame, Warning, WarningLevel};

/// Format count with singular/plural noun: "1 vertex", "3 vertices".
pub fn plural_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// One line for the status block.
pub fn mesh_status(mesh: &MeshFrame) -> String {
    format!(
        "{}, {} | {}",
        plural_count(mesh.vertex_count as usize, "vertex", "vertices"),
        plural_count(mesh.face_count as usize, "face", "faces"),
        derived_summary(&mesh.derived)
    )
}

/// Compact derived-values line.
pub fn derived_summary(d: &DerivedValues) -> String {
    format!(
        "area {:.1} cm² | AR {:.2} | MAC {:.1} mm | taper {:.2} | CG {:.1} mm",
        d.wing_area_cm2, d.aspect_ratio, d.mean_aero_chord_mm, d.taper_ratio, d.estimated_cg_mm
    )
}

pub fn warning_line(w: &Warning) -> String {
    let level = match w.level {
        WarningLevel::Error => "error".red().to_string(),
        WarningLevel::Warn => "warn".yellow().to_string(),
        WarningLevel::Info => "info".dimmed().to_string(),
    };
    if w.fields.is_empty() {
        format!("{level} {}: {}", w.id, w.message)
    } else {
        format!("{level} {}: {} ({})", w.id, w.message, w.fields.join(", "))
    }
}

pub fn error_line(e: &ErrorFrame) -> String {
    match &e.field {
        Some(field) => format!("{} [{}]: {}", e.error, field, e.detail),
        None => format!("{}: {}", e.error, e.detail),
    }
}

/// Multi-line report used by `decode`.
pub fn frame_report(frame: &Frame) -> String {
    match frame {
        Frame::Mesh(mesh) => {
            let d = &mesh.derived;
            let mut lines = vec![
                format!(
                    "mesh: {}, {}",
                    plural_count(mesh.vertex_count as usize, "vertex", "vertices"),
                    plural_count(mesh.face_count as usize, "face", "faces")
                ),
                format!("  tip chord        {:.1} mm", d.tip_chord_mm),
                format!("  wing area        {:.1} cm²", d.wing_area_cm2),
                format!("  aspect ratio     {:.2}", d.aspect_ratio),
                format!("  MAC              {:.1} mm", d.mean_aero_chord_mm),
                format!("  taper ratio      {:.2}", d.taper_ratio),
                format!("  estimated CG     {:.1} mm", d.estimated_cg_mm),
                format!("  min feature      {:.2} mm", d.min_feature_thickness_mm),
                format!("  wall thickness   {:.2} mm", d.wall_thickness_mm),
            ];
            if let Some(ranges) = &mesh.component_ranges {
                lines.push(format!("components: {}", ranges.len()));
                for (name, [start, end]) in ranges {
                    lines.push(format!("  {name:<16} faces {start}..{end}"));
                }
            }
            if !mesh.validation.is_empty() {
                lines.push(plural_count(mesh.validation.len(), "warning", "warnings"));
                lines.extend(mesh.validation.iter().map(|w| format!("  {}", warning_line(w))));
            }
            lines.join("\n")
        }
        Frame::Error(e) => format!("error frame: {}", error_line(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::fixtures::sample_mesh;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(1, "face", "faces"), "1 face");
        assert_eq!(plural_count(0, "face", "faces"), "0 faces");
        assert_eq!(plural_count(3, "vertex", "vertices"), "3 vertices");
    }

    #[test]
    fn test_mesh_report_lists_warnings() {
        let report = frame_report(&Frame::Mesh(sample_mesh(4, 2)));
        assert!(report.starts_with("mesh: 4 vertices, 2 faces"));
        assert!(report.contains("aspect ratio     5.56"));
        assert!(report.contains("1 warning"));
        assert!(report.contains("thin-wall"));
        assert!(report.contains("(wall_thickness)"));
    }

    #[test]
    fn test_mesh_report_lists_components() {
        let mut mesh = sample_mesh(3, 4);
        mesh.component_ranges = Some([("wing".to_string(), [0, 2])].into_iter().collect());
        let report = frame_report(&Frame::Mesh(mesh));
        assert!(report.contains("components: 1"));
        assert!(report.contains("faces 0..2"));
    }

    #[test]
    fn test_error_line() {
        let e = ErrorFrame {
            error: "validation_error".into(),
            detail: "wingSpan out of range".into(),
            field: Some("wingSpan".into()),
        };
        assert_eq!(
            error_line(&e),
            "validation_error [wingSpan]: wingSpan out of range"
        );
        let e = ErrorFrame { field: None, ..e };
        assert_eq!(error_line(&e), "validation_error: wingSpan out of range");
    }
}
