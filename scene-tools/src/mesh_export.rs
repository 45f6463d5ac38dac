//! Merged environment mesh export.
use crate::replay::replay_events;
use anyhow::{Context, Result};
use environment_mesh::{MergeReport, MergedMesh, write_obj};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the merged mesh of a recorded chunk stream to an OBJ file.
pub struct MeshExporter {
    /// Target OBJ file.
    output_path: PathBuf,
}

impl MeshExporter {
    pub fn new(output_path: &Path) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
        }
    }

    /// Replay `events_path`, merge all active chunks and write the result.
    pub fn export(&self, events_path: &Path) -> Result<(MergedMesh, MergeReport)> {
        println!("Merging chunk events from {}", events_path.display());

        let replay = replay_events(events_path)?;
        if replay.rejected > 0 {
            println!("  Rejected {} malformed chunk updates", replay.rejected);
        }

        let (mesh, report) = replay.aggregator.merge_with_report();
        self.write_mesh(&mesh)?;
        self.print_summary(&mesh, &report);
        Ok((mesh, report))
    }

    fn write_mesh(&self, mesh: &MergedMesh) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let file = File::create(&self.output_path)
            .with_context(|| format!("creating {}", self.output_path.display()))?;
        write_obj(mesh, &mut BufWriter::new(file))
            .with_context(|| format!("writing {}", self.output_path.display()))?;

        info!("Mesh exported to {}", self.output_path.display());
        Ok(())
    }

    /// Prints merge statistics for verification.
    fn print_summary(&self, mesh: &MergedMesh, report: &MergeReport) {
        println!("Merge Summary:");
        println!("  Chunks merged: {}", report.chunks_merged);
        println!(
            "  Chunks skipped: {} inactive, {} empty",
            report.inactive_skipped, report.empty_skipped
        );
        println!("  Vertices: {}", mesh.vertex_count());
        println!("  Triangles: {}", mesh.triangle_count());

        if report.degenerate_vertices > 0 {
            println!(
                "  Degenerate vertices: {} ({} triangles dropped)",
                report.degenerate_vertices, report.dropped_triangles
            );
        }

        let bounds = mesh.bounds();
        if bounds.is_empty() {
            println!("  Bounds: empty mesh");
        } else {
            println!(
                "  Bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
                bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
            );
        }
        println!("  Output: {}", self.output_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_obj_for_active_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let events_path = dir.path().join("events.json");
        fs::write(
            &events_path,
            r#"[
                {"event": "upsert", "id": 1, "vertices": [[0,0,0],[1,0,0],[0,1,0]], "triangles": [[0,1,2]]},
                {"event": "upsert", "id": 2, "vertices": [[0,0,0],[1,0,0],[0,1,0]], "triangles": [[0,1,2]], "active": false}
            ]"#,
        )
        .unwrap();

        let output = dir.path().join("out").join("mesh.obj");
        let (mesh, report) = MeshExporter::new(&output).export(&events_path).unwrap();
        assert_eq!(report.chunks_merged, 1);
        assert_eq!(report.inactive_skipped, 1);
        assert_eq!(mesh.vertex_count(), 3);

        let obj = fs::read_to_string(&output).unwrap();
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert!(obj.lines().any(|l| l == "f 1 2 3"));
    }
}
