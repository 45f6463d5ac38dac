//! Cuts the merged environment mesh into one OBJ per object instance.
use crate::replay::replay_events;
use anyhow::{Context, Result};
use constants::export::INSTANCE_DIR_NAME;
use environment_mesh::{MergedMesh, extract_submesh, parse_obj, parse_triangle_ids, write_obj};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct InstanceExporter {
    instance_dir: PathBuf,
}

impl InstanceExporter {
    /// Files land in `<output_dir>/instances/`.
    pub fn new(output_dir: &Path) -> Self {
        Self {
            instance_dir: output_dir.join(INSTANCE_DIR_NAME),
        }
    }

    /// Load the merged mesh from `mesh_path`, then write one submesh per
    /// instance listed in `triangle_ids_path`. Returns the number of files written.
    pub fn export(&self, mesh_path: &Path, triangle_ids_path: &Path) -> Result<usize> {
        let mesh = load_mesh(mesh_path)?;

        let text = fs::read_to_string(triangle_ids_path)
            .with_context(|| format!("reading triangle ids {}", triangle_ids_path.display()))?;
        let instances = parse_triangle_ids(&text)
            .with_context(|| format!("parsing triangle ids {}", triangle_ids_path.display()))?;

        fs::create_dir_all(&self.instance_dir)
            .with_context(|| format!("creating {}", self.instance_dir.display()))?;

        println!(
            "Exporting {} instances from {} triangles",
            instances.len(),
            mesh.triangle_count()
        );

        let pb = ProgressBar::new(instances.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} instances ({percent}%) {msg}")?
                .progress_chars("▉▊▋▌▍▎▏ "),
        );

        let mut written = 0;
        for (instance_id, triangle_ids) in &instances {
            let submesh = extract_submesh(&mesh, triangle_ids);
            if submesh.triangle_count() == 0 {
                warn!("Instance {} has no triangles in the merged mesh", instance_id);
                pb.inc(1);
                continue;
            }

            let path = self.instance_dir.join(format!("{}.obj", instance_id));
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            write_obj(&submesh, &mut BufWriter::new(file))
                .with_context(|| format!("writing {}", path.display()))?;

            written += 1;
            pb.set_message(format!("instance {}", instance_id));
            pb.inc(1);
        }
        pb.finish_with_message("Instances exported");

        info!(
            "Wrote {} instance meshes to {}",
            written,
            self.instance_dir.display()
        );
        Ok(written)
    }
}

/// A previously exported `.obj`, or a chunk event stream that is replayed and merged.
fn load_mesh(path: &Path) -> Result<MergedMesh> {
    let is_obj = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
    if !is_obj {
        return Ok(replay_events(path)?.aggregator.merge());
    }

    let text =
        fs::read_to_string(path).with_context(|| format!("reading mesh {}", path.display()))?;
    let mesh = parse_obj(&text).with_context(|| format!("parsing mesh {}", path.display()))?;
    info!(
        "Loaded {} vertices and {} triangles from {}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        path.display()
    );
    Ok(mesh)
}
