use crate::error::Result;
use crate::fills::ExportImage;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Directory the per-image PNGs of a document go to.
pub fn image_output_dir(input_dir: &Path, doc_name: &str) -> PathBuf {
    input_dir.join(format!("image_output_{doc_name}"))
}

/// Write every queued bitmap to `<dir>/<name>.png`.
///
/// Each image goes to its own file, so the writes run in parallel when the
/// `parallel` feature is enabled. `on_saved` is called once per file.
pub fn export_images<F>(images: &[ExportImage], dir: &Path, on_saved: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) + Sync,
{
    std::fs::create_dir_all(dir)?;
    let save = |img: &ExportImage| -> Result<PathBuf> {
        let path = dir.join(format!("{}.png", img.name));
        img.rgba.save(&path)?;
        on_saved(&path);
        Ok(path)
    };

    #[cfg(feature = "parallel")]
    {
        images.par_iter().map(save).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        images.iter().map(save).collect()
    }
}
