use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::io::writers::jpeg::write_rgb_jpeg;
use crate::io::writers::worldfile::{geotransform_for, write_world_file};
use crate::map::RasterLayer;
use crate::types::Rgb;

const PREVIEW_QUALITY: u8 = 95;

/// Files written by [`save_layer_preview`]
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewReport {
    pub image: PathBuf,
    pub world_file: Option<PathBuf>,
    pub width: usize,
    pub height: usize,
}

/// Render `layer` at native size, flatten it over `background` (honoring opacity and
/// transparency) and write a JPEG, optionally with a world file beside it.
pub fn save_layer_preview(
    layer: &RasterLayer,
    output: &Path,
    background: Rgb,
    with_world_file: bool,
) -> Result<PreviewReport> {
    let image = layer.render_rgba();
    let rgb = image.flatten(background);
    write_rgb_jpeg(output, image.width, image.height, &rgb, PREVIEW_QUALITY)?;
    info!(
        "preview written: {:?} ({}x{})",
        output, image.width, image.height
    );

    let world_file = if with_world_file {
        let gt = geotransform_for(layer.bounds(), image.width, image.height);
        Some(write_world_file(output, gt)?)
    } else {
        None
    };

    Ok(PreviewReport {
        image: output.to_path_buf(),
        world_file,
        width: image.width,
        height: image.height,
    })
}
