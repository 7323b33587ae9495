use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::raster::BoundingBox;

/// North-up affine geotransform (`[origin_x, pixel_width, 0, origin_y, 0, -pixel_height]`)
/// for an image of `cols` x `rows` pixels covering `bounds`.
pub fn geotransform_for(bounds: &BoundingBox, cols: usize, rows: usize) -> [f64; 6] {
    let pixel_w = bounds.lon_span() / cols.max(1) as f64;
    let pixel_h = bounds.lat_span() / rows.max(1) as f64;
    [bounds.west, pixel_w, 0.0, bounds.north, 0.0, -pixel_h]
}

/// World file path for an image: `.jpg` -> `.jgw`, `.png` -> `.pgw`, `.tif` -> `.tfw`,
/// otherwise first extension letter + `w`, or `.wld` without an extension.
pub fn world_file_path(output_image: &Path) -> PathBuf {
    let ext = output_image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let world_ext = match ext.as_str() {
        "jpg" | "jpeg" => "jgw".to_string(),
        "png" => "pgw".to_string(),
        "tif" | "tiff" => "tfw".to_string(),
        other => match other.chars().next() {
            Some(first) => format!("{}w", first),
            None => "wld".to_string(),
        },
    };
    output_image.with_extension(world_ext)
}

/// Write a world file next to the image. World files store the transform in
/// pixel-center convention.
pub fn write_world_file(output_image: &Path, geotransform: [f64; 6]) -> Result<PathBuf> {
    let world_path = world_file_path(output_image);

    // A: pixel size in X, D: rotation about Y, B: rotation about X, E: pixel size Y
    // C, F: center of upper-left pixel
    let a = geotransform[1];
    let d = geotransform[4];
    let b = geotransform[2];
    let e = geotransform[5];
    let c = geotransform[0] + 0.5 * a + 0.5 * b;
    let f = geotransform[3] + 0.5 * d + 0.5 * e;

    let mut file = File::create(&world_path)?;
    for v in [a, d, b, e, c, f] {
        writeln!(file, "{:.12}", v)?;
    }
    Ok(world_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_file_extensions() {
        assert_eq!(world_file_path(Path::new("a/b.jpg")), PathBuf::from("a/b.jgw"));
        assert_eq!(world_file_path(Path::new("b.TIFF")), PathBuf::from("b.tfw"));
        assert_eq!(world_file_path(Path::new("b.bmp")), PathBuf::from("b.bw"));
        assert_eq!(world_file_path(Path::new("b")), PathBuf::from("b.wld"));
    }

    #[test]
    fn geotransform_is_north_up() {
        let gt = geotransform_for(&BoundingBox::new(40.0, 30.0, -90.0, -100.0), 100, 50);
        assert_relative_eq!(gt[0], -100.0);
        assert_relative_eq!(gt[1], 0.1);
        assert_relative_eq!(gt[3], 40.0);
        assert_relative_eq!(gt[5], -0.2);
    }

    #[test]
    fn world_file_uses_pixel_centers() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("preview.jpg");
        let path = write_world_file(&image, [10.0, 2.0, 0.0, 50.0, 0.0, -1.0]).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let lines: Vec<f64> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(lines, vec![2.0, 0.0, 0.0, -1.0, 11.0, 49.5]);
    }
}
