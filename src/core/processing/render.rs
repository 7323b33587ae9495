use rayon::prelude::*;

use crate::core::processing::color::ColorSnapshot;
use crate::raster::{BoundingBox, RasterDataset};
use crate::types::Rgb;

/// Interleaved RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbaImage {
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Flatten onto an opaque background, returning interleaved RGB8.
    pub fn flatten(&self, background: Rgb) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for px in self.data.chunks_exact(4) {
            let a = px[3] as u32;
            let blend =
                |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
            rgb.push(blend(px[0], background.r));
            rgb.push(blend(px[1], background.g));
            rgb.push(blend(px[2], background.b));
        }
        rgb
    }
}

#[inline]
fn alpha_for(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn write_pixel(dst: &mut [u8], color: Option<Rgb>, alpha: u8) {
    match color {
        Some(c) => dst.copy_from_slice(&[c.r, c.g, c.b, alpha]),
        None => dst.copy_from_slice(&[0, 0, 0, 0]),
    }
}

/// Render every dataset pixel at native resolution. Rows are colored in parallel.
pub fn render_native(dataset: &RasterDataset, snapshot: &ColorSnapshot, opacity: f64) -> RgbaImage {
    let (rows, cols) = dataset.dim();
    let alpha = alpha_for(opacity);
    let band_count = dataset.band_count();
    let mut data = vec![0u8; rows * cols * 4];

    data.par_chunks_mut(cols * 4)
        .enumerate()
        .for_each(|(row, line)| {
            let mut values = vec![None; band_count];
            for (col, dst) in line.chunks_exact_mut(4).enumerate() {
                dataset.pixel_values_into(row, col, &mut values);
                write_pixel(dst, snapshot.color_for(&values), alpha);
            }
        });

    RgbaImage {
        width: cols,
        height: rows,
        data,
    }
}

/// Render the geographic `window` into a `width` x `height` image, sampling the dataset
/// nearest-neighbour at each output pixel center. Pixels outside the raster are transparent.
pub fn render_window(
    dataset: &RasterDataset,
    snapshot: &ColorSnapshot,
    opacity: f64,
    window: &BoundingBox,
    width: usize,
    height: usize,
) -> RgbaImage {
    let alpha = alpha_for(opacity);
    let band_count = dataset.band_count();
    let mut data = vec![0u8; width * height * 4];
    if width == 0 || height == 0 {
        return RgbaImage { width, height, data };
    }
    let lat_step = window.lat_span() / height as f64;
    let lon_step = window.lon_span() / width as f64;

    data.par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, line)| {
            let lat = window.north - (y as f64 + 0.5) * lat_step;
            let mut values = vec![None; band_count];
            for (x, dst) in line.chunks_exact_mut(4).enumerate() {
                let lon = window.west + (x as f64 + 0.5) * lon_step;
                let color = dataset.locate(lat, lon).and_then(|(row, col)| {
                    dataset.pixel_values_into(row, col, &mut values);
                    snapshot.color_for(&values)
                });
                write_pixel(dst, color, alpha);
            }
        });

    RgbaImage { width, height, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::BandAssignment;
    use crate::core::processing::stats::BandStats;
    use ndarray::array;

    fn dataset() -> RasterDataset {
        let b0 = array![[Some(0.0), Some(10.0)], [None, Some(5.0)]];
        RasterDataset::new(vec![b0], BoundingBox::new(2.0, 0.0, 2.0, 0.0)).unwrap()
    }

    fn snapshot() -> ColorSnapshot {
        ColorSnapshot::new(
            vec![BandStats { min: 0.0, max: 10.0 }].into(),
            BandAssignment::new(0, 0, 0),
            1.0,
        )
    }

    #[test]
    fn native_render_marks_nodata_transparent() {
        let img = render_native(&dataset(), &snapshot(), 0.5);
        assert_eq!((img.width, img.height), (2, 2));
        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 128]));
        assert_eq!(img.pixel(1, 0), Some([255, 255, 255, 128]));
        assert_eq!(img.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(img.pixel(1, 1), Some([128, 128, 128, 128]));
    }

    #[test]
    fn window_outside_raster_is_transparent() {
        let img = render_window(
            &dataset(),
            &snapshot(),
            1.0,
            &BoundingBox::new(4.0, 0.0, 2.0, 0.0),
            2,
            4,
        );
        // Upper half of the window lies north of the raster.
        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(img.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(img.pixel(1, 2), Some([255, 255, 255, 255]));
        assert_eq!(img.pixel(0, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn flatten_blends_with_background() {
        let img = RgbaImage {
            width: 2,
            height: 1,
            data: vec![255, 0, 0, 255, 9, 9, 9, 0],
        };
        assert_eq!(img.flatten(Rgb::WHITE), vec![255, 0, 0, 255, 255, 255]);
    }
}
