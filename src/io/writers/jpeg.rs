use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Error, Result};

fn dimension(arg: &'static str, value: usize) -> Result<u16> {
    u16::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or(Error::InvalidArgument {
            arg,
            value: value.to_string(),
        })
}

pub fn write_rgb_jpeg(
    output: &Path,
    cols: usize,
    rows: usize,
    rgb_data: &[u8],
    quality: u8,
) -> Result<()> {
    let width = dimension("width", cols)?;
    let height = dimension("height", rows)?;
    if rgb_data.len() != cols * rows * 3 {
        return Err(Error::InvalidArgument {
            arg: "rgb_data",
            value: format!("{} bytes for {}x{}", rgb_data.len(), cols, rows),
        });
    }
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality);
    encoder
        .encode(rgb_data, width, height, ColorType::Rgb)
        .map_err(Error::external)?;
    Ok(())
}
