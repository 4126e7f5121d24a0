//! Encoding frames and writing them into the store.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageError};

use crate::cache::store::TEMP_PREFIX;
use crate::cache::{CacheEntry, CacheKey};
use crate::types::OutputFormat;
use crate::{Result, ThumbnailError};

/// Encode `image` into `writer`.
///
/// PNG is lossless. JPEG uses [`OutputFormat::JPEG_QUALITY`] and drops any
/// alpha channel.
pub fn encode_image<W: Write>(image: &DynamicImage, format: OutputFormat, writer: W) -> Result<()> {
    let encoded = match format {
        OutputFormat::Png => image.write_with_encoder(PngEncoder::new(writer)),
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(
                writer,
                OutputFormat::JPEG_QUALITY,
            ))
        }
    };
    encoded.map_err(|e| match e {
        ImageError::IoError(e) => ThumbnailError::Storage(format!("write failed: {e}")),
        other => ThumbnailError::Encode(format!("{format} encoding failed: {other}")),
    })
}

/// Encode `image` and publish it as `root/key`.
///
/// Bytes go to a temporary file in `root` which is renamed onto the key
/// only after the encoder and flush succeed. On every failure path the
/// temporary file is dropped and removed, so a lookup never sees a partial
/// entry.
pub fn encode_and_store(image: &DynamicImage, root: &Path, key: &CacheKey) -> Result<CacheEntry> {
    let mut staging = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".part")
        .tempfile_in(root)
        .map_err(|e| {
            ThumbnailError::Storage(format!(
                "cannot create staging file in {}: {e}",
                root.display()
            ))
        })?;

    {
        let mut writer = BufWriter::new(staging.as_file_mut());
        encode_image(image, key.format(), &mut writer)?;
        writer.flush()?;
    }
    staging.as_file().sync_all()?;

    let dest = root.join(key.as_str());
    staging.persist(&dest).map_err(|e| {
        ThumbnailError::Storage(format!(
            "cannot move thumbnail into {}: {}",
            dest.display(),
            e.error
        ))
    })?;

    let len = fs::metadata(&dest)?.len();
    Ok(CacheEntry {
        path: dest,
        len,
        width: image.width(),
        height: image.height(),
    })
}
