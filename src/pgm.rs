// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing finished images.
//!
//! The native format is binary PGM exactly as standard graymap viewers
//! expect it: `P5`, a comment line, `WIDTH HEIGHT`, the maximum value,
//! then the raw bytes, top row first.  Other formats go through the
//! `image` crate.

use image::GrayImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::buffer::ImageBuffer;
use crate::error::{Error, Result};

/// The comment line written into every PGM header.
pub const COMMENT: &str = "#comment";

/// Writes `image` as a binary PGM with `max_color` as its maximum value.
pub fn write_pgm<W: Write>(out: &mut W, image: &ImageBuffer, max_color: u8) -> Result<()> {
    write!(
        out,
        "P5\n{}\n{} {}\n{}\n",
        COMMENT,
        image.width(),
        image.height(),
        max_color
    )?;
    out.write_all(image.as_slice())?;
    out.flush()?;
    Ok(())
}

/// Saves `image` to `path`.  `.pgm` and `.pnm` paths get the native
/// writer; anything else is encoded by the `image` crate according to
/// its extension.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ImageBuffer, max_color: u8) -> Result<()> {
    let path = path.as_ref();
    let native = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(true, |ext| {
            ext.eq_ignore_ascii_case("pgm") || ext.eq_ignore_ascii_case("pnm")
        });

    if native {
        let mut out = BufWriter::new(File::create(path)?);
        write_pgm(&mut out, image, max_color)?;
    } else {
        to_gray_image(image)?
            .save(path)
            .map_err(|err| Error::Encode {
                reason: err.to_string(),
            })?;
    }
    info!(path = %path.display(), "image written");
    Ok(())
}

/// Copies the host grid into an `image` crate buffer.
pub fn to_gray_image(image: &ImageBuffer) -> Result<GrayImage> {
    GrayImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.as_slice().to_vec(),
    )
    .ok_or_else(|| Error::Encode {
        reason: format!("{}x{} does not fit a gray image", image.width(), image.height()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_two_by_two_is_byte_exact() {
        let image = ImageBuffer::new(2, 2).unwrap();
        let mut out = Vec::new();
        write_pgm(&mut out, &image, 255).unwrap();
        assert_eq!(out, b"P5\n#comment\n2 2\n255\n\x00\x00\x00\x00".to_vec());
    }

    #[test]
    fn pixels_follow_the_header_top_row_first() {
        let image = ImageBuffer::from_pixels(3, 1, vec![7, 8, 9]).unwrap();
        let mut out = Vec::new();
        write_pgm(&mut out, &image, 100).unwrap();
        assert_eq!(out, b"P5\n#comment\n3 1\n100\n\x07\x08\x09".to_vec());
    }

    #[test]
    fn gray_images_keep_their_pixels() {
        let image = ImageBuffer::from_pixels(2, 2, vec![1, 2, 3, 4]).unwrap();
        let gray = to_gray_image(&image).unwrap();
        assert_eq!(gray.dimensions(), (2, 2));
        assert_eq!(gray.into_raw(), vec![1, 2, 3, 4]);
    }
}
