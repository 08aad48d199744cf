// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The output grid.  An ImageBuffer is owned by whoever asked for the
//! render; during a run its rows are lent out block by block, and once
//! the run is over only the host grid is readable.

use std::ops::Range;

use crate::config::pixel_count;
use crate::error::{Error, Result};
use crate::mirror::Mirrored;
use crate::partition::{check_cover, BlockDescriptor};

/// The mutable pieces of one block: its rows on the host side and on
/// the device side.
pub struct BlockRows<'a> {
    /// The block the rows belong to.
    pub block: BlockDescriptor,
    /// Host rows, written only by the block's transfer step.
    pub host: &'a mut [u8],
    /// Device rows, written only by the block's compute step.
    pub device: &'a mut [u8],
}

/// A row-major grid of 8-bit intensities, `width × height`, with a
/// device shadow of the same shape.
#[derive(Debug)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    pixels: Mirrored<u8>,
}

impl ImageBuffer {
    /// An all-zero image.  Fails if `width × height` overflows.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(ImageBuffer {
            width,
            height,
            pixels: Mirrored::new(pixel_count(width, height)?),
        })
    }

    /// Wraps finished host pixels, e.g. ones read back from disk.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        let mut image = ImageBuffer::new(width, height)?;
        image.pixels.sides_mut().0.copy_from_slice(&pixels);
        Ok(image)
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The host grid, row-major, top row first.
    pub fn as_slice(&self) -> &[u8] {
        self.pixels.host()
    }

    /// One host row.
    pub fn row(&self, y: usize) -> Result<&[u8]> {
        if y >= self.height {
            return Err(Error::IndexOutOfRange {
                index: y,
                len: self.height,
            });
        }
        Ok(&self.as_slice()[y * self.width..(y + 1) * self.width])
    }

    /// Bounds-checked read of pixel (x, y).
    pub fn get(&self, x: usize, y: usize) -> Result<u8> {
        if x >= self.width {
            return Err(Error::IndexOutOfRange {
                index: x,
                len: self.width,
            });
        }
        self.row(y).map(|row| row[x])
    }

    /// Gives up the host grid.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels.into_host()
    }

    /// The whole device grid, for variants that compute in one pass.
    pub(crate) fn device_mut(&mut self) -> &mut [u8] {
        self.pixels.sides_mut().1
    }

    /// Copies device rows to host rows.
    pub(crate) fn transfer(&mut self, rows: Range<usize>) -> Result<()> {
        let width = self.width;
        self.pixels
            .update_host_range(rows.start * width..rows.end * width)
    }

    /// Splits both grids into one disjoint `BlockRows` per block.  The
    /// blocks must cover every row exactly once, in order.
    pub(crate) fn split_blocks(&mut self, blocks: &[BlockDescriptor]) -> Result<Vec<BlockRows<'_>>> {
        check_cover(blocks, self.height)?;
        let width = self.width;
        let (mut host, mut device) = self.pixels.sides_mut();
        let mut rows = Vec::with_capacity(blocks.len());
        for block in blocks {
            let len = block.height() * width;
            let (host_rows, host_rest) = std::mem::take(&mut host).split_at_mut(len);
            let (device_rows, device_rest) = std::mem::take(&mut device).split_at_mut(len);
            host = host_rest;
            device = device_rest;
            rows.push(BlockRows {
                block: *block,
                host: host_rows,
                device: device_rows,
            });
        }
        Ok(rows)
    }
}

impl PartialEq for ImageBuffer {
    fn eq(&self, other: &ImageBuffer) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.as_slice() == other.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;

    #[test]
    fn new_images_are_black() {
        let image = ImageBuffer::new(3, 2).unwrap();
        assert_eq!(image.as_slice(), &[0; 6]);
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let image = ImageBuffer::from_pixels(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(image.get(1, 1).unwrap(), 4);
        assert_eq!(image.row(1).unwrap(), &[3, 4]);
        assert!(image.get(2, 0).is_err());
        assert!(image.get(0, 2).is_err());
        assert!(image.row(5).is_err());
    }

    #[test]
    fn wrong_sized_pixels_are_rejected() {
        assert!(ImageBuffer::from_pixels(2, 2, vec![0; 3]).is_err());
    }

    #[test]
    fn overflowing_sizes_are_rejected() {
        match ImageBuffer::new(usize::MAX, 2) {
            Err(Error::InvalidConfiguration { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(ImageBuffer::from_pixels(usize::MAX, 2, vec![]).is_err());
    }

    #[test]
    fn blocks_split_into_disjoint_rows() {
        let mut image = ImageBuffer::new(2, 4).unwrap();
        let blocks = partition(4, 2, 2).unwrap();
        {
            let rows = image.split_blocks(&blocks).unwrap();
            assert_eq!(rows.len(), 2);
            for (n, piece) in rows.into_iter().enumerate() {
                assert_eq!(piece.device.len(), 4);
                for pixel in piece.device.iter_mut() {
                    *pixel = n as u8 + 1;
                }
            }
        }
        assert_eq!(image.as_slice(), &[0; 8]);
        image.transfer(0..4).unwrap();
        assert_eq!(image.as_slice(), &[1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn blocks_that_miss_rows_cannot_split() {
        let mut image = ImageBuffer::new(2, 4).unwrap();
        let blocks = partition(2, 2, 2).unwrap();
        assert!(image.split_blocks(&blocks).is_err());
    }
}
