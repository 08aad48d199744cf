// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits the rows of an image into equal, contiguous blocks and deals
//! them out to the queue pool round-robin.
//!
//! Blocks are the unit of write ownership: two blocks never share a
//! row, so two queues working on two blocks never share a pixel.  A
//! block count that does not divide the height is refused outright
//! rather than leaving a ragged or missing tail.

use itertools::Itertools;
use std::ops::Range;

use crate::error::{Error, Result};

/// One block of rows and the queue responsible for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// First row of the block.
    pub start_row: usize,
    /// One past the last row of the block.
    pub end_row: usize,
    /// The queue that computes and transfers this block.
    pub queue_id: usize,
}

impl BlockDescriptor {
    /// The rows covered by this block.
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    /// Number of rows in this block.
    pub fn height(&self) -> usize {
        self.end_row - self.start_row
    }

    /// The block's pixels as a range of offsets into a row-major image
    /// of the given width.
    pub fn pixels(&self, width: usize) -> Range<usize> {
        self.start_row * width..self.end_row * width
    }
}

/// Divides `height` rows into `num_blocks` blocks, assigning block `i`
/// to queue `i mod queues`.
pub fn partition(height: usize, num_blocks: usize, queues: usize) -> Result<Vec<BlockDescriptor>> {
    if num_blocks == 0 {
        return Err(Error::invalid("the number of blocks must be at least 1"));
    }
    if queues == 0 {
        return Err(Error::invalid("the queue pool must hold at least 1 queue"));
    }
    if height % num_blocks != 0 {
        return Err(Error::invalid(format!(
            "{} blocks do not evenly divide {} rows",
            num_blocks, height
        )));
    }

    let block_height = height / num_blocks;
    let blocks: Vec<BlockDescriptor> = (0..num_blocks)
        .map(|block| BlockDescriptor {
            start_row: block * block_height,
            end_row: (block + 1) * block_height,
            queue_id: block % queues,
        })
        .collect();
    check_cover(&blocks, height)?;
    Ok(blocks)
}

/// Confirms that `blocks`, in order, cover `0..height` exactly once.
pub fn check_cover(blocks: &[BlockDescriptor], height: usize) -> Result<()> {
    let first = blocks.first().map_or(height, |b| b.start_row);
    let last = blocks.last().map_or(0, |b| b.end_row);
    if blocks.is_empty() || first != 0 || last != height {
        return Err(Error::invalid(format!(
            "blocks cover {}..{} instead of 0..{}",
            first, last, height
        )));
    }
    if let Some(b) = blocks.iter().find(|b| b.start_row > b.end_row) {
        return Err(Error::invalid(format!(
            "block {}..{} runs backwards",
            b.start_row, b.end_row
        )));
    }
    if let Some((a, b)) = blocks.iter().tuple_windows().find(|(a, b)| a.end_row != b.start_row) {
        return Err(Error::invalid(format!(
            "block {}..{} is not followed by block {}..{}",
            a.start_row, a.end_row, b.start_row, b.end_row
        )));
    }
    Ok(())
}
