// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fixed parameters of a run.  Changing any of them changes the
//! picture, never the algorithm.

use num::Complex;

use crate::error::{Error, Result};
use crate::planes::PlaneMapper;

/// Width of the default image, in pixels.
pub const WIDTH: usize = 16384;
/// Height of the default image, in pixels.
pub const HEIGHT: usize = 16384;
/// Iteration bound of the divergence test.
pub const MAX_ITERS: u32 = 50;
/// The brightest intensity a pixel may take.
pub const MAX_COLOR: u8 = 255;
/// Left edge of the default complex rectangle.
pub const XMIN: f64 = -1.7;
/// Right edge of the default complex rectangle.
pub const XMAX: f64 = 0.5;
/// Bottom edge of the default complex rectangle.
pub const YMIN: f64 = -1.2;
/// Top edge of the default complex rectangle.
pub const YMAX: f64 = 1.2;
/// Size of the asynchronous queue pool.
pub const QUEUES: usize = 4;

/// Everything a render needs to know before it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Iteration bound of the divergence test.
    pub max_iters: u32,
    /// Intensity assigned to points that never escape.
    pub max_color: u8,
    /// Left-lower corner of the sampled rectangle, (xmin, ymin).
    pub leftlower: Complex<f64>,
    /// Right-upper corner of the sampled rectangle, (xmax, ymax).
    pub rightupper: Complex<f64>,
    /// Number of asynchronous execution queues.
    pub queues: usize,
    /// Number of parallel compute lanes the queues share.
    pub lanes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: WIDTH,
            height: HEIGHT,
            max_iters: MAX_ITERS,
            max_color: MAX_COLOR,
            leftlower: Complex::new(XMIN, YMIN),
            rightupper: Complex::new(XMAX, YMAX),
            queues: QUEUES,
            lanes: num_cpus::get(),
        }
    }
}

impl RenderConfig {
    /// The default rectangle and iteration bounds at a different
    /// image size.
    pub fn with_size(width: usize, height: usize) -> Self {
        RenderConfig {
            width,
            height,
            ..RenderConfig::default()
        }
    }

    /// Checks every field, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.max_iters == 0 {
            return Err(Error::invalid("the iteration bound must be at least 1"));
        }
        if self.queues == 0 {
            return Err(Error::invalid("the queue pool must hold at least 1 queue"));
        }
        if self.lanes == 0 {
            return Err(Error::invalid("at least 1 compute lane is required"));
        }
        pixel_count(self.width, self.height)?;
        self.planes().map(|_| ())
    }

    /// The mapping from pixels to sample points for this image.
    pub fn planes(&self) -> Result<PlaneMapper> {
        PlaneMapper::new(self.width, self.height, self.leftlower, self.rightupper)
    }

    /// Number of pixels in the image, saturating at `usize::MAX` for
    /// sizes `validate` refuses.
    pub fn len(&self) -> usize {
        pixel_count(self.width, self.height).unwrap_or(usize::MAX)
    }

    /// True if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of pixels in a `width × height` grid, or an error if that
/// many cannot be addressed.
pub fn pixel_count(width: usize, height: usize) -> Result<usize> {
    width.checked_mul(height).ok_or_else(|| {
        Error::invalid(format!(
            "a {}x{} image has more pixels than can be addressed",
            width, height
        ))
    })
}
