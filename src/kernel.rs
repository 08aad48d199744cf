// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-pixel kernel.  A kernel maps one pixel of the image to one
//! intensity, touches no shared state, and never allocates, so it can
//! be run from any number of lanes at once.

use num::Complex;
use rayon::prelude::*;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::planes::{Pixel, PlaneMapper};

/// A pure function from a pixel coordinate to an intensity.
pub trait PixelKernel: Sync {
    /// The intensity of pixel (x, y).
    fn intensity(&self, x: usize, y: usize) -> u8;
}

impl<F> PixelKernel for F
where
    F: Fn(usize, usize) -> u8 + Sync,
{
    fn intensity(&self, x: usize, y: usize) -> u8 {
        self(x, y)
    }
}

/// This is our classic iterator function: starting from zero, square
/// and add `point` until the orbit leaves the circle of radius 2 or
/// `max_iterations` is reached, and return how many steps were taken.
#[inline]
pub fn escape_time(point: Complex<f64>, max_iterations: u32) -> u32 {
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    let mut i = 0;
    while i < max_iterations && z.norm_sqr() < 4.0 {
        z = z * z + point;
        i += 1;
    }
    i
}

/// The Mandelbrot escape-time kernel.  The intensity of a pixel is
/// `max_color · i / max_iters`, truncated, where `i` is the escape time
/// of the pixel's sample point.
#[derive(Copy, Clone, Debug)]
pub struct Mandelbrot {
    planes: PlaneMapper,
    max_iters: u32,
    max_color: u8,
}

impl Mandelbrot {
    /// Builds the kernel for a configuration, rejecting configurations
    /// that would not terminate or have no rectangle to sample.
    pub fn new(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Mandelbrot {
            planes: config.planes()?,
            max_iters: config.max_iters,
            max_color: config.max_color,
        })
    }

    /// The plane this kernel samples.
    pub fn planes(&self) -> &PlaneMapper {
        &self.planes
    }
}

impl PixelKernel for Mandelbrot {
    #[inline]
    fn intensity(&self, x: usize, y: usize) -> u8 {
        let point = self.planes.pixel_to_point(&Pixel(x, y));
        let i = escape_time(point, self.max_iters);
        (f64::from(self.max_color) * f64::from(i) / f64::from(self.max_iters)) as u8
    }
}

/// Runs `kernel` over every pixel of `rows`, a row-major slice of full
/// image rows whose first row is image row `first_row`.  Pixels are
/// spread over the lanes of the current rayon pool in no particular
/// order.
pub fn fill_rows<K: PixelKernel + ?Sized>(
    kernel: &K,
    first_row: usize,
    width: usize,
    rows: &mut [u8],
) {
    rows.par_iter_mut().enumerate().for_each(|(offset, pixel)| {
        *pixel = kernel.intensity(offset % width, first_row + offset / width);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Mandelbrot {
        let config = RenderConfig {
            max_iters: 50,
            ..RenderConfig::with_size(4, 4)
        };
        Mandelbrot::new(&config).unwrap()
    }

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 50), 50);
    }

    #[test]
    fn far_points_escape_after_one_step() {
        assert_eq!(escape_time(Complex::new(3.0, 0.0), 50), 1);
    }

    #[test]
    fn zero_bound_means_zero_steps() {
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 0), 0);
    }

    #[test]
    fn corner_pixel_escapes_immediately() {
        // c = -1.7 - 1.2i lies outside radius 2 after the first step.
        assert_eq!(tiny().intensity(0, 0), 5);
    }

    #[test]
    fn intensity_is_deterministic() {
        let kernel = tiny();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(kernel.intensity(x, y), kernel.intensity(x, y));
            }
        }
    }

    #[test]
    fn interior_points_take_the_full_colour() {
        let config = RenderConfig {
            leftlower: Complex::new(-0.1, -0.1),
            rightupper: Complex::new(0.1, 0.1),
            ..RenderConfig::with_size(2, 2)
        };
        let kernel = Mandelbrot::new(&config).unwrap();
        assert_eq!(kernel.intensity(1, 1), 255);
    }

    #[test]
    fn fill_rows_offsets_by_first_row() {
        let mut rows = vec![0u8; 6];
        fill_rows(&|x: usize, y: usize| (y * 10 + x) as u8, 2, 3, &mut rows);
        assert_eq!(rows, vec![20, 21, 22, 30, 31, 32]);
    }
}
