// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane whose corners are given by
//! (xmin, ymin) and (xmax, ymax).
use num::Complex;

use crate::error::{Error, Result};

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// Describes the x, y of a pixel in the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of the integral plane onto sample points of the complex
/// plane.  Pixel (0, 0) lands exactly on the left-lower corner; each
/// step right or down moves by one `step` along that axis.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The extent of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper.
    pub complex_plane: ComplexPlane,
    // (dx, dy): the width and height of one pixel in the complex plane.
    step: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane, and two
    /// points describing the complex plane.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<PlaneMapper> {
        if rightupper.re < leftlower.re {
            return Err(Error::invalid(
                "the left lower corner is not to the left of the right upper corner",
            ));
        }

        if rightupper.im < leftlower.im {
            return Err(Error::invalid(
                "the left lower corner is not lower than the right upper corner",
            ));
        }

        if width == 0 || height == 0 {
            return Err(Error::invalid("the image has no pixels"));
        }

        let step = (
            (rightupper.re - leftlower.re) / (width as f64),
            (rightupper.im - leftlower.im) / (height as f64),
        );

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
            step,
        })
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// The width and height of one pixel on the complex plane.
    pub fn step(&self) -> (f64, f64) {
        self.step
    }

    /// Given a pixel on the integral cartesian plane, return the
    /// sample point `(xmin + x·dx, ymin + y·dy)`.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.complex_plane.0.re + (pixel.0 as f64) * self.step.0,
            self.complex_plane.0.im + (pixel.1 as f64) * self.step.1,
        )
    }

    /// True if the pixel lies inside the integral plane.
    pub fn contains(&self, pixel: &Pixel) -> bool {
        pixel.0 < self.integral_plane.0 && pixel.1 < self.integral_plane.1
    }
}
