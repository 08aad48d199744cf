// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one-dimensional linear combination `y ← a·x + y`.

use rayon::prelude::*;

use crate::error::{Error, Result};

/// Computes `y[i] = a * x[i] + y[i]` for every `i`, in parallel.
pub fn saxpy(a: f32, x: &[f32], y: &mut [f32]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    y.par_iter_mut()
        .zip(x.par_iter())
        .for_each(|(y, x)| *y = a * *x + *y);
    Ok(())
}

/// Sets up `x[i] = i + 1` and `y[i] = 0` for `n` elements, then applies
/// `y ← 2x + y`.  Returns `y`.
pub fn saxpy_demo(n: usize) -> Result<Vec<f32>> {
    let x: Vec<f32> = (0..n).into_par_iter().map(|i| (i + 1) as f32).collect();
    let mut y = vec![0.0_f32; n];
    saxpy(2.0, &x, &mut y)?;
    Ok(y)
}
