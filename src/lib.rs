#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Block-pipelined Mandelbrot renderer
//!
//! The Mandelbrot set is drawn by taking the point on the complex
//! plane under each pixel, repeatedly squaring and adding it to
//! itself, and counting how long it takes to fly off past radius two.
//! That count, scaled to a gray level, is the pixel.
//!
//! Every pixel is independent of every other, so the image can be cut
//! into blocks of rows and each block handed out separately.  This
//! crate does exactly that, and pipelines the blocks through a small
//! pool of asynchronous queues: every block is computed into a device
//! grid and then transferred into the host grid, and while one block
//! is being transferred the next is already being computed on another
//! queue.  A single barrier at the end makes the whole image ready.
//!
//! The crate also carries the two small companions the renderer grew
//! up with: a parallel SAXPY, and a container that keeps an explicitly
//! synchronised host and device copy of its contents.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;
extern crate rayon;

pub mod buffer;
pub mod config;
pub mod error;
pub mod kernel;
pub mod mirror;
pub mod partition;
pub mod pgm;
pub mod pipeline;
pub mod planes;
pub mod queue;
pub mod saxpy;

pub use buffer::ImageBuffer;
pub use config::RenderConfig;
pub use error::{Error, Result};
pub use kernel::{Mandelbrot, PixelKernel};
pub use mirror::Mirrored;
pub use partition::{partition, BlockDescriptor};
pub use pgm::{save_image, write_pgm};
pub use pipeline::{render, PipelineState, Renderer};
