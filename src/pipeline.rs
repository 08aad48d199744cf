// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The block pipeline.
//!
//! The image is cut into blocks of rows.  For every block two
//! operations go onto the block's queue: a compute step, which runs
//! the kernel over the block's rows of the device grid, and a transfer
//! step, which copies those rows into the host grid.  The transfer
//! waits on an explicit edge from its compute step; nothing else is
//! ordered.  Because consecutive blocks land on different queues, the
//! transfer of one block overlaps the compute of the next.  A single
//! barrier at the end waits for all of it.
//!
//! Two simpler variants are kept alongside for comparison: one that
//! computes the whole image in a single pass, and one that walks the
//! blocks synchronously.  All three produce the same bytes.

use rayon::ThreadPool;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, instrument, trace};

use crate::buffer::{BlockRows, ImageBuffer};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::kernel::{fill_rows, Mandelbrot, PixelKernel};
use crate::partition::partition;
use crate::queue::{self, panic_message};

/// Where a renderer is in its current run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// No run in progress.
    Idle,
    /// The rows have been divided into blocks.
    Partitioned,
    /// Every block's operations have been handed to the queues.
    BlocksIssued,
    /// The barrier has been passed; every operation has finished.
    Synchronized,
    /// The image has been handed back to the caller.
    Ready,
}

/// Renders images of one configuration with one kernel.  The compute
/// lanes are brought up once and shared by every run.
pub struct Renderer<K> {
    config: RenderConfig,
    kernel: K,
    lanes: ThreadPool,
    state: PipelineState,
}

impl Renderer<Mandelbrot> {
    /// A renderer for the Mandelbrot kernel of `config`.
    pub fn mandelbrot(config: RenderConfig) -> Result<Self> {
        let kernel = Mandelbrot::new(&config)?;
        Renderer::new(config, kernel)
    }
}

impl<K: PixelKernel> Renderer<K> {
    /// Validates `config` and starts its compute lanes.
    pub fn new(config: RenderConfig, kernel: K) -> Result<Self> {
        config.validate()?;
        let lanes = rayon::ThreadPoolBuilder::new()
            .num_threads(config.lanes)
            .thread_name(|lane| format!("lane-{}", lane))
            .build()
            .map_err(|err| Error::DeviceInit {
                reason: err.to_string(),
            })?;
        debug!(lanes = config.lanes, queues = config.queues, "renderer ready");
        Ok(Renderer {
            config,
            kernel,
            lanes,
            state: PipelineState::Idle,
        })
    }

    /// The configuration being rendered.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The kernel being run.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Where the most recent run got to.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Renders the image through the queue pool in `num_blocks` blocks.
    /// Invalid block counts are refused before any work is issued.
    #[instrument(skip(self))]
    pub fn render(&mut self, num_blocks: usize) -> Result<ImageBuffer> {
        let Renderer {
            config,
            kernel,
            lanes,
            state,
        } = self;
        advance(state, PipelineState::Idle);

        let blocks = partition(config.height, num_blocks, config.queues)?;
        advance(state, PipelineState::Partitioned);

        let width = config.width;
        let mut image = ImageBuffer::new(width, config.height).map_err(|err| reset(state, err))?;
        let pieces = image
            .split_blocks(&blocks)
            .map_err(|err| reset(state, err))?;
        let kernel = &*kernel;
        let lanes = &*lanes;

        let issued = queue::run(config.queues, |queues| {
            for BlockRows {
                block,
                host,
                device,
            } in pieces
            {
                let queue_id = block.queue_id;
                let (computed, ready) = queue::event();

                queues.submit(queue_id, move || {
                    trace!(queue = queue_id, start = block.start_row, end = block.end_row, "compute");
                    compute(lanes, kernel, block.start_row, width, &mut *device, queue_id)?;
                    computed.complete(device);
                    Ok(())
                })?;

                queues.submit(queue_id, move || {
                    let device = ready.wait(queue_id)?;
                    host.copy_from_slice(device);
                    trace!(queue = queue_id, start = block.start_row, end = block.end_row, "transfer");
                    Ok(())
                })?;
            }
            advance(state, PipelineState::BlocksIssued);
            Ok(blocks.len())
        });

        match issued {
            Ok(count) => {
                advance(state, PipelineState::Synchronized);
                info!(blocks = count, queues = config.queues, "image synchronized");
            }
            Err(err) => return Err(reset(state, err)),
        }

        advance(state, PipelineState::Ready);
        Ok(image)
    }

    /// Renders the image in `num_blocks` blocks, one after the other,
    /// transferring each block before the next is computed.
    #[instrument(skip(self))]
    pub fn render_blocked(&mut self, num_blocks: usize) -> Result<ImageBuffer> {
        advance(&mut self.state, PipelineState::Idle);
        let blocks = partition(self.config.height, num_blocks, self.config.queues)?;
        advance(&mut self.state, PipelineState::Partitioned);

        let width = self.config.width;
        let mut image = ImageBuffer::new(width, self.config.height)
            .map_err(|err| reset(&mut self.state, err))?;
        for block in &blocks {
            let device = &mut image.device_mut()[block.pixels(width)];
            compute(&self.lanes, &self.kernel, block.start_row, width, device, 0)
                .and_then(|_| image.transfer(block.rows()))
                .map_err(|err| reset(&mut self.state, err))?;
        }
        advance(&mut self.state, PipelineState::BlocksIssued);
        advance(&mut self.state, PipelineState::Synchronized);
        info!(blocks = blocks.len(), "image synchronized");

        advance(&mut self.state, PipelineState::Ready);
        Ok(image)
    }

    /// Renders the whole image in one parallel pass followed by one
    /// transfer.
    #[instrument(skip(self))]
    pub fn render_whole(&mut self) -> Result<ImageBuffer> {
        advance(&mut self.state, PipelineState::Idle);
        advance(&mut self.state, PipelineState::Partitioned);

        let (width, height) = (self.config.width, self.config.height);
        let mut image =
            ImageBuffer::new(width, height).map_err(|err| reset(&mut self.state, err))?;
        compute(&self.lanes, &self.kernel, 0, width, image.device_mut(), 0)
            .and_then(|_| image.transfer(0..height))
            .map_err(|err| reset(&mut self.state, err))?;
        advance(&mut self.state, PipelineState::BlocksIssued);
        advance(&mut self.state, PipelineState::Synchronized);
        info!(width, height, "image synchronized");

        advance(&mut self.state, PipelineState::Ready);
        Ok(image)
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug!(from = ?*state, to = ?next, "pipeline state");
    *state = next;
}

/// Abandons the run: back to `Idle`, passing `err` through.
fn reset(state: &mut PipelineState, err: Error) -> Error {
    advance(state, PipelineState::Idle);
    err
}

/// Runs the kernel over `rows` on the compute lanes.  A panic in the
/// kernel is reported as a fault of `queue`.
fn compute<K: PixelKernel>(
    lanes: &ThreadPool,
    kernel: &K,
    first_row: usize,
    width: usize,
    rows: &mut [u8],
    queue: usize,
) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        lanes.install(|| fill_rows(kernel, first_row, width, rows))
    }))
    .map_err(|panic| Error::fault(queue, panic_message(&*panic)))
}

/// Renders the Mandelbrot image of `config` through the queue pool in
/// `num_blocks` blocks.
pub fn render(config: &RenderConfig, num_blocks: usize) -> Result<ImageBuffer> {
    Renderer::mandelbrot(config.clone())?.render(num_blocks)
}
