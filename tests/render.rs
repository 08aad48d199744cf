// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate mandelpipe;
extern crate num;
extern crate rand;
extern crate tempfile;

use mandelpipe::{
    partition, save_image, Error, ImageBuffer, Mandelbrot, PipelineState, PixelKernel,
    RenderConfig, Renderer,
};
use num::Complex;
use rand::Rng;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts every call made to the kernel it wraps.
struct Counted<K> {
    kernel: K,
    calls: AtomicUsize,
}

impl<K: PixelKernel> PixelKernel for Counted<K> {
    fn intensity(&self, x: usize, y: usize) -> u8 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.kernel.intensity(x, y)
    }
}

fn config(width: usize, height: usize) -> RenderConfig {
    RenderConfig {
        width,
        height,
        max_iters: 50,
        max_color: 255,
        leftlower: Complex::new(-1.7, -1.2),
        rightupper: Complex::new(0.5, 1.2),
        queues: 4,
        lanes: 2,
    }
}

fn counted(config: RenderConfig) -> Renderer<Counted<Mandelbrot>> {
    let kernel = Counted {
        kernel: Mandelbrot::new(&config).unwrap(),
        calls: AtomicUsize::new(0),
    };
    Renderer::new(config, kernel).unwrap()
}

#[test]
fn four_by_four_agrees_across_block_counts() {
    let mut renderer = Renderer::mandelbrot(config(4, 4)).unwrap();
    let one = renderer.render(1).unwrap();
    let two = renderer.render(2).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(one.get(x, y).unwrap(), two.get(x, y).unwrap());
        }
    }
}

#[test]
fn one_block_and_sixteen_blocks_are_byte_identical() {
    let mut renderer = Renderer::mandelbrot(config(96, 64)).unwrap();
    let one = renderer.render(1).unwrap();
    let sixteen = renderer.render(16).unwrap();
    assert_eq!(one.as_slice(), sixteen.as_slice());
}

#[test]
fn queue_count_does_not_change_the_image() {
    let mut reference = Renderer::mandelbrot(RenderConfig {
        queues: 1,
        ..config(32, 32)
    })
    .unwrap();
    let mut wide = Renderer::mandelbrot(RenderConfig {
        queues: 3,
        ..config(32, 32)
    })
    .unwrap();
    assert_eq!(reference.render(8).unwrap(), wide.render(8).unwrap());
}

#[test]
fn zero_blocks_are_refused_before_any_pixel_is_computed() {
    let mut renderer = counted(config(8, 8));
    match renderer.render(0) {
        Err(Error::InvalidConfiguration { .. }) => {}
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
    assert_eq!(renderer.kernel().calls.load(Ordering::SeqCst), 0);
    assert_eq!(renderer.state(), PipelineState::Idle);
}

#[test]
fn uneven_blocks_are_refused_before_any_pixel_is_computed() {
    let mut renderer = counted(config(8, 10));
    assert!(renderer.render(4).is_err());
    assert!(renderer.render_blocked(3).is_err());
    assert_eq!(renderer.kernel().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn every_pixel_is_computed_exactly_once() {
    let mut renderer = counted(config(16, 16));
    renderer.render(4).unwrap();
    assert_eq!(renderer.kernel().calls.load(Ordering::SeqCst), 256);
}

#[test]
fn kernel_is_deterministic_at_random_pixels() {
    let config = config(640, 480);
    let kernel = Mandelbrot::new(&config).unwrap();
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let x = rng.gen_range(0, config.width);
        let y = rng.gen_range(0, config.height);
        assert_eq!(kernel.intensity(x, y), kernel.intensity(x, y));
    }
}

#[test]
fn opposite_corners_stay_in_range() {
    let config = config(640, 480);
    let kernel = Mandelbrot::new(&config).unwrap();
    for &(x, y) in &[(0, 0), (config.width - 1, config.height - 1)] {
        let value = kernel.intensity(x, y);
        assert!(value <= config.max_color);
    }
}

#[test]
fn partition_covers_the_default_height() {
    for &blocks in &[1, 2, 4, 8, 16, 32] {
        let descriptors = partition(16384, blocks, 4).unwrap();
        assert_eq!(descriptors.first().unwrap().start_row, 0);
        assert_eq!(descriptors.last().unwrap().end_row, 16384);
        for pair in descriptors.windows(2) {
            assert_eq!(pair[0].end_row, pair[1].start_row);
        }
    }
}

#[test]
fn saved_pgm_files_hold_header_and_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.pgm");
    let image = ImageBuffer::from_pixels(2, 2, vec![0, 64, 128, 255]).unwrap();
    save_image(&path, &image, 255).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes, b"P5\n#comment\n2 2\n255\n\x00\x40\x80\xff".to_vec());
}

#[test]
fn saved_png_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.png");
    let image = Renderer::mandelbrot(config(8, 8))
        .unwrap()
        .render(2)
        .unwrap();
    save_image(&path, &image, 255).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}
