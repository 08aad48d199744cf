// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;
extern crate mandelpipe;

use criterion::Criterion;
use mandelpipe::{RenderConfig, Renderer};

const SIZE: usize = 512;

fn block_counts(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "pipelined",
        |b, &blocks| {
            let mut renderer = Renderer::mandelbrot(RenderConfig::with_size(SIZE, SIZE)).unwrap();
            b.iter(|| renderer.render(blocks).unwrap())
        },
        vec![1usize, 4, 16, 64],
    );
}

fn variants(c: &mut Criterion) {
    c.bench_function("whole", |b| {
        let mut renderer = Renderer::mandelbrot(RenderConfig::with_size(SIZE, SIZE)).unwrap();
        b.iter(|| renderer.render_whole().unwrap())
    });
    c.bench_function("blocked 16", |b| {
        let mut renderer = Renderer::mandelbrot(RenderConfig::with_size(SIZE, SIZE)).unwrap();
        b.iter(|| renderer.render_blocked(16).unwrap())
    });
}

criterion_group!(benches, block_counts, variants);
criterion_main!(benches);
