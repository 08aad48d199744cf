// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Populates a mirrored array on the device side, clones it, and reads
//! the clone back on the host side.

extern crate mandelpipe;

use mandelpipe::{Mirrored, Result};
use tracing_subscriber::EnvFilter;

const LEN: usize = 1024;

fn run() -> Result<()> {
    let mut data: Mirrored<f64> = Mirrored::new(LEN);
    data.populate(|i| 2.0 * i as f64);

    let mut copy = data.clone();
    copy.update_host();

    println!("{}", copy.len());
    println!("{}", copy.get(0)?);
    println!("{}", copy.get(copy.len() - 1)?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
