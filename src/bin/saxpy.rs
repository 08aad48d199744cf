// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate mandelpipe;

use mandelpipe::saxpy::saxpy_demo;

const N: usize = 1024;

fn main() {
    match saxpy_demo(N) {
        Ok(y) => println!("{:.6} {:.6}", y[0], y[N - 1]),
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
    }
}
