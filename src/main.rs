// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate mandelpipe;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelpipe::{save_image, RenderConfig, Renderer};
use num::Complex;
use std::str::FromStr;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const ITERATIONS: &str = "iterations";
const MAXCOLOR: &str = "max-color";
const BLOCKS: &str = "blocks";
const QUEUES: &str = "queues";
const LANES: &str = "lanes";
const MODE: &str = "mode";

fn args<'a>() -> ArgMatches<'a> {
    let max_lanes = num_cpus::get();

    App::new("mandelpipe")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Block-pipelined Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (.pgm is written natively, other extensions by encoder)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("16384x16384")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.7,-1.2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner (xmin,ymin) of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.5,1.2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner (xmax,ymax) of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iteration bound of the divergence test"),
        )
        .arg(
            Arg::with_name(MAXCOLOR)
                .required(false)
                .long(MAXCOLOR)
                .short("c")
                .takes_value(true)
                .default_value("255")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        255,
                        "Could not parse maximum color",
                        "Maximum color must be between 1 and 255",
                    )
                })
                .help("Brightest gray level in the output"),
        )
        .arg(
            Arg::with_name(BLOCKS)
                .required(false)
                .long(BLOCKS)
                .short("b")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("16")
                .validator(|s| {
                    i64::from_str(&s)
                        .map(|_| ())
                        .map_err(|_| "Could not parse block count".to_string())
                })
                .help("Number of row blocks; must divide the image height"),
        )
        .arg(
            Arg::with_name(QUEUES)
                .required(false)
                .long(QUEUES)
                .short("q")
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        64,
                        "Could not parse queue count",
                        "Queue count must be between 1 and 64",
                    )
                })
                .help("Number of asynchronous queues"),
        )
        .arg(
            Arg::with_name(LANES)
                .required(false)
                .long(LANES)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_lanes,
                        "Could not parse lane count",
                        &format!("Lane count must be between 1 and {}", max_lanes),
                    )
                })
                .help("Number of compute lanes (defaults to the number of CPUs)"),
        )
        .arg(
            Arg::with_name(MODE)
                .required(false)
                .long(MODE)
                .short("m")
                .takes_value(true)
                .possible_values(&["whole", "blocked", "pipelined"])
                .default_value("pipelined")
                .help("How the image is scheduled"),
        )
        .get_matches()
}

fn config(matches: &ArgMatches) -> RenderConfig {
    let (width, height) =
        parse_pair(matches.value_of(SIZE).unwrap(), 'x').expect("Error parsing image dimensions");
    let leftlower = parse_complex(matches.value_of(LEFTLOWER).unwrap())
        .expect("Error parsing left lower point");
    let rightupper = parse_complex(matches.value_of(RIGHTUPPER).unwrap())
        .expect("Error parsing right upper point");
    let max_iters = u32::from_str(matches.value_of(ITERATIONS).unwrap())
        .expect("Could not parse iteration count.");
    let max_color = u8::from_str(matches.value_of(MAXCOLOR).unwrap())
        .expect("Could not parse maximum color.");
    let queues =
        usize::from_str(matches.value_of(QUEUES).unwrap()).expect("Could not parse queue count.");
    let lanes = matches
        .value_of(LANES)
        .map(|s| usize::from_str(s).expect("Could not parse lane count."))
        .unwrap_or_else(num_cpus::get);

    RenderConfig {
        width,
        height,
        max_iters,
        max_color,
        leftlower,
        rightupper,
        queues,
        lanes,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = args();
    let config = config(&matches);
    let max_color = config.max_color;
    let blocks =
        i64::from_str(matches.value_of(BLOCKS).unwrap()).expect("Could not parse block count.");

    let started = Instant::now();
    let rendered = Renderer::mandelbrot(config).and_then(|mut renderer| {
        match matches.value_of(MODE).unwrap() {
            "whole" => renderer.render_whole(),
            // Negative counts become zero and are refused like zero.
            "blocked" => renderer.render_blocked(blocks.max(0) as usize),
            _ => renderer.render(blocks.max(0) as usize),
        }
    });

    match rendered {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(image) => {
            println!("Time: {:.6} seconds.", started.elapsed().as_secs_f64());
            if let Err(e) = save_image(matches.value_of(OUTPUT).unwrap(), &image, max_color) {
                eprintln!("Render failure: {}", e);
                std::process::exit(1);
            }
        }
    }
}
