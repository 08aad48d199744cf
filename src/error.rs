// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by every part of the renderer.

use failure::Fail;
use std::io;

/// Everything that can go wrong while configuring, rendering, or
/// writing an image.  Configuration problems are always reported
/// before any work is handed to a queue.
#[derive(Debug, Fail)]
pub enum Error {
    /// The run was asked to do something that makes no sense: zero
    /// blocks, a block count that does not divide the image height, an
    /// empty queue pool, an inverted complex rectangle, and so on.
    #[fail(display = "invalid configuration: {}", reason)]
    InvalidConfiguration {
        /// What was wrong.
        reason: String,
    },

    /// A queue could not finish its work.  There is no recovery; the
    /// whole run is abandoned.
    #[fail(display = "device fault on queue {}: {}", queue, reason)]
    DeviceFault {
        /// The queue that failed.
        queue: usize,
        /// What the queue reported.
        reason: String,
    },

    /// The pool of compute lanes could not be brought up.
    #[fail(display = "could not initialise compute lanes: {}", reason)]
    DeviceInit {
        /// The reason given by the thread pool builder.
        reason: String,
    },

    /// Bounds-checked access outside of a container.
    #[fail(display = "index {} is out of range 0..{}", index, len)]
    IndexOutOfRange {
        /// The index requested.
        index: usize,
        /// The length of the container.
        len: usize,
    },

    /// Two operands that must be the same length were not.
    #[fail(display = "operand length {} does not match {}", actual, expected)]
    LengthMismatch {
        /// The length of the first operand.
        expected: usize,
        /// The length of the offending operand.
        actual: usize,
    },

    /// The image could not be written.
    #[fail(display = "I/O error: {}", _0)]
    Io(#[cause] io::Error),

    /// The image encoder refused the pixels.
    #[fail(display = "could not encode image: {}", reason)]
    Encode {
        /// The reason given by the encoder.
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid<S: Into<String>>(reason: S) -> Self {
        Error::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn fault<S: Into<String>>(queue: usize, reason: S) -> Self {
        Error::DeviceFault {
            queue,
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// Shorthand for results carrying the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_queue_of_a_fault() {
        let err = Error::fault(3, "lost");
        assert_eq!(format!("{}", err), "device fault on queue 3: lost");
    }

    #[test]
    fn display_names_the_bounds() {
        let err = Error::IndexOutOfRange { index: 9, len: 4 };
        assert_eq!(format!("{}", err), "index 9 is out of range 0..4");
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = io::Error::new(io::ErrorKind::Other, "disk").into();
        match err {
            Error::Io(_) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
