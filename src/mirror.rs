// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A container that owns a host copy and a device copy of the same
//! array.  The two copies are only ever brought into agreement by an
//! explicit `update_host` or `update_device`.

use rayon::prelude::*;
use std::ops::Range;
use tracing::trace;

use crate::error::{Error, Result};

/// An array with a host side and a device side.  Work is done on the
/// device side; the host side is what callers read after an update.
#[derive(Debug)]
pub struct Mirrored<T> {
    host: Vec<T>,
    device: Vec<T>,
}

impl<T> Mirrored<T>
where
    T: Copy + Default + Send + Sync,
{
    /// Allocates both sides, each filled with `T::default()`.
    pub fn new(len: usize) -> Self {
        trace!(len, "allocating mirrored buffer");
        Mirrored {
            host: vec![T::default(); len],
            device: vec![T::default(); len],
        }
    }

    /// Number of elements on either side.
    pub fn len(&self) -> usize {
        self.host.len()
    }

    /// True if the container holds nothing.
    pub fn is_empty(&self) -> bool {
        self.host.is_empty()
    }

    /// Sets every device element to `f(index)`, in parallel.
    pub fn populate<F>(&mut self, f: F)
    where
        F: Fn(usize) -> T + Sync,
    {
        self.device
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = f(i));
    }

    /// Copies the whole device side to the host side.
    pub fn update_host(&mut self) {
        self.host.copy_from_slice(&self.device);
    }

    /// Copies the whole host side to the device side.
    pub fn update_device(&mut self) {
        self.device.copy_from_slice(&self.host);
    }

    /// Copies part of the device side to the host side.
    pub fn update_host_range(&mut self, range: Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::IndexOutOfRange {
                index: range.end,
                len: self.len(),
            });
        }
        self.host[range.clone()].copy_from_slice(&self.device[range]);
        Ok(())
    }

    /// Bounds-checked read of a host element.
    pub fn get(&self, index: usize) -> Result<&T> {
        let len = self.len();
        self.host
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Bounds-checked write access to a host element.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.host
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// The host side.
    pub fn host(&self) -> &[T] {
        &self.host
    }

    /// The device side.
    pub fn device(&self) -> &[T] {
        &self.device
    }

    /// Both sides at once, host first, for callers that need to hand
    /// out disjoint pieces of each.
    pub fn sides_mut(&mut self) -> (&mut [T], &mut [T]) {
        (&mut self.host, &mut self.device)
    }

    /// Gives up the host side, releasing the device side.
    pub fn into_host(mut self) -> Vec<T> {
        std::mem::replace(&mut self.host, Vec::new())
    }
}

/// Cloning copies the device side with a parallel copy and leaves the
/// new host side unsynchronised until `update_host` is called.
impl<T> Clone for Mirrored<T>
where
    T: Copy + Default + Send + Sync,
{
    fn clone(&self) -> Self {
        let mut copy = Mirrored::new(self.len());
        copy.device
            .par_iter_mut()
            .zip(self.device.par_iter())
            .for_each(|(to, from)| *to = *from);
        copy
    }
}

impl<T> Drop for Mirrored<T> {
    fn drop(&mut self) {
        trace!(
            host = self.host.len(),
            device = self.device.len(),
            "releasing mirrored buffer"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_touches_only_the_device() {
        let mut data: Mirrored<f64> = Mirrored::new(8);
        data.populate(|i| 2.0 * i as f64);
        assert_eq!(data.device()[7], 14.0);
        assert_eq!(*data.get(7).unwrap(), 0.0);
        data.update_host();
        assert_eq!(*data.get(7).unwrap(), 14.0);
    }

    #[test]
    fn clone_copies_the_device_side() {
        let mut data: Mirrored<f64> = Mirrored::new(1024);
        data.populate(|i| 2.0 * i as f64);
        let mut copy = data.clone();
        assert_eq!(copy.len(), 1024);
        assert_eq!(*copy.get(1023).unwrap(), 0.0);
        copy.update_host();
        assert_eq!(*copy.get(0).unwrap(), 0.0);
        assert_eq!(*copy.get(1023).unwrap(), 2046.0);
    }

    #[test]
    fn clone_is_deep() {
        let mut data: Mirrored<u32> = Mirrored::new(4);
        data.populate(|i| i as u32);
        let copy = data.clone();
        data.populate(|_| 9);
        assert_eq!(copy.device(), &[0, 1, 2, 3]);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut data: Mirrored<u8> = Mirrored::new(4);
        match data.get(4) {
            Err(Error::IndexOutOfRange { index: 4, len: 4 }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(data.get_mut(100).is_err());
        assert!(data.update_host_range(2..5).is_err());
    }

    #[test]
    fn update_device_pushes_host_writes() {
        let mut data: Mirrored<u8> = Mirrored::new(3);
        *data.get_mut(1).unwrap() = 7;
        data.update_device();
        assert_eq!(data.device(), &[0, 7, 0]);
    }

    #[test]
    fn partial_updates_leave_the_rest_alone() {
        let mut data: Mirrored<u8> = Mirrored::new(4);
        data.populate(|_| 1);
        data.update_host_range(1..3).unwrap();
        assert_eq!(data.host(), &[0, 1, 1, 0]);
        assert_eq!(data.into_host(), vec![0, 1, 1, 0]);
    }
}
