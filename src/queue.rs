// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A fixed pool of asynchronous execution queues.
//!
//! Each queue is a worker thread draining its own channel, so the
//! operations submitted to one queue run one after another in
//! submission order, while operations on different queues run
//! concurrently and in no particular order.  Submitting never blocks.
//! Ordering across queues exists only where it is asked for, with an
//! [`event`]: the producing operation signals it, the consuming
//! operation waits on it, and whatever the producer finished with
//! travels along the edge.
//!
//! [`run`] opens the pool, hands the caller a [`Queues`] handle to
//! issue work through, and then waits at a single barrier for every
//! queue to drain.  A queue that fails or panics poisons the run: the
//! barrier still waits for the others, and then reports the fault.

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::thread::ScopedJoinHandle;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, trace};

use crate::error::{Error, Result};

/// One unit of work on a queue.
pub type Op<'a> = Box<dyn FnOnce() -> Result<()> + Send + 'a>;

/// The handle through which operations are issued while a pool is
/// running.
pub struct Queues<'a> {
    senders: Vec<Sender<Op<'a>>>,
}

impl<'a> Queues<'a> {
    /// Number of queues in the pool.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// True if the pool has no queues; a running pool always has some.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Appends `op` to queue `queue` without waiting for it to run.
    pub fn submit<F>(&self, queue: usize, op: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'a,
    {
        let sender = self.senders.get(queue).ok_or(Error::IndexOutOfRange {
            index: queue,
            len: self.senders.len(),
        })?;
        trace!(queue, "submitting operation");
        sender
            .send(Box::new(op))
            .map_err(|_| Error::fault(queue, "queue stopped accepting work"))
    }
}

/// The producing end of a dependency edge.
pub struct Signal<T>(Sender<T>);

/// The consuming end of a dependency edge.
pub struct Wait<T>(Receiver<T>);

/// Creates a one-shot dependency edge carrying a `T` from the
/// operation that signals it to the operation that waits on it.  A
/// waiting operation must have been submitted after the signalling
/// one, or onto a different queue.
pub fn event<T>() -> (Signal<T>, Wait<T>) {
    let (tx, rx) = channel::bounded(1);
    (Signal(tx), Wait(rx))
}

impl<T> Signal<T> {
    /// Marks the edge complete, handing `value` to the waiter.
    pub fn complete(self, value: T) {
        // If the waiter is gone its queue has already faulted, and the
        // barrier will say so.
        let _ = self.0.send(value);
    }
}

impl<T> Wait<T> {
    /// Blocks the calling queue until the edge completes.  Fails if the
    /// signalling operation was dropped without completing.
    pub fn wait(self, queue: usize) -> Result<T> {
        self.0
            .recv()
            .map_err(|_| Error::fault(queue, "dependency abandoned before it completed"))
    }
}

/// Opens a pool of `size` queues, runs `issue` to submit work to it,
/// then blocks until every submitted operation has finished.  Returns
/// what `issue` returned, or the first fault any queue reported.
///
/// A panic on the issuing thread itself belongs to no queue.  It is
/// reported against queue 0 with a reason that names the issuer.
pub fn run<'a, R, F>(size: usize, issue: F) -> Result<R>
where
    F: FnOnce(&Queues<'a>) -> Result<R>,
{
    if size == 0 {
        return Err(Error::invalid("the queue pool must hold at least 1 queue"));
    }

    let outcome = crossbeam::scope(|scope| {
        let mut senders = Vec::with_capacity(size);
        let mut workers = Vec::with_capacity(size);
        for queue in 0..size {
            let (tx, rx) = channel::unbounded::<Op<'a>>();
            senders.push(tx);
            workers.push(scope.spawn(move |_| drain(queue, rx)));
        }

        let queues = Queues { senders };
        let issued = panic::catch_unwind(AssertUnwindSafe(|| issue(&queues)))
            .unwrap_or_else(|panic| Err(issuer_fault(&*panic)));
        // Closing the channels lets each worker stop once it is empty.
        drop(queues);

        match barrier(workers) {
            Ok(completed) => {
                debug!(queues = size, completed, "barrier reached");
                issued
            }
            Err(fault) => Err(fault),
        }
    });

    match outcome {
        Ok(result) => result,
        // Workers are joined at the barrier; nothing else is spawned.
        Err(_) => Err(Error::fault(0, "queue pool lost an unjoined thread")),
    }
}

fn issuer_fault(panic: &(dyn Any + Send)) -> Error {
    let reason = format!("issuing thread panicked: {}", panic_message(panic));
    error!(%reason, "issue aborted");
    Error::fault(0, reason)
}

fn drain(queue: usize, ops: Receiver<Op>) -> Result<usize> {
    let mut completed = 0;
    for op in ops.iter() {
        op()?;
        completed += 1;
    }
    trace!(queue, completed, "queue drained");
    Ok(completed)
}

fn barrier(workers: Vec<ScopedJoinHandle<Result<usize>>>) -> Result<usize> {
    let mut completed = 0;
    let mut fault = None;
    for (queue, worker) in workers.into_iter().enumerate() {
        let outcome = worker
            .join()
            .unwrap_or_else(|panic| Err(Error::fault(queue, panic_message(&*panic))));
        match outcome {
            Ok(count) => completed += count,
            Err(err) => {
                error!(queue, %err, "queue faulted");
                fault = fault.or(Some(err));
            }
        }
    }
    match fault {
        Some(err) => Err(err),
        None => Ok(completed),
    }
}

/// Extracts the message from a panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
