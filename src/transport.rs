use crate::StrError;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier};
use std::thread;

/// Defines the rank of the coordinating process
pub const ROOT: usize = 0;

/// Tag reserved for the generic reduction built on point-to-point messages
const TAG_ALL_MAX: i32 = 90;

/// Defines the message-passing operations needed by the distributed solver
///
/// All operations are blocking. A failure is fatal for the whole run; callers
/// propagate the error and never retry.
pub trait Transport {
    /// Returns the rank of this process
    fn rank(&self) -> usize;

    /// Returns the number of processes
    fn size(&self) -> usize;

    /// Sends `data` to the process `to`
    fn send(&mut self, data: &[f64], to: usize, tag: i32) -> Result<(), StrError>;

    /// Receives exactly `data.len()` values from the process `from`
    fn receive(&mut self, data: &mut [f64], from: usize, tag: i32) -> Result<(), StrError>;

    /// Blocks until all processes have reached the barrier
    fn barrier(&mut self) -> Result<(), StrError>;

    /// Sends to and receives from the same peer
    ///
    /// Exactly one process of the pair must pass `sends_first = true`; the
    /// other one receives first. The exchange then completes even with
    /// unbuffered sends.
    fn send_receive(
        &mut self,
        send: &[f64],
        recv: &mut [f64],
        peer: usize,
        tag: i32,
        sends_first: bool,
    ) -> Result<(), StrError> {
        if sends_first {
            self.send(send, peer, tag)?;
            self.receive(recv, peer, tag)
        } else {
            self.receive(recv, peer, tag)?;
            self.send(send, peer, tag)
        }
    }

    /// Replaces each value by its maximum over all processes
    fn all_max(&mut self, values: &mut [f64]) -> Result<(), StrError> {
        if self.rank() == ROOT {
            let mut other = vec![0.0; values.len()];
            for from in 1..self.size() {
                self.receive(&mut other, from, TAG_ALL_MAX)?;
                for (v, o) in values.iter_mut().zip(&other) {
                    *v = f64::max(*v, *o);
                }
            }
            for to in 1..self.size() {
                self.send(values, to, TAG_ALL_MAX)?;
            }
            Ok(())
        } else {
            self.send(values, ROOT, TAG_ALL_MAX)?;
            self.receive(values, ROOT, TAG_ALL_MAX)
        }
    }

    /// Returns true on every process if `flag` is true on all processes
    fn all_true(&mut self, flag: bool) -> Result<bool, StrError> {
        let mut failed = [if flag { 0.0 } else { 1.0 }];
        self.all_max(&mut failed)?;
        Ok(failed[0] == 0.0)
    }
}

/// Holds a message in flight between two threads
struct Envelope {
    source: usize,
    tag: i32,
    data: Vec<f64>,
}

/// Implements the transport for a group of ranks running as threads of one process
///
/// Messages between the same pair of ranks with the same tag are received in
/// the order they were sent. Sends are buffered and never block.
pub struct ThreadTransport {
    rank: usize,
    size: usize,
    outboxes: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    pending: VecDeque<Envelope>,
    barrier: Arc<Barrier>,
}

impl ThreadTransport {
    /// Allocates a connected group of `size` ranks
    pub fn group(size: usize) -> Result<Vec<ThreadTransport>, StrError> {
        if size < 1 {
            return Err("the number of ranks must be ≥ 1");
        }
        let (outboxes, inboxes): (Vec<_>, Vec<_>) = (0..size).map(|_| mpsc::channel()).unzip();
        let barrier = Arc::new(Barrier::new(size));
        Ok(inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| ThreadTransport {
                rank,
                size,
                outboxes: outboxes.clone(),
                inbox,
                pending: VecDeque::new(),
                barrier: barrier.clone(),
            })
            .collect())
    }

    /// Takes the first pending message matching (source, tag)
    fn take_pending(&mut self, source: usize, tag: i32) -> Option<Envelope> {
        let position = self.pending.iter().position(|e| e.source == source && e.tag == tag)?;
        self.pending.remove(position)
    }
}

impl Transport for ThreadTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&mut self, data: &[f64], to: usize, tag: i32) -> Result<(), StrError> {
        let outbox = self.outboxes.get(to).ok_or("destination rank is out of range")?;
        outbox
            .send(Envelope {
                source: self.rank,
                tag,
                data: data.to_vec(),
            })
            .map_err(|_| "cannot send message to peer")
    }

    fn receive(&mut self, data: &mut [f64], from: usize, tag: i32) -> Result<(), StrError> {
        if from >= self.size {
            return Err("source rank is out of range");
        }
        let envelope = match self.take_pending(from, tag) {
            Some(envelope) => envelope,
            None => loop {
                let envelope = self.inbox.recv().map_err(|_| "cannot receive message from peer")?;
                if envelope.source == from && envelope.tag == tag {
                    break envelope;
                }
                self.pending.push_back(envelope);
            },
        };
        if envelope.data.len() != data.len() {
            return Err("received message has the wrong length");
        }
        data.copy_from_slice(&envelope.data);
        Ok(())
    }

    fn barrier(&mut self) -> Result<(), StrError> {
        self.barrier.wait();
        Ok(())
    }
}

/// Runs `task` on `size` ranks, one thread each, and returns the results in rank order
pub fn run_on_threads<F, R>(size: usize, task: F) -> Result<Vec<R>, StrError>
where
    F: Fn(&mut ThreadTransport) -> Result<R, StrError> + Sync,
    R: Send,
{
    let group = ThreadTransport::group(size)?;
    let task = &task;
    thread::scope(|scope| {
        let handles: Vec<_> = group
            .into_iter()
            .map(|mut comm| scope.spawn(move || task(&mut comm)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| "worker thread panicked")?)
            .collect()
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
