use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use runtime::work_queue::{WorkId, WorkQueue};

use crate::error::DecodeError;
use crate::protocol::{DecodeRequest, DecodedFeature, WorkerReply};

/// Identifies one load attempt from submission to its terminal reply.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadId(pub u64);

/// Off-thread decode implementation.
///
/// `progress` may be called any number of times while decoding; each call
/// surfaces as a `WorkerReply::Progress` on the main thread. The return
/// value becomes the single terminal reply, so every load produces exactly
/// one `Decoded` or `Error`.
pub trait Decoder: Send + Sync + 'static {
    fn decode(
        &self,
        req: &DecodeRequest,
        progress: &mut dyn FnMut(),
    ) -> Result<DecodedFeature, DecodeError>;
}

/// Bounded pool of decode worker threads.
///
/// Submissions beyond the worker count wait in a deterministic queue; a
/// queued load can still be cancelled, an in-flight one runs to completion
/// and its reply is discarded by the caller. Workers never touch shared
/// state: they only send replies back over the channel, and all pool
/// bookkeeping (`submit`, `cancel`, `poll`) happens on the main thread.
pub struct WorkerPool {
    worker_count: usize,
    in_flight: usize,
    next_load: u64,
    pending: WorkQueue<(LoadId, DecodeRequest)>,
    queued: BTreeMap<LoadId, WorkId>,
    job_tx: Option<Sender<(LoadId, DecodeRequest)>>,
    reply_rx: Receiver<(LoadId, WorkerReply)>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(worker_count: usize, decoder: Arc<dyn Decoder>) -> Self {
        assert!(worker_count > 0, "worker pool needs at least one worker");

        let (job_tx, job_rx) = unbounded::<(LoadId, DecodeRequest)>();
        let (reply_tx, reply_rx) = unbounded::<(LoadId, WorkerReply)>();

        let workers = (0..worker_count)
            .map(|n| {
                let job_rx = job_rx.clone();
                let reply_tx = reply_tx.clone();
                let decoder = Arc::clone(&decoder);
                std::thread::Builder::new()
                    .name(format!("decode-{n}"))
                    .spawn(move || {
                        while let Ok((load, req)) = job_rx.recv() {
                            let mut emit_progress = || {
                                let _ = reply_tx.send((load, WorkerReply::Progress));
                            };
                            let reply = match decoder.decode(&req, &mut emit_progress) {
                                Ok(payload) => WorkerReply::Decoded(payload),
                                Err(e) => WorkerReply::Error {
                                    message: e.to_string(),
                                },
                            };
                            if reply_tx.send((load, reply)).is_err() {
                                break;
                            }
                        }
                    })
                    .expect("spawn decode worker")
            })
            .collect();

        Self {
            worker_count,
            in_flight: 0,
            next_load: 0,
            pending: WorkQueue::new(),
            queued: BTreeMap::new(),
            job_tx: Some(job_tx),
            reply_rx,
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn queued_len(&self) -> usize {
        self.pending.len()
    }

    /// Submits a decode request. If all workers are busy the request waits
    /// in the pending queue until one frees up.
    pub fn submit(&mut self, req: DecodeRequest) -> LoadId {
        let load = LoadId(self.next_load);
        self.next_load = self.next_load.wrapping_add(1);
        let work = self.pending.push(0, (load, req));
        self.queued.insert(load, work);
        log::debug!("load {load:?} submitted");
        self.dispatch();
        load
    }

    /// Cancels a load that is still waiting for a worker.
    ///
    /// Returns `false` once the load has been dispatched; an in-flight
    /// decode completes and its reply is discarded by the caller.
    pub fn cancel(&mut self, load: LoadId) -> bool {
        if let Some(work) = self.queued.remove(&load) {
            log::debug!("load {load:?} cancelled while queued");
            return self.pending.cancel(work);
        }
        false
    }

    /// Drains all replies that have arrived since the last poll.
    ///
    /// Terminal replies release their worker, which may dispatch queued
    /// loads. Main-thread only.
    pub fn poll(&mut self) -> Vec<(LoadId, WorkerReply)> {
        let replies: Vec<_> = self.reply_rx.try_iter().collect();
        for (_, reply) in &replies {
            if reply.is_terminal() {
                self.in_flight -= 1;
            }
        }
        self.dispatch();
        replies
    }

    fn dispatch(&mut self) {
        let Some(job_tx) = self.job_tx.as_ref() else {
            return;
        };
        while self.in_flight < self.worker_count {
            let Some((_, (load, req))) = self.pending.pop_next() else {
                break;
            };
            self.queued.remove(&load);
            if job_tx.send((load, req)).is_err() {
                break;
            }
            self.in_flight += 1;
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loops.
        self.job_tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
