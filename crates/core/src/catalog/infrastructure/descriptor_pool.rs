use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::domain::descriptor::{Descriptor, DescriptorExtractor};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("descriptor pool is shut down")]
    Disconnected,
    #[error("descriptor extraction timed out after {0:?}")]
    Timeout(Duration),
}

struct Job {
    crop: Frame,
    reply: crossbeam_channel::Sender<Option<Descriptor>>,
}

/// Fixed-size worker pool for CPU-bound descriptor extraction.
///
/// [`extract`](DescriptorPool::extract) is a blocking submit-and-await:
/// it isolates the computation from the calling thread and lets multiple
/// in-flight calls run in parallel, but provides no pipelining. The await
/// carries an explicit timeout; expiry counts as extraction failure
/// rather than blocking the caller indefinitely.
pub struct DescriptorPool {
    job_tx: Option<crossbeam_channel::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    timeout: Duration,
}

impl DescriptorPool {
    pub fn new(
        workers: usize,
        extractor: Arc<dyn DescriptorExtractor>,
        timeout: Duration,
    ) -> Self {
        let workers = workers.max(1);
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(workers * 2);

        let handles = (0..workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                let extractor = extractor.clone();
                std::thread::spawn(move || {
                    for job in job_rx {
                        let result = extractor.extract(&job.crop);
                        // Receiver may have timed out and gone away.
                        let _ = job.reply.send(result);
                    }
                })
            })
            .collect();

        Self {
            job_tx: Some(job_tx),
            workers: handles,
            timeout,
        }
    }

    /// Submits `crop` to the pool and blocks until its descriptor is ready
    /// or the timeout expires.
    ///
    /// `Ok(None)` is the extractor's own verdict (unusable crop), distinct
    /// from pool-level failure.
    pub fn extract(&self, crop: Frame) -> Result<Option<Descriptor>, PoolError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let job = Job {
            crop,
            reply: reply_tx,
        };

        self.job_tx
            .as_ref()
            .ok_or(PoolError::Disconnected)?
            .send(job)
            .map_err(|_| PoolError::Disconnected)?;

        reply_rx.recv_timeout(self.timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => PoolError::Timeout(self.timeout),
            crossbeam_channel::RecvTimeoutError::Disconnected => PoolError::Disconnected,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        // Closing the channel ends each worker's job loop.
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
