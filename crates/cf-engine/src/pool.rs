//! Load-balanced worker pool with submit-and-poll semantics.

use std::thread;

use crossbeam_channel::{bounded, unbounded, Sender};
use tracing::debug;

use cf_types::{validation_error, CfResult, SchedulingError};

use crate::task::{ScoreTask, TaskResult};

/// One independent unit of scoring work.
pub type ScoreJob = Box<dyn FnOnce() -> TaskResult + Send + 'static>;

/// The pool contract the orchestrator depends on: accept a task without
/// blocking, eventually report a result or failure through the returned
/// task. Nothing else about the pool's internals is assumed.
pub trait TaskPool: Send + Sync {
    fn submit(
        &self,
        parameter: f64,
        fold_index: usize,
        job: ScoreJob,
    ) -> Result<ScoreTask, SchedulingError>;
}

struct QueuedJob {
    job: ScoreJob,
    result_tx: Sender<TaskResult>,
}

/// Fixed-size thread pool. Workers compete on a single unbounded job
/// channel, which yields load balancing; the unbounded queue means
/// submission never applies backpressure, so a large grid against a small
/// pool queues everything up front.
pub struct WorkerPool {
    job_tx: Option<Sender<QueuedJob>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> CfResult<Self> {
        if worker_count == 0 {
            return Err(validation_error!("worker pool needs at least one worker"));
        }

        let (job_tx, job_rx) = unbounded::<QueuedJob>();
        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let rx = job_rx.clone();
            let handle = thread::Builder::new()
                .name(format!("cf-worker-{worker_id}"))
                .spawn(move || {
                    for queued in rx.iter() {
                        let result = (queued.job)();
                        // Best-effort delivery; a dropped task just means
                        // nobody is listening any more.
                        let _ = queued.result_tx.send(result);
                    }
                })?;
            workers.push(handle);
        }

        Ok(Self {
            job_tx: Some(job_tx),
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting work, let queued jobs drain, and join the workers.
    pub fn shutdown(&mut self) {
        drop(self.job_tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl TaskPool for WorkerPool {
    fn submit(
        &self,
        parameter: f64,
        fold_index: usize,
        job: ScoreJob,
    ) -> Result<ScoreTask, SchedulingError> {
        let job_tx = self.job_tx.as_ref().ok_or(SchedulingError::PoolShutDown)?;

        let (result_tx, result_rx) = bounded(1);
        job_tx
            .send(QueuedJob { job, result_tx })
            .map_err(|_| SchedulingError::PoolShutDown)?;

        debug!(parameter, fold = fold_index, "submitted scoring task");
        Ok(ScoreTask::pending(parameter, fold_index, result_rx))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskState;
    use cf_types::TrainingFailure;

    #[test]
    fn rejects_empty_pool() {
        assert!(WorkerPool::new(0).is_err());
    }

    #[test]
    fn executes_submitted_jobs() {
        let pool = WorkerPool::new(2).unwrap();

        let task = pool
            .submit(0.5, 1, Box::new(|| Ok(0.5 * 2.0)))
            .unwrap();

        assert_eq!(task.wait(), TaskState::Ready(1.0));
        assert_eq!(task.fold_index(), 1);
    }

    #[test]
    fn job_failures_flow_through_the_task() {
        let pool = WorkerPool::new(1).unwrap();

        let task = pool
            .submit(
                0.1,
                0,
                Box::new(|| {
                    Err(TrainingFailure {
                        parameter: 0.1,
                        fold_index: 0,
                        cause: "did not converge".into(),
                    }
                    .into())
                }),
            )
            .unwrap();

        match task.wait() {
            TaskState::Failed(err) => assert!(err.to_string().contains("did not converge")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn submission_is_eager_and_never_blocks() {
        // One worker, many tasks: every submission is accepted immediately
        // and all tasks eventually resolve.
        let pool = WorkerPool::new(1).unwrap();

        let tasks: Vec<ScoreTask> = (0..64)
            .map(|i| {
                pool.submit(i as f64, 0, Box::new(move || Ok(i as f64)))
                    .unwrap()
            })
            .collect();

        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.wait(), TaskState::Ready(i as f64));
        }
    }

    #[test]
    fn shutdown_rejects_new_submissions() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();

        let err = pool
            .submit(1.0, 0, Box::new(|| Ok(1.0)))
            .unwrap_err();
        assert_eq!(err, SchedulingError::PoolShutDown);
    }
}
