//! Poll-based score tasks.
//!
//! Both execution strategies fill the score matrix with [`ScoreTask`]s:
//! the parallel orchestrator stores pending tasks backed by a channel from
//! the worker pool, while the sequential orchestrator wraps its immediate
//! results with [`ScoreTask::ready`] / [`ScoreTask::failed`] so aggregation
//! shares one code path.

use crossbeam_channel::{Receiver, TryRecvError};
use parking_lot::Mutex;

use cf_types::{SchedulingError, TaskError};

/// Outcome channel payload for one (parameter, fold) evaluation.
pub type TaskResult = Result<f64, TaskError>;

/// Observed state of a task at one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Pending,
    Ready(f64),
    Failed(TaskError),
}

impl TaskState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending)
    }
}

#[derive(Debug)]
enum Inner {
    Waiting(Receiver<TaskResult>),
    Done(TaskResult),
}

/// A future-like handle to one (parameter, fold) score.
///
/// Polling only observes; the first delivered result is cached so repeated
/// polls are idempotent and never consume or re-order anything.
#[derive(Debug)]
pub struct ScoreTask {
    parameter: f64,
    fold_index: usize,
    inner: Mutex<Inner>,
}

impl ScoreTask {
    /// A task that resolved before it was ever polled.
    pub fn ready(parameter: f64, fold_index: usize, score: f64) -> Self {
        Self {
            parameter,
            fold_index,
            inner: Mutex::new(Inner::Done(Ok(score))),
        }
    }

    /// A task that failed before it was ever polled.
    pub fn failed(parameter: f64, fold_index: usize, error: TaskError) -> Self {
        Self {
            parameter,
            fold_index,
            inner: Mutex::new(Inner::Done(Err(error))),
        }
    }

    /// A task whose result will arrive on `receiver`. Pool implementations
    /// build these at submission time.
    pub fn pending(parameter: f64, fold_index: usize, receiver: Receiver<TaskResult>) -> Self {
        Self {
            parameter,
            fold_index,
            inner: Mutex::new(Inner::Waiting(receiver)),
        }
    }

    pub fn parameter(&self) -> f64 {
        self.parameter
    }

    pub fn fold_index(&self) -> usize {
        self.fold_index
    }

    /// Non-blocking check: has the result arrived yet?
    pub fn poll(&self) -> TaskState {
        let mut inner = self.inner.lock();
        match &*inner {
            Inner::Done(result) => state_of(result),
            Inner::Waiting(receiver) => match receiver.try_recv() {
                Ok(result) => {
                    let state = state_of(&result);
                    *inner = Inner::Done(result);
                    state
                }
                Err(TryRecvError::Empty) => TaskState::Pending,
                Err(TryRecvError::Disconnected) => {
                    let result = Err(TaskError::Scheduling(SchedulingError::TaskAbandoned));
                    let state = state_of(&result);
                    *inner = Inner::Done(result);
                    state
                }
            },
        }
    }

    /// Block until the task resolves, then report its final state.
    pub fn wait(&self) -> TaskState {
        let mut inner = self.inner.lock();
        match &*inner {
            Inner::Done(result) => state_of(result),
            Inner::Waiting(receiver) => {
                let result = receiver
                    .recv()
                    .map_err(|_| TaskError::Scheduling(SchedulingError::TaskAbandoned))
                    .and_then(|r| r);
                let state = state_of(&result);
                *inner = Inner::Done(result);
                state
            }
        }
    }
}

fn state_of(result: &TaskResult) -> TaskState {
    match result {
        Ok(score) => TaskState::Ready(*score),
        Err(error) => TaskState::Failed(error.clone()),
    }
}
