use tokio::sync::watch;

use crate::foundation::error::{LoadError, RetouchError, RetouchResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TaskState {
    Pending,
    Ready,
    Failed(LoadError),
}

/// Awaitable, cloneable view of a background task's outcome.
///
/// Any number of callers may wait; all of them observe the same settled state.
#[derive(Clone, Debug)]
pub(crate) struct TaskHandle {
    rx: watch::Receiver<TaskState>,
}

/// Write side of a [`TaskHandle`]. Dropping it unsettled makes waiters fail with a task error.
#[derive(Debug)]
pub(crate) struct TaskCompleter {
    tx: watch::Sender<TaskState>,
}

pub(crate) fn task_pair() -> (TaskCompleter, TaskHandle) {
    let (tx, rx) = watch::channel(TaskState::Pending);
    (TaskCompleter { tx }, TaskHandle { rx })
}

impl TaskCompleter {
    pub(crate) fn settle(self, result: Result<(), LoadError>) {
        let state = match result {
            Ok(()) => TaskState::Ready,
            Err(e) => TaskState::Failed(e),
        };
        self.tx.send_replace(state);
    }
}

impl TaskHandle {
    /// Wait until the task settles.
    pub(crate) async fn wait(&self) -> RetouchResult<()> {
        let mut rx = self.rx.clone();
        let state = rx
            .wait_for(|s| *s != TaskState::Pending)
            .await
            .map_err(|_| RetouchError::task("background task ended before settling"))?
            .clone();
        match state {
            TaskState::Ready => Ok(()),
            TaskState::Failed(e) => Err(RetouchError::Load(e)),
            TaskState::Pending => Err(RetouchError::task("task still pending after wake")),
        }
    }
}
