//! Commit-on-settle buffer for rapid field edits.
//!
//! A [`PendingEdit`] holds the latest value handed to it and commits that
//! value once no new value has arrived for the configured delay. Only the
//! final value of a burst of edits reaches the commit callback.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum Command<T> {
    Set(T),
    Flush(oneshot::Sender<()>),
}

/// Handle to a background task owning the pending value.
///
/// Must be created inside a tokio runtime. Dropping the handle commits any
/// pending value and ends the task.
pub struct PendingEdit<T> {
    sender: mpsc::UnboundedSender<Command<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> PendingEdit<T> {
    pub fn new<F>(delay: Duration, commit: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(settle(delay, receiver, commit));
        PendingEdit {
            sender,
            task: Some(task),
        }
    }

    /// Replaces the pending value and restarts the quiet period.
    pub fn set(&self, value: T) {
        if self.sender.send(Command::Set(value)).is_err() {
            log::warn!("Pending edit task has stopped, dropping value");
        }
    }

    /// Commits the pending value now, if there is one.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Commits the pending value and waits for the task to finish.
    pub async fn close(mut self) {
        let task = self.task.take();
        drop(self);
        if let Some(task) = task {
            if let Err(e) = task.await {
                log::error!("Pending edit task failed: {e}");
            }
        }
    }
}

async fn settle<T, F>(delay: Duration, mut receiver: mpsc::UnboundedReceiver<Command<T>>, mut commit: F)
where
    F: FnMut(T),
{
    let mut pending: Option<T> = None;
    loop {
        let command = if pending.is_some() {
            tokio::select! {
                command = receiver.recv() => command,
                _ = tokio::time::sleep(delay) => {
                    if let Some(value) = pending.take() {
                        log::debug!("Committing settled edit");
                        commit(value);
                    }
                    continue;
                }
            }
        } else {
            receiver.recv().await
        };

        match command {
            Some(Command::Set(value)) => pending = Some(value),
            Some(Command::Flush(done)) => {
                if let Some(value) = pending.take() {
                    commit(value);
                }
                let _ = done.send(());
            }
            None => {
                // Every handle is gone.
                if let Some(value) = pending.take() {
                    commit(value);
                }
                break;
            }
        }
    }
}
