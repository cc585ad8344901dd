//! Single-settle result handling for unpack requests
//!
//! Each request moves through `Pending → Resolved | Rejected` exactly once.
//! [`Settle`] is the producing half: settling consumes it, so a request can't be
//! resolved twice or resolved after being rejected. [`UnpackHandle`] is the
//! consuming half and is polled like any other future.

use crate::error::{Error, Result};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Terminal state reached by a settled request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// The request produced a destination path
    Resolved,
    /// The request produced an error
    Rejected,
}

impl Settlement {
    /// `true` for [`Settlement::Resolved`]
    pub fn is_resolved(self) -> bool {
        self == Settlement::Resolved
    }
}

/// Producing half of a pending unpack result
#[derive(Debug)]
pub struct Settle {
    tx: oneshot::Sender<Result<PathBuf>>,
}

impl Settle {
    /// Create a pending result and the handle that observes it
    pub fn pending() -> (Settle, UnpackHandle) {
        let (tx, rx) = oneshot::channel();
        (
            Settle { tx },
            UnpackHandle {
                rx,
                task: None,
                aborted: false,
            },
        )
    }

    /// Settle with the outcome of the pipeline
    ///
    /// A dropped handle is not an error; the outcome is simply discarded.
    pub fn settle(self, outcome: Result<PathBuf>) -> Settlement {
        let settlement = match outcome {
            Ok(_) => Settlement::Resolved,
            Err(_) => Settlement::Rejected,
        };
        let _ = self.tx.send(outcome);
        settlement
    }

    /// Settle as `Resolved(path)`
    pub fn resolve(self, path: PathBuf) -> Settlement {
        self.settle(Ok(path))
    }

    /// Settle as `Rejected(error)`
    pub fn reject(self, error: Error) -> Settlement {
        self.settle(Err(error))
    }
}

/// Handle to an in-flight unpack request
///
/// Resolves to the destination directory on success. If the task driving the
/// request goes away without settling (a panic in a codec, or [`abort`]), the
/// handle yields [`Error::Unknown`] instead of waiting forever.
///
/// [`abort`]: UnpackHandle::abort
#[must_use = "an UnpackHandle does nothing unless awaited"]
#[derive(Debug)]
pub struct UnpackHandle {
    rx: oneshot::Receiver<Result<PathBuf>>,
    task: Option<JoinHandle<()>>,
    aborted: bool,
}

impl UnpackHandle {
    pub(crate) fn attach(&mut self, task: JoinHandle<()>) {
        self.task = Some(task);
    }

    /// Stop the request's task
    ///
    /// Output written so far is left in place. Blocking codec work already handed
    /// to a worker thread runs to completion in the background.
    pub fn abort(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
            self.aborted = true;
        }
    }
}

impl Future for UnpackHandle {
    type Output = Result<PathBuf>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let aborted = self.aborted;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) if aborted => Poll::Ready(Err(Error::Unknown(
                "unpack aborted before it settled".to_string(),
            ))),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::unknown())),
            Poll::Pending => Poll::Pending,
        }
    }
}
