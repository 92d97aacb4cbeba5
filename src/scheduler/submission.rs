//! Future returned by `BatchEngine::submit`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use super::error::BatchError;
use super::pending::ResponseRx;

/// Completes exactly once with the item's value or terminal error.
///
/// Enqueueing happens when `submit` is called, not when this is polled.
#[must_use = "a submission does nothing to the caller unless awaited"]
pub struct Submission<V, R> {
    state: SubmissionState<V, R>,
}

enum SubmissionState<V, R> {
    Waiting(ResponseRx<V, R>),
    Ready(Option<Result<V, BatchError<R>>>),
}

// The receiver is Unpin and the ready value is only ever moved out whole.
impl<V, R> Unpin for Submission<V, R> {}

impl<V, R> Submission<V, R> {
    pub(crate) fn waiting(rx: ResponseRx<V, R>) -> Self {
        Self { state: SubmissionState::Waiting(rx) }
    }

    pub(crate) fn failed(error: BatchError<R>) -> Self {
        Self { state: SubmissionState::Ready(Some(Err(error))) }
    }
}

impl<V, R> Future for Submission<V, R> {
    type Output = Result<V, BatchError<R>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            SubmissionState::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                // Sender dropped without a result: the engine went away.
                Poll::Ready(Err(_)) => Poll::Ready(Err(BatchError::EngineStopped)),
                Poll::Pending => Poll::Pending,
            },
            SubmissionState::Ready(result) => {
                Poll::Ready(result.take().unwrap_or(Err(BatchError::EngineStopped)))
            }
        }
    }
}

impl<V, R> std::fmt::Debug for Submission<V, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            SubmissionState::Waiting(_) => "waiting",
            SubmissionState::Ready(_) => "ready",
        };
        f.debug_struct("Submission").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn failed_submission_is_immediately_ready() {
        let submission: Submission<u32, String> = Submission::failed(BatchError::EngineStopped);
        assert_eq!(tokio_test::block_on(submission), Err(BatchError::EngineStopped));
    }

    #[test]
    fn waits_for_sender() {
        let (tx, rx) = oneshot::channel();
        let mut task = tokio_test::task::spawn(Submission::<u32, String>::waiting(rx));
        tokio_test::assert_pending!(task.poll());

        tx.send(Ok(3)).unwrap();
        assert!(task.is_woken());
        tokio_test::assert_ready_eq!(task.poll(), Ok(3));
    }

    #[test]
    fn dropped_sender_reads_as_stopped() {
        let (tx, rx) = oneshot::channel::<Result<u32, BatchError<String>>>();
        drop(tx);
        let submission = Submission::waiting(rx);
        assert_eq!(tokio_test::block_on(submission), Err(BatchError::EngineStopped));
    }
}
