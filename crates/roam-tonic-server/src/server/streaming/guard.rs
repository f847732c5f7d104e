use core::{
    pin::Pin,
    task::{Context, Poll},
};
use futures::Stream;
use pin_project_lite::pin_project;
use tokio_util::sync::{CancellationToken, DropGuard};

pin_project! {
    /// A response stream that cancels its session when tonic drops it.
    ///
    /// tonic drops the response body when the client disconnects or cancels
    /// the call. Holding a [`DropGuard`] here turns that drop into a
    /// cancellation the session loop can observe at its next suspension
    /// point.
    pub struct CancelOnDrop<S> {
        #[pin]
        inner: S,
        _guard: DropGuard,
    }
}

impl<S> CancelOnDrop<S> {
    pub fn new(inner: S, token: CancellationToken) -> Self {
        Self {
            inner,
            _guard: token.drop_guard(),
        }
    }
}

impl<S: Stream> Stream for CancelOnDrop<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        self.project().inner.poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn dropping_the_stream_cancels_the_token() {
        let token = CancellationToken::new();
        let mut stream = CancelOnDrop::new(futures::stream::iter([1, 2]), token.clone());

        assert_eq!(stream.next().await, Some(1));
        assert!(!token.is_cancelled());

        drop(stream);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn exhausting_the_stream_does_not_cancel() {
        let token = CancellationToken::new();
        let stream = CancelOnDrop::new(futures::stream::iter([1, 2, 3]), token.clone());
        let mut stream = Box::pin(stream);
        let mut seen = Vec::new();
        while let Some(v) = stream.next().await {
            seen.push(v);
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(!token.is_cancelled());
    }
}
