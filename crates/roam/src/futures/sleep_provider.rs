use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// [`Paced`](crate::Paced) uses it to wait between points, which keeps the
/// stream independent of any particular runtime's timer.
pub trait SleepProvider {
    /// We require `Send` so that a paced stream can move across threads.
    type Sleep: Future<Output = ()> + Send;

    fn sleep_for(dur: Duration) -> Self::Sleep;
}
