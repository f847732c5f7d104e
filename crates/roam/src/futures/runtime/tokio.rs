use crate::{Coordinate, Paced, PacedPathExt, SleepProvider};
use core::time::Duration;

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for paced paths in Tokio applications. The
/// sleep honours `tokio::time::pause`, so paced streams can be tested with a
/// virtual clock.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    type Sleep = tokio::time::Sleep;

    fn sleep_for(dur: Duration) -> Self::Sleep {
        tokio::time::sleep(dur)
    }
}

/// Extension trait for pacing a path with the
/// [`tokio`](https://docs.rs/tokio) timer.
///
/// Saves naming [`TokioSleep`] at every call site.
pub trait PacedPathTokioExt: Iterator<Item = Coordinate> + Sized {
    /// Wraps the path in a [`Paced`] stream driven by [`TokioSleep`].
    fn paced_tokio(self, interval: Duration) -> Paced<Self, TokioSleep>;
}

impl<I> PacedPathTokioExt for I
where
    I: Iterator<Item = Coordinate>,
{
    fn paced_tokio(self, interval: Duration) -> Paced<Self, TokioSleep> {
        self.paced::<TokioSleep>(interval)
    }
}
