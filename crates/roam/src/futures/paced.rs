use crate::{Coordinate, SleepProvider};
use core::{
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll, ready},
    time::Duration,
};
use futures::Stream;
use pin_project_lite::pin_project;

pin_project! {
    /// A [`Stream`] that releases the points of a path at a fixed cadence.
    ///
    /// The first point is produced as soon as the stream is polled. After
    /// each point the stream starts a sleep of `interval` and computes the
    /// next point only once that sleep completes, so every step follows the
    /// same cycle: compute, emit, wait. The wait after the final point also
    /// runs before the stream reports that it is finished.
    ///
    /// Dropping the stream at any point is the way to stop it early; no
    /// point is computed ahead of time, so nothing is lost or leaked.
    ///
    /// Construct one with [`PacedPathExt::paced`] or, on Tokio,
    /// `PacedPathTokioExt::paced_tokio`.
    #[must_use = "streams do nothing unless polled"]
    pub struct Paced<I, S>
    where
        S: SleepProvider,
    {
        path: I,
        interval: Duration,
        #[pin]
        pause: Option<S::Sleep>,
        _sleep: PhantomData<S>,
    }
}

impl<I, S> Paced<I, S>
where
    I: Iterator<Item = Coordinate>,
    S: SleepProvider,
{
    /// Wraps `path` so that consecutive points are `interval` apart.
    pub const fn new(path: I, interval: Duration) -> Self {
        Self {
            path,
            interval,
            pause: None,
            _sleep: PhantomData,
        }
    }

    /// The delay inserted after every point.
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl<I, S> Stream for Paced<I, S>
where
    I: Iterator<Item = Coordinate>,
    S: SleepProvider,
{
    type Item = Coordinate;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Coordinate>> {
        let mut this = self.project();

        if let Some(pause) = this.pause.as_mut().as_pin_mut() {
            ready!(pause.poll(cx));
            this.pause.set(None);
        }

        match this.path.next() {
            Some(point) => {
                this.pause.set(Some(S::sleep_for(*this.interval)));
                Poll::Ready(Some(point))
            }
            None => Poll::Ready(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.path.size_hint()
    }
}

/// Extension trait that turns any coordinate iterator into a [`Paced`]
/// stream.
pub trait PacedPathExt: Iterator<Item = Coordinate> + Sized {
    /// Emits the points of this path one `interval` apart, sleeping with `S`.
    fn paced<S>(self, interval: Duration) -> Paced<Self, S>
    where
        S: SleepProvider,
    {
        Paced::new(self, interval)
    }
}

impl<I> PacedPathExt for I where I: Iterator<Item = Coordinate> {}
