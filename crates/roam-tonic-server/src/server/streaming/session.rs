use roam_tonic_core::roam::{Coordinate, Paced, PacedPathTokioExt, TokioSleep};
use std::time::Instant;

/// The per-call state of one location stream.
///
/// A session is created for every accepted request and owns its path
/// outright: the running position and remaining step count live inside
/// `path` and are never shared with another call. The session is consumed by
/// [`feed_locations`](super::coordinator::feed_locations) and dropped when
/// the stream ends for any reason. Who the session belongs to is recorded on
/// the tracing span it runs in, not here.
pub struct StreamSession<P> {
    pub path: P,
    pub started: Instant,
}

impl<I> StreamSession<Paced<I, TokioSleep>>
where
    I: Iterator<Item = Coordinate>,
{
    /// Starts a session that releases one point of `path` every `interval`.
    pub fn paced(path: I, interval: core::time::Duration) -> Self {
        Self {
            path: path.paced_tokio(interval),
            started: Instant::now(),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every point of the path was delivered.
    Completed { emitted: usize },
    /// The client went away or cancelled; no further points were produced.
    Cancelled { emitted: usize },
    /// The server began shutting down while the session was running.
    Shutdown { emitted: usize },
}

impl SessionOutcome {
    /// Number of points handed to the response channel.
    pub const fn emitted(&self) -> usize {
        match *self {
            Self::Completed { emitted } | Self::Cancelled { emitted } | Self::Shutdown { emitted } => {
                emitted
            }
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Cancelled { .. } => "cancelled",
            Self::Shutdown { .. } => "shutdown",
        }
    }
}
