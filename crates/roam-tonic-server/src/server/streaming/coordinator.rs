use super::session::{SessionOutcome, StreamSession};
use crate::server::telemetry::increment_points_emitted;
use core::{pin::pin, time::Duration};
use futures::{Stream, StreamExt};
use roam_tonic_core::{Error, proto::UserLocation, roam::Coordinate};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;

/// How long a session keeps trying to hand its `UNAVAILABLE` status to a
/// client whose buffer is full when the server shuts down.
const SHUTDOWN_NOTICE_TIMEOUT: Duration = Duration::from_millis(100);

/// Drives one session: pulls points from its paced path and forwards them to
/// the client until the path ends, the client cancels, or the server shuts
/// down.
///
/// The loop suspends in two places: while the path waits out its pacing
/// interval, and while the response channel is full. Both suspensions race
/// against the client's token and the shutdown token, so a stalled reader
/// cannot keep a session alive past shutdown and no point is produced after
/// either token fires.
///
/// # Arguments
///
/// - `session`: The session to run. Its path yields points in step order.
/// - `resp_tx`: Channel feeding the gRPC response stream.
/// - `cancel`: Cancelled when the client drops the response stream.
/// - `shutdown`: Service-wide token cancelled when the server stops.
///
/// # Behavior
///
/// - Sends every point, in order, as an `Ok(UserLocation)`.
/// - On client cancellation or a closed channel, returns quietly without
///   sending an error.
/// - On shutdown, sends [`Error::ServiceShutdown`] as the last message,
///   waiting at most [`SHUTDOWN_NOTICE_TIMEOUT`] for buffer space.
/// - Dropping `resp_tx` on return closes the client's stream.
pub async fn feed_locations<P>(
    session: StreamSession<P>,
    resp_tx: mpsc::Sender<Result<UserLocation, Status>>,
    cancel: CancellationToken,
    shutdown: CancellationToken,
) -> SessionOutcome
where
    P: Stream<Item = Coordinate>,
{
    let mut path = pin!(session.path);
    let mut emitted = 0;

    loop {
        let next = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                notify_shutdown(&resp_tx).await;
                return SessionOutcome::Shutdown { emitted };
            }
            () = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Session cancelled by client");
                return SessionOutcome::Cancelled { emitted };
            }
            () = resp_tx.closed() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Response channel closed");
                return SessionOutcome::Cancelled { emitted };
            }
            next = path.next() => next,
        };

        let Some(point) = next else {
            return SessionOutcome::Completed { emitted };
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(step = emitted, %point, "Emitting location");

        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                notify_shutdown(&resp_tx).await;
                return SessionOutcome::Shutdown { emitted };
            }
            () = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Session cancelled by client while blocked on step {emitted}");
                return SessionOutcome::Cancelled { emitted };
            }
            res = resp_tx.send(Ok(point.into())) => {
                if res.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Client went away before step {emitted}");
                    return SessionOutcome::Cancelled { emitted };
                }
            }
        }

        emitted += 1;
        increment_points_emitted(1);
    }
}

/// Ends the client's stream with `UNAVAILABLE`, unless its buffer stays full
/// for longer than [`SHUTDOWN_NOTICE_TIMEOUT`].
async fn notify_shutdown(resp_tx: &mpsc::Sender<Result<UserLocation, Status>>) {
    #[cfg(feature = "tracing")]
    tracing::debug!("Session interrupted by shutdown");

    let notice = resp_tx.send(Err(Error::ServiceShutdown.into()));
    match tokio::time::timeout(SHUTDOWN_NOTICE_TIMEOUT, notice).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Client gone before the shutdown status was sent");
        }
        Err(_) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Response buffer still full, dropping the shutdown status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roam_tonic_core::roam::{PathGenerator, PathRequest};
    use tokio::time::Instant;
    use tonic::Code;

    const INTERVAL: Duration = Duration::from_millis(500);

    fn scenario(steps: usize) -> PathRequest {
        PathRequest::new(Coordinate::new(12.9177, 77.6238), 10.0, steps, 90.0)
    }

    fn spawn_session(
        steps: usize,
        buffer: usize,
    ) -> (
        mpsc::Receiver<Result<UserLocation, Status>>,
        CancellationToken,
        CancellationToken,
        tokio::task::JoinHandle<SessionOutcome>,
    ) {
        let (tx, rx) = mpsc::channel(buffer);
        let cancel = CancellationToken::new();
        let shutdown = CancellationToken::new();
        let session = StreamSession::paced(scenario(steps).generate(), INTERVAL);
        let handle = tokio::spawn(feed_locations(session, tx, cancel.clone(), shutdown.clone()));
        (rx, cancel, shutdown, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_every_point_in_order_then_closes() {
        let (mut rx, _cancel, _shutdown, handle) = spawn_session(6, 1);

        let mut received = Vec::new();
        while let Some(msg) = rx.recv().await {
            received.push(Coordinate::from(msg.unwrap()));
        }

        assert_eq!(received, scenario(6).generate().collect::<Vec<_>>());
        assert_eq!(handle.await.unwrap(), SessionOutcome::Completed { emitted: 6 });
    }

    #[tokio::test(start_paused = true)]
    async fn points_are_paced_by_the_interval() {
        let (mut rx, _cancel, _shutdown, _handle) = spawn_session(3, 1);

        let t0 = Instant::now();
        rx.recv().await.unwrap().unwrap();
        let first = t0.elapsed();
        rx.recv().await.unwrap().unwrap();
        let second = t0.elapsed();

        assert!(first < Duration::from_millis(10), "{first:?}");
        assert!(second - first >= INTERVAL - Duration::from_millis(1), "{second:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_steps_closes_without_points() {
        let (mut rx, _cancel, _shutdown, handle) = spawn_session(0, 1);
        assert!(rx.recv().await.is_none());
        assert_eq!(handle.await.unwrap(), SessionOutcome::Completed { emitted: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_further_points() {
        let (mut rx, cancel, _shutdown, handle) = spawn_session(1500, 1);

        for _ in 0..3 {
            rx.recv().await.unwrap().unwrap();
        }
        cancel.cancel();

        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, SessionOutcome::Cancelled { .. }), "{outcome:?}");

        // Whatever was already buffered is all there is; nothing follows it.
        let mut trailing = 0;
        while let Some(msg) = rx.recv().await {
            assert!(msg.is_ok());
            trailing += 1;
        }
        assert_eq!(outcome.emitted(), 3 + trailing);
        assert!(outcome.emitted() < 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_receiver_counts_as_cancellation() {
        let (mut rx, _cancel, _shutdown, handle) = spawn_session(1500, 1);
        rx.recv().await.unwrap().unwrap();
        drop(rx);

        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, SessionOutcome::Cancelled { .. }), "{outcome:?}");
        assert!(outcome.emitted() <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_the_stream_with_unavailable() {
        let (mut rx, _cancel, shutdown, handle) = spawn_session(1500, 1);
        rx.recv().await.unwrap().unwrap();
        shutdown.cancel();

        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, SessionOutcome::Shutdown { .. }), "{outcome:?}");

        let mut last = None;
        while let Some(msg) = rx.recv().await {
            last = Some(msg);
        }
        let status = last.unwrap().unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sessions_do_not_interfere() {
        let (mut rx_a, cancel_a, _sa, handle_a) = spawn_session(5, 1);
        let (mut rx_b, _cb, _sb, handle_b) = spawn_session(5, 1);

        rx_a.recv().await.unwrap().unwrap();
        cancel_a.cancel();

        let mut received = Vec::new();
        while let Some(msg) = rx_b.recv().await {
            received.push(Coordinate::from(msg.unwrap()));
        }
        assert_eq!(received, scenario(5).generate().collect::<Vec<_>>());
        assert_eq!(handle_b.await.unwrap(), SessionOutcome::Completed { emitted: 5 });
        assert!(matches!(
            handle_a.await.unwrap(),
            SessionOutcome::Cancelled { .. }
        ));
    }

    // A client that never reads: after a few intervals the channel is full and
    // the session is parked in `send` with the next point in hand.
    async fn stall_on_full_buffer() {
        tokio::time::sleep(INTERVAL * 10).await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_reaches_a_session_blocked_on_a_full_channel() {
        let (rx, _cancel, shutdown, handle) = spawn_session(1500, 2);
        stall_on_full_buffer().await;

        shutdown.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("session must stop on shutdown")
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Shutdown { emitted: 2 });
        drop(rx);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_reaches_a_session_blocked_on_a_full_channel() {
        let (rx, cancel, _shutdown, handle) = spawn_session(1500, 2);
        stall_on_full_buffer().await;

        cancel.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("session must stop on cancellation")
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Cancelled { emitted: 2 });
        drop(rx);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_status_follows_buffered_points_once_the_client_reads() {
        let (mut rx, _cancel, shutdown, handle) = spawn_session(1500, 1);
        stall_on_full_buffer().await;

        shutdown.cancel();

        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }

        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_ok());
        assert_eq!(messages[1].as_ref().unwrap_err().code(), Code::Unavailable);
        assert_eq!(handle.await.unwrap(), SessionOutcome::Shutdown { emitted: 1 });
    }
}
