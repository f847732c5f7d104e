//! gRPC service implementation for simulated location streams.
//!
//! This module defines [`LocationStreamService`], the concrete implementation
//! of the [`LocationService`] gRPC service defined in `location.proto`. Each
//! `GetLocation` call gets its own session that walks a fresh copy of the
//! configured path and streams one point per step interval.
//!
//! ## Responsibilities
//!
//! - Validate incoming `GetLocation` requests.
//! - Spawn one session task per accepted call via [`feed_locations`].
//! - Cancel a session as soon as its client goes away.
//! - Stop every session on shutdown and wait for them, bounded by
//!   `SHUTDOWN_TIMEOUT`.

use crate::server::{
    config::{ServerConfig, StreamSettings},
    service::config::Generator,
    streaming::{
        coordinator::feed_locations,
        guard::CancelOnDrop,
        session::{SessionOutcome, StreamSession},
    },
    telemetry::{
        decrement_streams_inflight, increment_requests, increment_stream_errors,
        increment_streams_cancelled, increment_streams_inflight, record_points_per_stream,
        record_stream_duration,
    },
};
use core::pin::Pin;
use futures::TryStreamExt;
#[cfg(feature = "tracing")]
use portable_atomic::{AtomicU64, Ordering};
use roam_tonic_core::{
    Error,
    proto::{LocationRequest, UserLocation, location_service_server::LocationService},
    roam::PathGenerator,
};
use std::sync::Arc;
use tokio::{sync::mpsc, time::error::Elapsed};
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tonic::{Request, Response, Status};

/// gRPC service streaming simulated user locations.
///
/// Holds the path generator shared by every call, the per-stream settings,
/// and the bookkeeping needed to stop sessions: a service-wide shutdown
/// token and a tracker of running session tasks. Clones share all of it.
#[derive(Clone)]
pub struct LocationStreamService<G = Generator> {
    generator: Arc<G>,
    settings: StreamSettings,
    shutdown_token: CancellationToken,
    sessions: TaskTracker,
    /// Numbers sessions for their tracing spans.
    #[cfg(feature = "tracing")]
    next_session_id: Arc<AtomicU64>,
}

impl LocationStreamService {
    /// Creates a service that walks the configured scenario for every call.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_generator(config.scenario, config.stream)
    }
}

impl<G> LocationStreamService<G>
where
    G: PathGenerator,
{
    pub fn with_generator(generator: G, settings: StreamSettings) -> Self {
        Self {
            generator: Arc::new(generator),
            settings,
            shutdown_token: CancellationToken::new(),
            sessions: TaskTracker::new(),
            #[cfg(feature = "tracing")]
            next_session_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stops accepting calls and ends every running session.
    ///
    /// Running streams are terminated with `UNAVAILABLE`. Waits for the
    /// session tasks to exit, giving up after the configured shutdown
    /// timeout.
    pub async fn shutdown(&self) -> Result<(), Elapsed> {
        self.shutdown_token.cancel();
        self.sessions.close();

        let res = tokio::time::timeout(self.settings.shutdown_timeout, self.sessions.wait()).await;

        #[cfg(feature = "tracing")]
        match &res {
            Ok(()) => tracing::info!("All sessions stopped"),
            Err(_) => tracing::warn!(
                remaining = self.sessions.len(),
                "Timed out waiting for sessions to stop"
            ),
        }

        res
    }
}

#[tonic::async_trait]
impl<G> LocationService for LocationStreamService<G>
where
    G: PathGenerator + Send + Sync + 'static,
    G::Path: Send + 'static,
{
    type GetLocationStream = Pin<Box<dyn Stream<Item = Result<UserLocation, Status>> + Send>>;

    /// Streams the simulated path for one user.
    ///
    /// Rejects an empty `user_id` with `INVALID_ARGUMENT` and any call made
    /// after shutdown began with `UNAVAILABLE`. Otherwise emits every point of
    /// a fresh walk, one per step interval, and then completes normally.
    ///
    /// If `metrics` is enabled, emits telemetry for:
    /// - request rate
    /// - concurrent stream count
    /// - stream duration
    /// - cancelled streams and stream errors
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(user_id = %req.get_ref().user_id)))]
    async fn get_location(
        &self,
        req: Request<LocationRequest>,
    ) -> Result<Response<Self::GetLocationStream>, Status> {
        let user_id = req.into_inner().user_id;

        if user_id.is_empty() {
            increment_stream_errors();
            return Err(Error::missing_user_id().into());
        }

        if self.shutdown_token.is_cancelled() {
            increment_stream_errors();
            return Err(Error::ServiceShutdown.into());
        }

        increment_requests();
        increment_streams_inflight();

        #[cfg(feature = "tracing")]
        let span = {
            let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
            tracing::info_span!("session", id, %user_id)
        };

        let session = StreamSession::paced(self.generator.generate(), self.settings.step_interval);

        let (resp_tx, resp_rx) =
            mpsc::channel::<Result<UserLocation, Status>>(self.settings.stream_buffer_size);
        let cancel = CancellationToken::new();

        let fut = {
            let cancel = cancel.clone();
            let shutdown = self.shutdown_token.clone();
            async move {
                let started = session.started;
                let outcome = feed_locations(session, resp_tx, cancel, shutdown).await;

                #[cfg(feature = "tracing")]
                tracing::info!(
                    outcome = outcome.as_str(),
                    emitted = outcome.emitted(),
                    "Stream finished"
                );

                if !matches!(outcome, SessionOutcome::Completed { .. }) {
                    increment_streams_cancelled(outcome.as_str());
                }
                decrement_streams_inflight();
                record_points_per_stream(outcome.emitted() as f64);
                record_stream_duration(started.elapsed().as_millis() as f64);
            }
        };
        #[cfg(feature = "tracing")]
        let fut = {
            use tracing::Instrument;
            fut.instrument(span)
        };

        self.sessions.spawn(fut);

        let stream = ReceiverStream::new(resp_rx).inspect_err(|_e| {
            increment_stream_errors();
        });

        Ok(Response::new(Box::pin(CancelOnDrop::new(stream, cancel))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use futures::StreamExt;
    use roam_tonic_core::{
        proto::location_service_client::LocationServiceClient,
        proto::location_service_server::LocationServiceServer,
        roam::{Coordinate, PathRequest},
    };
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::{Code, transport::Server};

    const INTERVAL: Duration = Duration::from_millis(500);

    fn scenario(steps: usize) -> PathRequest {
        PathRequest::new(Coordinate::new(12.9177, 77.6238), 10.0, steps, 90.0)
    }

    fn service(steps: usize, step_interval: Duration) -> LocationStreamService {
        LocationStreamService::with_generator(
            scenario(steps),
            StreamSettings {
                step_interval,
                stream_buffer_size: 4,
                shutdown_timeout: Duration::from_secs(3),
            },
        )
    }

    fn request(user_id: &str) -> Request<LocationRequest> {
        Request::new(LocationRequest {
            user_id: user_id.to_string(),
        })
    }

    #[tokio::test]
    async fn rejects_empty_user_id() {
        let svc = service(5, INTERVAL);
        let status = svc.get_location(request("")).await.err().unwrap();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "user identifier is required");
        assert!(svc.sessions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn streams_the_whole_path_then_completes() {
        let svc = service(5, INTERVAL);
        let mut stream = svc.get_location(request("u1")).await.unwrap().into_inner();

        let mut received = Vec::new();
        while let Some(msg) = stream.next().await {
            received.push(Coordinate::from(msg.unwrap()));
        }
        assert_eq!(received, scenario(5).generate().collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn each_call_starts_its_own_walk() {
        let svc = service(4, INTERVAL);
        let mut a = svc.get_location(request("a")).await.unwrap().into_inner();
        let first_a = a.next().await.unwrap().unwrap();
        let second_a = a.next().await.unwrap().unwrap();

        let mut b = svc.get_location(request("b")).await.unwrap().into_inner();
        let first_b = b.next().await.unwrap().unwrap();

        assert_eq!(first_a, first_b);
        assert_ne!(second_a, first_b);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_steps_completes_immediately() {
        let svc = service(0, INTERVAL);
        let mut stream = svc.get_location(request("idle")).await.unwrap().into_inner();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_response_stops_the_session() {
        let svc = service(1500, INTERVAL);
        let mut stream = svc.get_location(request("leaver")).await.unwrap().into_inner();
        stream.next().await.unwrap().unwrap();
        drop(stream);

        svc.sessions.close();
        tokio::time::timeout(Duration::from_secs(1), svc.sessions.wait())
            .await
            .unwrap();
        assert!(svc.sessions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_running_streams_and_rejects_new_calls() {
        let svc = service(1500, INTERVAL);
        let mut stream = svc.get_location(request("rider")).await.unwrap().into_inner();
        stream.next().await.unwrap().unwrap();

        svc.shutdown().await.unwrap();

        let mut last = None;
        while let Some(msg) = stream.next().await {
            last = Some(msg);
        }
        assert_eq!(last.unwrap().unwrap_err().code(), Code::Unavailable);

        let status = svc.get_location(request("late")).await.err().unwrap();
        assert_eq!(status.code(), Code::Unavailable);
    }

    #[tokio::test]
    async fn serves_locations_over_grpc() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(
            Server::builder()
                .add_service(LocationServiceServer::new(service(3, Duration::from_millis(5))))
                .serve_with_incoming(TcpListenerStream::new(listener)),
        );

        let mut client = LocationServiceClient::connect(format!("http://{addr}"))
            .await
            .unwrap();

        let mut stream = client.get_location(request("e2e")).await.unwrap().into_inner();
        let mut received = Vec::new();
        while let Some(loc) = stream.message().await.unwrap() {
            received.push(Coordinate::from(loc));
        }
        assert_eq!(received, scenario(3).generate().collect::<Vec<_>>());

        let status = client.get_location(request("")).await.err().unwrap();
        assert_eq!(status.code(), Code::InvalidArgument);

        server.abort();
    }
}
