#![doc = include_str!("../README.md")]

mod server;

use anyhow::Context;
use clap::Parser;
use futures::Stream;
use roam_tonic_core::proto::{FILE_DESCRIPTOR_SET, location_service_server::LocationServiceServer};
use server::config::{CliArgs, Listen, ServerConfig};
use server::service::handler::LocationStreamService;
use server::telemetry::{TelemetryProviders, init_telemetry};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

type LocationServer = LocationServiceServer<LocationStreamService>;

const ENCODINGS: [CompressionEncoding; 3] = [
    CompressionEncoding::Zstd,
    CompressionEncoding::Gzip,
    CompressionEncoding::Deflate,
];

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = ServerConfig::try_from(CliArgs::parse())?;
    let providers = init_telemetry()?;
    let bind_failed = || format!("failed to bind {}", config.listen.address());

    match &config.listen {
        Listen::Tcp(addr) => {
            let listener = TcpListener::bind(addr).await.with_context(bind_failed)?;
            serve(TcpListenerStream::new(listener), &config, providers).await
        }
        #[cfg(unix)]
        Listen::Uds(path) => {
            use tokio::net::UnixListener;
            use tokio_stream::wrappers::UnixListenerStream;

            let listener = UnixListener::bind(path).with_context(bind_failed)?;
            let res = serve(UnixListenerStream::new(listener), &config, providers).await;
            // The socket file outlives the listener; a panic leaves it behind.
            let _ = std::fs::remove_file(path);
            res
        }
        #[cfg(not(unix))]
        Listen::Uds(_) => {
            anyhow::bail!("Unix domain sockets are not supported on this platform")
        }
    }
}

/// Runs the gRPC server on `incoming` until a termination signal arrives and
/// every session has been stopped.
async fn serve<I, IO, IE>(
    incoming: I,
    config: &ServerConfig,
    providers: TelemetryProviders,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    #[cfg(feature = "tracing")]
    tracing::info!(
        listen = config.listen.address(),
        steps = config.scenario.step_count,
        start = %config.scenario.start,
        interval = ?config.stream.step_interval,
        "Starting location service"
    );

    let service = LocationStreamService::new(config);

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter.set_serving::<LocationServer>().await;

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let location = ENCODINGS
        .into_iter()
        .fold(LocationServer::new(service.clone()), |server, encoding| {
            server.send_compressed(encoding).accept_compressed(encoding)
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Server::builder()
        // gRPC-web clients speak HTTP/1.1
        .accept_http1(true)
        .layer(ServiceBuilder::new().layer(cors).layer(GrpcWebLayer::new()))
        .add_service(health_service)
        .add_service(reflection)
        .add_service(location)
        .serve_with_incoming_shutdown(incoming, drain(service, health_reporter, providers))
        .await?;

    #[cfg(feature = "tracing")]
    tracing::info!("Location service stopped");
    Ok(())
}

/// Waits for SIGINT or SIGTERM. A signal that cannot be installed is never
/// delivered rather than treated as received.
async fn termination_signal() {
    let ctrl_c = async {
        if let Err(_e) = signal::ctrl_c().await {
            #[cfg(feature = "tracing")]
            tracing::error!("Cannot listen for Ctrl+C: {_e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Cannot listen for SIGTERM: {_e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Shutdown future handed to tonic: once a signal arrives, marks the service
/// as not serving, stops every session and flushes telemetry. tonic then
/// finishes the connections that remain.
async fn drain(
    service: LocationStreamService,
    health_reporter: HealthReporter,
    providers: TelemetryProviders,
) {
    termination_signal().await;

    #[cfg(feature = "tracing")]
    tracing::info!("Termination signal received, stopping sessions");

    health_reporter.set_not_serving::<LocationServer>().await;

    if let Err(_e) = service.shutdown().await {
        #[cfg(feature = "tracing")]
        tracing::error!("Sessions still running after shutdown timeout: {_e}");
    }

    providers.shutdown();
}
