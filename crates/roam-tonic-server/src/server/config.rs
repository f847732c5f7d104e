use anyhow::{Context, bail};
use clap::Parser;
use core::time::Duration;
use roam_tonic_core::{
    roam::{Coordinate, PathRequest},
    types::{
        DEFAULT_BEARING_DEGREES, DEFAULT_PORT, DEFAULT_START, DEFAULT_STEP_COUNT,
        DEFAULT_STEP_INTERVAL, DEFAULT_TOTAL_DISTANCE_KM,
    },
};

/// Runtime configuration for the `location-server` binary.
///
/// Options fall into two groups: where to listen, and which path every
/// stream simulates. All values are parsed from CLI arguments or environment
/// variables; the defaults reproduce the stock scenario (10 km due east of
/// Silk Board, Bangalore, in 1500 steps of 500 ms).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "location-server",
    version,
    about = "A gRPC service streaming simulated user locations"
)]
pub struct CliArgs {
    /// Host or IP address to bind.
    ///
    /// Environment variable: `HOST`
    #[arg(long, env = "HOST", default_value_t = String::from("0.0.0.0"))]
    pub host: String,

    /// TCP port to listen on.
    ///
    /// Environment variable: `PORT`
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Listen on this Unix socket path instead of TCP.
    ///
    /// Environment variable: `UDS_PATH`
    #[arg(long, env = "UDS_PATH")]
    pub uds_path: Option<String>,

    /// Latitude of the first point's origin, in degrees.
    ///
    /// Environment variable: `START_LATITUDE`
    #[arg(long, env = "START_LATITUDE", allow_negative_numbers = true, default_value_t = DEFAULT_START.latitude)]
    pub start_latitude: f64,

    /// Longitude of the first point's origin, in degrees.
    ///
    /// Environment variable: `START_LONGITUDE`
    #[arg(long, env = "START_LONGITUDE", allow_negative_numbers = true, default_value_t = DEFAULT_START.longitude)]
    pub start_longitude: f64,

    /// Length of the simulated path, in kilometres.
    ///
    /// Environment variable: `TOTAL_DISTANCE_KM`
    #[arg(long, env = "TOTAL_DISTANCE_KM", default_value_t = DEFAULT_TOTAL_DISTANCE_KM)]
    pub total_distance_km: f64,

    /// Number of points each stream emits.
    ///
    /// A value of `0` makes every stream close immediately without points.
    ///
    /// Environment variable: `STEP_COUNT`
    #[arg(long, env = "STEP_COUNT", default_value_t = DEFAULT_STEP_COUNT)]
    pub step_count: usize,

    /// Compass direction of travel: 0 is north, 90 is east.
    ///
    /// Environment variable: `BEARING_DEGREES`
    #[arg(long, env = "BEARING_DEGREES", default_value_t = DEFAULT_BEARING_DEGREES)]
    pub bearing_degrees: f64,

    /// Delay between consecutive points, in milliseconds.
    ///
    /// Environment variable: `STEP_INTERVAL_MS`
    #[arg(long, env = "STEP_INTERVAL_MS", default_value_t = DEFAULT_STEP_INTERVAL.as_millis() as u64)]
    pub step_interval_ms: u64,

    /// Fold longitudes into [-180, 180) when a path crosses the antimeridian.
    ///
    /// Environment variable: `WRAP_LONGITUDE`
    #[arg(long, env = "WRAP_LONGITUDE", default_value_t = false)]
    pub wrap_longitude: bool,

    /// Capacity of the channel between a session and its gRPC response.
    ///
    /// Points are produced slowly, so a small buffer is enough to absorb
    /// network jitter without letting a stalled client queue up a backlog.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 4)]
    pub stream_buffer_size: usize,

    /// Seconds to wait for running streams to finish during shutdown.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

/// Where the server accepts connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listen {
    Tcp(String),
    Uds(String),
}

impl Listen {
    pub fn address(&self) -> &str {
        match self {
            Self::Tcp(addr) | Self::Uds(addr) => addr,
        }
    }
}

/// Per-stream tuning shared by every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub step_interval: Duration,
    pub stream_buffer_size: usize,
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: Listen,
    pub scenario: PathRequest,
    pub stream: StreamSettings,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        let start = Coordinate::new(args.start_latitude, args.start_longitude);
        let scenario = PathRequest::try_new(
            start,
            args.total_distance_km,
            args.step_count,
            args.bearing_degrees,
        )
        .context("invalid simulation scenario")?
        .with_wrapped_longitude(args.wrap_longitude);

        let listen = match args.uds_path {
            Some(path) => Listen::Uds(path),
            None => Listen::Tcp(format!("{}:{}", args.host, args.port)),
        };

        Ok(Self {
            listen,
            scenario,
            stream: StreamSettings {
                step_interval: Duration::from_millis(args.step_interval_ms),
                stream_buffer_size: args.stream_buffer_size,
                shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roam_tonic_core::types::DEFAULT_SCENARIO;

    fn parse(args: &[&str]) -> anyhow::Result<ServerConfig> {
        let argv = core::iter::once("location-server").chain(args.iter().copied());
        ServerConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn defaults_reproduce_the_stock_scenario() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.scenario, DEFAULT_SCENARIO);
        assert_eq!(config.listen, Listen::Tcp("0.0.0.0:9000".to_string()));
        assert_eq!(config.stream.step_interval, Duration::from_millis(500));
        assert_eq!(config.stream.stream_buffer_size, 4);
        assert_eq!(config.stream.shutdown_timeout, Duration::from_secs(3));
    }

    #[test]
    fn overrides_apply_to_the_scenario() {
        let config = parse(&[
            "--start-latitude",
            "-33.8688",
            "--start-longitude",
            "151.2093",
            "--total-distance-km",
            "2.5",
            "--step-count",
            "10",
            "--bearing-degrees",
            "270",
            "--step-interval-ms",
            "20",
            "--wrap-longitude",
            "--port",
            "50051",
        ])
        .unwrap();

        assert_eq!(config.scenario.start, Coordinate::new(-33.8688, 151.2093));
        assert_eq!(config.scenario.total_distance_km, 2.5);
        assert_eq!(config.scenario.step_count, 10);
        assert_eq!(config.scenario.bearing_degrees, 270.0);
        assert!(config.scenario.wrap_longitude);
        assert_eq!(config.stream.step_interval, Duration::from_millis(20));
        assert_eq!(config.listen.address(), "0.0.0.0:50051");
    }

    #[test]
    fn uds_path_replaces_tcp() {
        let config = parse(&["--uds-path", "/tmp/location.sock"]).unwrap();
        assert_eq!(config.listen, Listen::Uds("/tmp/location.sock".to_string()));
    }

    #[test]
    fn rejects_invalid_scenarios() {
        assert!(parse(&["--start-latitude", "95"]).is_err());
        assert!(parse(&["--start-longitude", "-181"]).is_err());
        assert!(parse(&["--total-distance-km", "-1"]).is_err());
        assert!(parse(&["--bearing-degrees", "360"]).is_err());
        assert!(parse(&["--stream-buffer-size", "0"]).is_err());
    }

    #[test]
    fn non_numeric_port_is_a_parse_error() {
        assert!(CliArgs::try_parse_from(["location-server", "--port", "http"]).is_err());
    }
}
