use roam_tonic_core::roam::PathRequest;

/// Path generator every session walks by default.
///
/// One instance is built from the server configuration at startup and
/// shared read-only by all sessions; each call to `generate` starts a fresh,
/// independent walk.
pub type Generator = PathRequest;
