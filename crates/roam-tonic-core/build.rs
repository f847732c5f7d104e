/// Builds the gRPC client and server code for `proto/location.proto` using
/// `tonic-prost-build`.
///
/// Alongside the message and service modules, the encoded file descriptor set
/// is written to `OUT_DIR/location_descriptor.bin` so the server can expose
/// gRPC reflection.
///
/// # Output
///
/// Generated code is included in the crate via:
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("location");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let descriptor_path = out_dir.join("location_descriptor.bin");

    println!("cargo:rerun-if-changed=proto/location.proto");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure().compile_with_config(
        config,
        &["proto/location.proto"],
        &["proto"],
    )?;

    Ok(())
}
