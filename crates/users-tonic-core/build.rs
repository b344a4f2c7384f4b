/// Builds the gRPC client and server code for the `users.proto` definition
/// using `tonic-prost-build`.
///
/// The Protocol Buffer definitions in `proto/` are compiled into Rust modules
/// with gRPC bindings emitted into the crate's `OUT_DIR`. A serialized
/// `FileDescriptorSet` is written alongside them so the server can expose
/// gRPC reflection.
///
/// # Files and Paths
///
/// - Proto file: `proto/users.proto`
/// - Includes: `proto/`
/// - Descriptor set: `$OUT_DIR/users_descriptor.bin`
///
/// # Panics
///
/// Panics if code generation fails or `OUT_DIR` is unset.
///
/// # Output
///
/// Generated code is included in the crate via:
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("users");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("users_descriptor.bin");

    println!("cargo:rerun-if-changed=proto/users.proto");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/users.proto"], &["proto"])
        .unwrap();
}
