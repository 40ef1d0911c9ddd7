fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fall back to the bundled protoc when none is configured
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .compile_protos(&["proto/session_service.proto"], &["proto"])?;

    Ok(())
}
