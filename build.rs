//! Generates the management API bindings during `cargo build`.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the bundled protoc unless the environment points at one already.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    // The server side is only served by the loopback tests.
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(
            &[
                "proto/common/serial/typed_message.proto",
                "proto/common/protocol/headers.proto",
                "proto/common/protocol/user.proto",
                "proto/proxy/vmess/account.proto",
                "proto/app/proxyman/command/command.proto",
                "proto/app/stats/command/command.proto",
            ],
            &["proto"],
        )?;

    Ok(())
}
