use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dealdesk_cli::run().await
}
