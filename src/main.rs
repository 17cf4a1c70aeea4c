#[tokio::main]
async fn main() {
    if let Err(e) = taskpilot_lib::run().await {
        tracing::error!("taskpilot exited with error: {}", e);
        std::process::exit(1);
    }
}
