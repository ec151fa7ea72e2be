use log::{error, info};

#[tokio::main]
async fn main() -> serverwatch::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("serverwatch=info,serenity=warn"),
    )
    .format_timestamp_millis()
    .init();
    info!("serverwatch {} starting", env!("CARGO_PKG_VERSION"));

    serverwatch::run()
        .await
        .inspect_err(|e| error!("Watcher stopped with an error: {e}"))?;

    info!("serverwatch stopped");
    Ok(())
}
