#[tokio::main]
async fn main() -> megai::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("megai=info,serenity=warn"),
    )
    .init();
    log::info!("Starting megai Discord bot");

    match megai::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
