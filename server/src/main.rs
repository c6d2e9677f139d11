use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use tts_core::{piper::PiperVoice, SpeechModel};
use tts_server::{build_app, config::ServerConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting TTS server...");

    let config = ServerConfig::from_env();
    info!(
        "Server configuration loaded: addr={}, model_config={}",
        config.bind_addr(),
        config.model_config.display()
    );

    // Device probing and model loading block; a failure here ends the process.
    let model_config = config.model_config.clone();
    let preference = config.device;
    let model = tokio::task::spawn_blocking(move || {
        let device = preference.resolve();
        tts_core::initialize(device, |device| {
            let voice = PiperVoice::load(&model_config, device)?;
            Ok(Box::new(voice) as Box<dyn SpeechModel>)
        })
    })
    .await
    .map_err(|e| anyhow::anyhow!("Model loader task failed: {e}"))??;

    let state = AppState::ready(model, config.model_name.clone());
    let app = build_app(state, &config);

    let addr: SocketAddr = config.bind_addr().parse()?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {addr}: {e}");
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
