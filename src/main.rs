use std::env;
use std::io::Read;

use imitate::{
    logger::{self, LoggerConfig},
    models::ImitateInput,
    pipeline, ImitateError, SdClient, SdConfig,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> imitate::Result<()> {
    // Environment may carry SD_BASE_URL, SD_PRESET and the filter knobs.
    let _ = dotenv::dotenv();

    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(logger::LogLevel::Info);
    if let Err(e) = logger::init_with_config(LoggerConfig::new().with_level(level)) {
        eprintln!("logger setup failed: {}", e);
    }

    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;

    let input: ImitateInput = serde_json::from_str(&raw).map_err(|e| {
        ImitateError::InvalidInput(format!("stdin is not a valid request document: {}", e))
    })?;

    log::debug!(
        "Read request: prompt {:?}, {} image(s) requested",
        input.prompt,
        input.amount
    );

    let config = SdConfig::from_env();
    let client = SdClient::new(&config);
    log::info!(
        "Using backend {} with {:?} preset",
        client.base_url(),
        config.preset
    );

    let results = pipeline::imitate(
        &client,
        &config,
        &input.prompt,
        &input.image_b64,
        input.amount,
    )
    .await?;

    // stdout carries exactly one JSON document: the processed batch.
    let document =
        serde_json::to_string(&results).map_err(|e| ImitateError::Encode(e.to_string()))?;
    println!("{}", document);

    log::info!("Wrote {} processed image(s)", results.len());
    Ok(())
}
