//! Run a prediction and poll it to completion
//!
//! ## Usage
//!
//! ```bash
//! export REPLICATE_API_TOKEN=r8_...
//! cargo run --example predict --features trace -- stability-ai/sdxl "an astronaut riding a horse"
//! ```

use replicate::prelude::*;
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let identifier = args.next().unwrap_or_else(|| "stability-ai/sdxl".to_string());
    let prompt = args.next().unwrap_or_else(|| "an astronaut riding a horse".to_string());

    let client = Client::from_env()?;
    let model = client.retrieve_model(&identifier).await?;
    let Some(version) = model.latest_version() else {
        return Err(format!("{identifier} has no published version").into());
    };

    let mut prediction = version.predict(json!({ "prompt": prompt }), None).await?;
    println!("Started prediction {:?}", prediction.id());

    while !prediction.is_finished() {
        tokio::time::sleep(Duration::from_secs(1)).await;
        prediction.refetch().await?;
        println!("{}", prediction.status_description());
    }

    match prediction.output() {
        Some(output) => println!("{}", serde_json::to_string_pretty(output)?),
        None => println!("No output: {:?}", prediction.error()),
    }
    Ok(())
}
