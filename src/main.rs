use std::env;
use std::fs;

use hfgen::{CredentialResolver, GenerationRequest, HfClient, HfConfig, ImageSize};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    hfgen::logger::init_with_config(
        hfgen::logger::LoggerConfig::development().with_level(hfgen::logger::LogLevel::Debug),
    )?;

    let config = HfConfig::from_env();
    hfgen::logger::log_startup_info("hfgen", env!("CARGO_PKG_VERSION"), &config.model_id);

    // Fail fast: without a token there is nothing to do.
    let token = match CredentialResolver::new().resolve() {
        Ok(token) => {
            log::info!("✅ Hugging Face token resolved");
            token
        }
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let client = HfClient::new(config.with_token(token))?;

    let args: Vec<String> = env::args().skip(1).collect();
    let prompt = if args.is_empty() {
        "a brick-built western-style streetscape with gas lamps and rickshaws, \
         Meiji era Japan, highly detailed, cinematic lighting"
            .to_string()
    } else {
        args.join(" ")
    };

    log::info!("🎨 Generating image for prompt: {}", prompt);

    let request = GenerationRequest::new(prompt)?
        .with_negative_prompt("low quality, blurry, deformed, extra fingers")
        .with_steps(30)
        .with_guidance(7.0)
        .with_size(ImageSize::S1024);

    let generation_timer = hfgen::logger::timer("image generation");

    match client.image().generate(&request, 4).await {
        Ok(image_bytes) => {
            generation_timer.stop();
            log::info!("✅ Image generated, {} bytes", image_bytes.len());

            let filename = format!("generated_image_{}.png", chrono::Utc::now().timestamp());
            match fs::write(&filename, &image_bytes) {
                Ok(_) => log::info!("💾 Image saved to: {}", filename),
                Err(e) => log::error!("❌ Failed to save image: {}", e),
            }
        }
        Err(e) => {
            log::error!("❌ Image generation failed: {}", e);
            log::warn!("💡 If the model is busy, wait a while and try again");
            return Err(e.into());
        }
    }

    Ok(())
}
