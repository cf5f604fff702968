use hfgen::{CredentialResolver, GenerationRequest, HfClient, HfConfig, ImageSize};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    hfgen::logger::init()?;

    let token = CredentialResolver::new().resolve()?;
    let config = HfConfig::new()
        .with_model("stabilityai/stable-diffusion-xl-base-1.0")
        .with_token(token);
    let client = HfClient::new(config)?;

    let request = GenerationRequest::new("a serene mountain lake at sunset, digital art")?
        .with_steps(30)
        .with_guidance(7.0)
        .with_size(ImageSize::S768)
        .with_seed(1234);

    let image_bytes = client.image().generate(&request, 3).await?;
    std::fs::write("generated.png", &image_bytes)?;
    println!("saved generated.png ({} bytes)", image_bytes.len());

    Ok(())
}
