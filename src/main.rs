mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine, configuration falls back to defaults
    dotenvy::dotenv().ok();
    env_logger::init();

    cli::run().await
}
