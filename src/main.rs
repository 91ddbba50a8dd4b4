use anyhow::Context;
use clap::Parser;
use orbit_quiz::{logging, Config, Quiz};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let log_file = config.log_file();
    logging::init(&log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    info!("Starting orbit-quiz {}", env!("CARGO_PKG_VERSION"));

    let quiz = Quiz::from_config(&config).context("failed to set up the quiz")?;

    if let Err(e) = quiz.run().await {
        error!("Quiz stopped with an error: {}", e);
        return Err(e).context("error running quiz");
    }

    Ok(())
}
