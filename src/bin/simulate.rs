use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;

use portfolio_faq::simulation::simulate;
use portfolio_faq::{FaqSystem, Settings};

#[derive(Parser)]
#[command(name = "simulate", about = "Resolve a batch of questions and report which entries they hit")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "Config")]
    config: String,
    /// Questions, separated by commas or newlines. Read from stdin when omitted.
    questions: Vec<String>,
}

fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load configuration '{}'", cli.config))?;
    let system = FaqSystem::from_settings(&settings)?;

    let batch = if cli.questions.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read questions from stdin")?;
        buf
    } else {
        cli.questions.join("\n")
    };

    println!("{}", simulate(&system, &batch));
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error during simulation: {:?}", e);
        std::process::exit(1);
    }
}
