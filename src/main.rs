use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

use portfolio_faq::server::{self, AppState};
use portfolio_faq::{FaqSystem, Settings};

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load("Config").context("Failed to load Config.toml")?;
    let system = FaqSystem::from_settings(&settings).context("Failed to initialise the FAQ engine")?;
    log::info!(
        "Initializing conversational FAQ system with {} entries and {} intents...",
        system.catalogue().len(),
        system.resolver().intents().rules().len()
    );

    let data = web::Data::new(AppState::new(
        system,
        settings.logic.history_capacity,
        settings.server.max_sessions,
    ));
    let host = settings.server.host.clone();
    let port = settings.server.port;

    log::info!("Starting server at http://{}:{}", host, port);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(server::routes))
        .bind((host, port))?
        .run()
        .await?;
    Ok(())
}
