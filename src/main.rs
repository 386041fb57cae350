use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use classify_gateway::config::GatewayConfig;
use classify_gateway::handlers::AppState;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env()?;
    let bind = (config.host.clone(), config.port);
    info!(
        upstream = %config.upstream_url,
        max_upload_bytes = config.max_upload_bytes,
        "Server running at http://{}:{}",
        bind.0,
        bind.1
    );
    let state = web::Data::new(AppState::new(config)?);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(classify_gateway::routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
