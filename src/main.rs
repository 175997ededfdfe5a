use chrono::Duration;
use dotenvy::dotenv;
use marketplace_service::{build_server, create_pool, run_migrations, AppConfig, TokenService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().expect("Invalid configuration");

    let pool = create_pool(&config.database_url, config.database_pool_size)
        .expect("Failed to create database pool");
    run_migrations(&pool).expect("Failed to run database migrations");

    let tokens = TokenService::new(&config.jwt_secret, Duration::hours(config.token_ttl_hours));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(pool, tokens, &config.host, config.port)?.await
}
