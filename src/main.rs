use std::io;

use dotenvy::dotenv;
use order_analytics::{build_server, create_pool, postgres_service, run_migrations, Settings};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&settings.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let ranges: Vec<&str> = settings.analytics.date_ranges.tokens().collect();
    log::info!(
        "Date ranges available to analytics: {}",
        if ranges.is_empty() { "none".to_string() } else { ranges.join(", ") }
    );
    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    build_server(postgres_service(pool, &settings), &settings.host, settings.port)?.await
}
