use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use slog::{info, warn};

use co2_survey::config::Settings;
use co2_survey::db::{Db, MemoryDb, PgDb};
use co2_survey::environment::Environment;
use co2_survey::log::initialize_logger;
use co2_survey::render::HtmlRenderer;
use co2_survey::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;
    let logger = initialize_logger(settings.log_level);

    info!(logger, "Starting..."; "main_port" => settings.port, "admin_port" => settings.admin_port);
    let logger = Arc::new(logger);

    let db: Arc<dyn Db + Send + Sync> = match &settings.database_url {
        Some(url) => {
            info!(logger, "Creating database pool...");
            let pool = sqlx::PgPool::connect(url).await?;
            let db = PgDb::new(pool);
            db.initialize().await?;
            Arc::new(db)
        }
        None => {
            warn!(logger, "DATABASE_URL is not set; submissions will not outlive this process");
            Arc::new(MemoryDb::new())
        }
    };

    let environment = Environment::new(logger.clone(), db, Arc::new(HtmlRenderer));

    let should_terminate = async {
        tokio::signal::ctrl_c().await.ok();
    }
    .shared();

    let main_server = {
        let should_terminate = should_terminate.clone();
        let routes = routes::make_routes(environment.clone());

        let (_, main_server) = warp::serve(routes)
            .bind_with_graceful_shutdown(([0, 0, 0, 0], settings.port), should_terminate);

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let routes = routes::admin::make_healthz_route(environment);

        let (_, admin_server) = warp::serve(routes)
            .bind_with_graceful_shutdown(([0, 0, 0, 0], settings.admin_port), should_terminate);

        admin_server
    };

    tokio::join!(main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
