use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use taskvault::auth::{PasswordHasher, TokenIssuer};
use taskvault::config::Config;
use taskvault::routes;
use taskvault::session::SessionSettings;
use taskvault::store::UserStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    // The credential store is load-bearing: no users table, no server.
    // Session storage below is the opposite, it degrades instead of failing.
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    UserStore::ensure_schema(&pool)
        .await
        .expect("Failed to prepare users table");

    let session = SessionSettings::from_config(&config).await;
    log::info!(
        "session store selected: {} ({} mode)",
        session.store.backend_name(),
        config.environment.as_str()
    );

    let store = web::Data::new(UserStore::postgres(pool));
    let hasher = web::Data::new(PasswordHasher::new(config.bcrypt_cost));
    let issuer = web::Data::new(TokenIssuer::new(config.jwt_secret.as_bytes()));
    let session = web::Data::new(session);

    log::info!("starting server at http://{}", config.server_url());
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(store.clone())
            .app_data(hasher.clone())
            .app_data(issuer.clone())
            .app_data(session.clone())
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
