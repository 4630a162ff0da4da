use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use murmur_auth::config::AuthConfig;
use murmur_auth::infra::mailer::{MailQueue, SmtpMailTransport, run_mail_worker};
use murmur_auth::router::build_router;
use murmur_auth::state::AppState;
use murmur_auth::usecase::claims::resolve_strategy;

#[tokio::main]
async fn main() {
    murmur_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let transport = SmtpMailTransport::from_config(&config).expect("invalid SMTP configuration");
    let (mailer, mail_rx) = MailQueue::new(config.mail_queue_depth);
    tokio::spawn(run_mail_worker(transport, mail_rx, config.mail_max_retries));

    let claims = resolve_strategy(&config.claims_strategy)
        .unwrap_or_else(|| panic!("unknown CLAIMS_STRATEGY: {}", config.claims_strategy));

    let auth_port = config.auth_port;
    let state = AppState {
        db,
        redis,
        mailer,
        config: Arc::new(config),
        claims,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{auth_port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
