use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use crate::{
    config::{load_aws_clients, AppConfig, Environment},
    database,
    demo::DemoStore,
    error::Result,
    routes,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub ses_client: aws_sdk_sesv2::Client,
    pub s3_client: aws_sdk_s3::Client,
    pub demo: Arc<DemoStore>,
    pub environment: Environment,
    pub s3_bucket: String,
    pub assets_url: String,
    pub sender_email: String,
    pub admin_email: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub frontend_url: String,
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;
    database::seed_admin(&pool, &config.auth).await?;

    let aws = load_aws_clients().await?;

    let state = AppState {
        db: pool,
        ses_client: aws.ses,
        s3_client: aws.s3,
        demo: Arc::new(DemoStore::new()),
        environment: config.environment,
        s3_bucket: config.s3.bucket.clone(),
        assets_url: config.s3.assets_url.clone(),
        sender_email: config.mail.sender.clone(),
        admin_email: config.auth.admin_email.clone(),
        stripe_secret_key: config.stripe.secret_key.clone(),
        stripe_webhook_secret: config.stripe.webhook_secret.clone(),
        frontend_url: config.frontend_url.clone(),
    };

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                crate::error::AppError::ConfigError(format!("Invalid CORS origin: {}", origin))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_origin(allowed_origins);

    let app = routes::create_router()
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors)
        .with_state(state);

    Ok(app)
}
