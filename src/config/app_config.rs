use crate::error::{AppError, Result};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Staging,
    Main,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub stripe: StripeConfig,
    pub s3: S3Config,
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub admin_email: String,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub assets_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let allowed_origins: Vec<String> = env::var("FRONTEND_URL")?
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let frontend_url = allowed_origins
            .first()
            .cloned()
            .ok_or_else(|| AppError::ConfigError("FRONTEND_URL is empty".to_string()))?;

        Ok(Self {
            environment: match env::var("APP_ENV").as_deref() {
                Ok("main") => Environment::Main,
                _ => Environment::Staging,
            },
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid PORT value".to_string()))?,
                max_body_size: env::var("MAX_BODY_SIZE")
                    .unwrap_or_else(|_| "10485760".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid MAX_BODY_SIZE value".to_string()))?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::ConfigError("Invalid DB_MAX_CONNECTIONS value".to_string())
                    })?,
            },
            cors: CorsConfig { allowed_origins },
            auth: AuthConfig {
                admin_email: env::var("ADMIN_EMAIL")?,
                admin_password: env::var("ADMIN_PASSWORD").ok(),
            },
            mail: MailConfig {
                sender: env::var("MAIL_SENDER")?,
            },
            stripe: StripeConfig {
                secret_key: env::var("STRIPE_SECRET_KEY")?,
                webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")?,
            },
            s3: S3Config {
                bucket: env::var("S3_BUCKET")?,
                assets_url: env::var("ASSETS_URL")?,
            },
            frontend_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
