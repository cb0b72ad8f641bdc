mod app_config;
mod aws;

pub use app_config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, Environment, MailConfig, S3Config,
    ServerConfig, StripeConfig,
};
pub use aws::{AwsClients, load_aws_clients};
