mod connection;
mod seed;

pub use connection::{check_health, create_pool};
pub use seed::seed_admin;
