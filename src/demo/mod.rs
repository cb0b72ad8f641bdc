pub mod mask;
pub mod store;

pub use store::{DemoStore, DEMO_ID_FLOOR};

/// The synthetic identity behind /auth/demo-login. It has no users row;
/// id 0 can never collide with a real serial.
pub const DEMO_USER_ID: i32 = 0;
pub const DEMO_EMAIL: &str = "demo@arnika.studio";
pub const DEMO_NAME: &str = "Demo Admin";
