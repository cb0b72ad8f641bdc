mod appointment;
mod course;
mod payment;
mod review;
mod service;
mod user;
mod working_hours;

pub use appointment::*;
pub use course::*;
pub use payment::*;
pub use review::*;
pub use service::*;
pub use user::*;
pub use working_hours::*;
